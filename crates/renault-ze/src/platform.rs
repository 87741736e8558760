use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use myrenault_proto::{Connection, Credentials};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::config::SensorConfig;
use crate::entity::Entity;
use crate::error::Result;
use crate::sensor::VehicleSensor;

/// Default time between two updates of a sensor.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(60);

/// Log in to the API and build the sensor described by `config`.
///
/// Unlike polling, failures here are returned to the caller.
pub async fn setup_platform(config: &SensorConfig) -> Result<VehicleSensor> {
    debug!("Initialising renault-ze platform");
    let conn = Connection::new(
        config.api_url.as_str(),
        Credentials::new(config.username.as_str(), config.password.as_str()),
    )?;
    conn.initialise(&config.android_lng).await?;

    Ok(VehicleSensor::new(
        Arc::new(conn),
        config.vin.as_str(),
        config.display_name(),
    ))
}

/// Update every sensor now and then once per `period` until `shutdown` resolves.
///
/// Sensors are updated one after another. A tick that falls due while an
/// update is still running is delayed, never run concurrently.
pub async fn run<F>(sensors: &mut [VehicleSensor], period: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!("Polling {} sensor(s) every {:?}", sensors.len(), period);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Stopping polling");
                break;
            }
            _ = ticker.tick() => {
                for sensor in sensors.iter_mut() {
                    sensor.update().await;
                    let attributes = serde_json::to_string(sensor.attributes()).unwrap_or_default();
                    info!(
                        vin = sensor.vin(),
                        state = ?sensor.state(),
                        %attributes,
                        "{}", sensor.name()
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use serde_json::json;

    use super::*;
    use crate::api::testing::ScriptedApi;

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_on_interval_until_shutdown() {
        let api = Arc::new(ScriptedApi::new(
            [Some(json!({"data": {"attributes": {
                "batteryLevel": 55,
                "chargeStatus": 0,
                "plugStatus": 0,
                "lastUpdateTime": "2024-01-01T10:00:00Z",
                "rangeHvacOff": 120
            }}}))],
            [Some(json!({"data": {"attributes": {"totalMileage": 800}}}))],
        ));
        let mut sensors = vec![VehicleSensor::new(api.clone(), "VF1TEST", "Zoe")];

        run(
            &mut sensors,
            SCAN_INTERVAL,
            tokio::time::sleep(Duration::from_secs(150)),
        )
        .await;

        // Ticks at 0s, 60s and 120s.
        assert_eq!(api.battery_calls.load(Ordering::SeqCst), 3);
        assert_eq!(api.mileage_calls.load(Ordering::SeqCst), 3);
        assert_eq!(sensors[0].state(), Some(55.0));
        assert_eq!(sensors[0].attributes()["mileage"], json!(800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_updates_every_sensor() {
        let first = Arc::new(ScriptedApi::new([None], [None]));
        let second = Arc::new(ScriptedApi::new([None], [None]));
        let mut sensors = vec![
            VehicleSensor::new(first.clone(), "VF1ONE", "One"),
            VehicleSensor::new(second.clone(), "VF1TWO", "Two"),
        ];

        run(
            &mut sensors,
            Duration::from_secs(10),
            tokio::time::sleep(Duration::from_secs(5)),
        )
        .await;

        assert_eq!(first.battery_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.mileage_calls.load(Ordering::SeqCst), 1);
        assert_eq!(sensors[1].state(), None);
    }

    #[tokio::test]
    async fn test_setup_fails_without_server() {
        let config = SensorConfig::from_toml(
            r#"
            username = "u"
            password = "p"
            vin = "VF1TEST"
            api_url = "http://127.0.0.1:9"
            "#,
        )
        .unwrap();

        let result = setup_platform(&config).await;
        assert!(matches!(result, Err(crate::Error::Api(_))));
    }
}
