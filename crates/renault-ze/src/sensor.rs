use std::sync::Arc;

use myrenault_proto::types::{parse_attributes, BatteryStatus, JsonDict, Mileage};
use myrenault_proto::Result;
use serde_json::Value;
use tracing::{debug, error, info_span, Instrument, Span};

use crate::api::VehicleApi;
use crate::entity::{
    Entity, ATTR_BATTERY_TEMPERATURE, ATTR_CHARGING, ATTR_LAST_UPDATE, ATTR_MILEAGE,
    ATTR_PLUGGED, ATTR_REMAINING_RANGE,
};

/// Battery sensor for a single vehicle.
///
/// The state is the battery level in %. Battery and mileage attributes are
/// refreshed independently: a failed fetch of one resource leaves whatever
/// the last successful fetch of that resource produced.
pub struct VehicleSensor {
    api: Arc<dyn VehicleApi>,
    vin: String,
    name: String,
    state: Option<f64>,
    attributes: JsonDict,
    span: Span,
}

impl VehicleSensor {
    /// Create a sensor with no state and no attributes.
    pub fn new(api: Arc<dyn VehicleApi>, vin: impl Into<String>, name: impl Into<String>) -> Self {
        let vin = vin.into();
        let name = name.into();
        let span = info_span!("vehicle_sensor", vin = %vin, name = %name);
        span.in_scope(|| debug!("Initialising sensor"));
        Self {
            api,
            vin,
            name,
            state: None,
            attributes: JsonDict::new(),
            span,
        }
    }

    pub fn vin(&self) -> &str {
        &self.vin
    }

    /// Fetch both resources and refresh state and attributes.
    ///
    /// Battery status is fetched first, then mileage; the mileage request is
    /// issued whatever the outcome of the first. Errors are logged and never
    /// returned.
    pub async fn update(&mut self) {
        let span = self.span.clone();
        async {
            match self.api.battery_status(&self.vin).await {
                Ok(doc) => {
                    debug!("Battery update result: {doc}");
                    if let Err(e) = self.process_battery_response(&doc) {
                        error!("Battery update failed: {e}");
                    }
                }
                Err(e) => error!("Battery update failed: {e}"),
            }

            match self.api.mileage(&self.vin).await {
                Ok(doc) => {
                    debug!("Mileage update result: {doc}");
                    if let Err(e) = self.process_mileage_response(&doc) {
                        error!("Mileage update failed: {e}");
                    }
                }
                Err(e) => error!("Mileage update failed: {e}"),
            }
        }
        .instrument(span)
        .await
    }

    /// Normalize a battery status document into state and attributes.
    ///
    /// The document is fully decoded before anything is written, so a
    /// malformed payload leaves the sensor untouched.
    pub fn process_battery_response(&mut self, doc: &Value) -> Result<()> {
        let status: BatteryStatus = parse_attributes(doc)?;
        let charging = status.is_charging();
        let plugged = status.is_plugged();
        let BatteryStatus {
            battery_level,
            last_update_time,
            range_hvac_off,
            battery_temperature,
            ..
        } = status;

        self.state = battery_level.as_f64();
        self.attributes
            .insert(ATTR_CHARGING.into(), Value::Bool(charging));
        self.attributes
            .insert(ATTR_LAST_UPDATE.into(), Value::String(last_update_time));
        self.attributes
            .insert(ATTR_PLUGGED.into(), Value::Bool(plugged));
        match battery_temperature {
            Some(temp) => {
                self.attributes
                    .insert(ATTR_BATTERY_TEMPERATURE.into(), Value::Number(temp));
            }
            None => {
                self.attributes.remove(ATTR_BATTERY_TEMPERATURE);
            }
        }
        self.attributes
            .insert(ATTR_REMAINING_RANGE.into(), Value::Number(range_hvac_off));
        Ok(())
    }

    /// Normalize a mileage document into the `mileage` attribute.
    pub fn process_mileage_response(&mut self, doc: &Value) -> Result<()> {
        let mileage: Mileage = parse_attributes(doc)?;
        self.attributes
            .insert(ATTR_MILEAGE.into(), Value::Number(mileage.total_mileage));
        Ok(())
    }
}

impl Entity for VehicleSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> Option<f64> {
        self.state
    }

    fn unit_of_measurement(&self) -> Option<&str> {
        Some("%")
    }

    fn attributes(&self) -> &JsonDict {
        &self.attributes
    }
}
