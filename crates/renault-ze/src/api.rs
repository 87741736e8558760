use async_trait::async_trait;
use myrenault_proto::{Connection, Result};
use serde_json::Value;

/// The two vehicle resources a sensor polls.
///
/// Implementations return the raw JSON document, shaped
/// `{"data": {"attributes": {...}}}`. Any failure is reported as an
/// [`ApiError`](myrenault_proto::ApiError); callers do not distinguish causes.
#[async_trait]
pub trait VehicleApi: Send + Sync {
    /// Fetch the battery status document for `vin`.
    async fn battery_status(&self, vin: &str) -> Result<Value>;

    /// Fetch the mileage document for `vin`.
    async fn mileage(&self, vin: &str) -> Result<Value>;
}

#[async_trait]
impl VehicleApi for Connection {
    async fn battery_status(&self, vin: &str) -> Result<Value> {
        Connection::battery_status(self, vin).await
    }

    async fn mileage(&self, vin: &str) -> Result<Value> {
        Connection::mileage(self, vin).await
    }
}
