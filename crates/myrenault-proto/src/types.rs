use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::error::{ApiError, Result};

/// A string-keyed JSON object.
pub type JsonDict = serde_json::Map<String, Value>;

/// Battery state reported by the `battery-status` resource.
///
/// Only the fields the sensor consumes are decoded; anything else the API
/// adds is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryStatus {
    /// State of charge in %.
    pub battery_level: Number,
    /// Greater than zero while the vehicle is charging. May be fractional.
    pub charge_status: Number,
    /// Greater than zero while a cable is connected.
    pub plug_status: Number,
    pub last_update_time: String,
    /// Estimated range in km with climate control off.
    pub range_hvac_off: Number,
    #[serde(default)]
    pub battery_temperature: Option<Number>,
}

impl BatteryStatus {
    pub fn is_charging(&self) -> bool {
        is_positive(&self.charge_status)
    }

    pub fn is_plugged(&self) -> bool {
        is_positive(&self.plug_status)
    }
}

fn is_positive(n: &Number) -> bool {
    n.as_f64().is_some_and(|v| v > 0.0)
}

/// Odometer reading reported by the `mileage` resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mileage {
    pub total_mileage: Number,
}

/// Return the `data.attributes` object every resource document is wrapped in.
pub fn resource_attributes(doc: &Value) -> Result<&JsonDict> {
    doc.get("data")
        .and_then(|data| data.get("attributes"))
        .and_then(Value::as_object)
        .ok_or_else(|| ApiError::MalformedResponse("missing data.attributes object".into()))
}

/// Decode the `data.attributes` object of a resource document into `T`.
pub fn parse_attributes<T: DeserializeOwned>(doc: &Value) -> Result<T> {
    let attrs = resource_attributes(doc)?;
    serde_json::from_value(Value::Object(attrs.clone()))
        .map_err(|e| ApiError::MalformedResponse(e.to_string()))
}
