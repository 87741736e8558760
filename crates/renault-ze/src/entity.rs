use myrenault_proto::types::JsonDict;
use serde::Serialize;

pub const ATTR_CHARGING: &str = "charging";
pub const ATTR_PLUGGED: &str = "plugged";
pub const ATTR_REMAINING_RANGE: &str = "remaining_range";
pub const ATTR_LAST_UPDATE: &str = "last_update";
pub const ATTR_BATTERY_TEMPERATURE: &str = "battery_temperature";
pub const ATTR_MILEAGE: &str = "mileage";

/// The capability set the host platform reads from a sensor.
pub trait Entity {
    /// Display name.
    fn name(&self) -> &str;

    /// Current state, `None` until the first successful fetch.
    fn state(&self) -> Option<f64>;

    fn unit_of_measurement(&self) -> Option<&str>;

    /// Extra state attributes, keyed by attribute name.
    fn attributes(&self) -> &JsonDict;

    /// Owned copy of everything above, for hosts that consume JSON.
    fn snapshot(&self) -> EntitySnapshot {
        EntitySnapshot {
            name: self.name().to_string(),
            state: self.state(),
            unit_of_measurement: self.unit_of_measurement().map(str::to_string),
            attributes: self.attributes().clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub name: String,
    pub state: Option<f64>,
    pub unit_of_measurement: Option<String>,
    pub attributes: JsonDict,
}
