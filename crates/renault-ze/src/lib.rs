//! Battery and mileage sensor for Renault ZE vehicles.
//!
//! A [`VehicleSensor`] polls the MyRenault API for one VIN and keeps the last
//! known battery level as its state, with charging/plug status, range,
//! battery temperature and mileage as attributes. The host platform reads it
//! through the [`Entity`] trait.
//!
//! # Example
//! ```no_run
//! # async fn example() -> renault_ze::Result<()> {
//! use renault_ze::{platform, Entity, SensorConfig};
//!
//! let config = SensorConfig::load("renault-ze.toml")?;
//! let mut sensor = platform::setup_platform(&config).await?;
//! sensor.update().await;
//! println!("{}: {:?}{}", sensor.name(), sensor.state(), sensor.unit_of_measurement().unwrap_or(""));
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod entity;
pub mod error;
pub mod platform;
pub mod sensor;

pub use api::VehicleApi;
pub use config::{ConfigError, SensorConfig};
pub use entity::{Entity, EntitySnapshot};
pub use error::{Error, Result};
pub use myrenault_proto::ApiError;
pub use sensor::VehicleSensor;
