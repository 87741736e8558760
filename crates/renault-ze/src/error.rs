use myrenault_proto::ApiError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while setting up the platform.
///
/// Polling never returns these; failures during [`update`](crate::VehicleSensor::update)
/// are logged and swallowed.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, Error>;
