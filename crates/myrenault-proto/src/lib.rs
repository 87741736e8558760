pub mod connection;
pub mod error;
pub mod types;

pub use connection::{Connection, Credentials, DEFAULT_API_URL};
pub use error::{ApiError, Result};
