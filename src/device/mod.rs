pub mod factory;
pub mod handlers;
pub mod models;
pub mod types;

pub use factory::{Handler, HandlerFactory};
pub use models::DeviceInstance;
pub use types::*;

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("invalid device configuration: {0}")]
    InvalidConfiguration(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
