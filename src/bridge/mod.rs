pub mod handler;
pub mod ip;
pub mod serial;

pub use handler::{BridgeHandler, BridgeTransport, ConnectionState, TransportStreams};
pub use ip::IpTransport;
pub use serial::SerialTransport;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("{0}")]
    Configuration(String),

    #[error("serial port already in use: {port}{}", .owner.as_deref().map(|o| format!(", owned by {}", o)).unwrap_or_default())]
    Busy { port: String, owner: Option<String> },

    #[error("got unsupported operation {reason} on port {port}")]
    Unsupported { port: String, reason: String },

    #[error("got I/O error {source} on {locator}")]
    Io {
        locator: String,
        #[source]
        source: std::io::Error,
    },
}

impl BridgeError {
    /// Status category this error is surfaced under.
    ///
    /// Busy and unsupported-operation failures almost always mean wrong
    /// configuration or hardware, so they report as configuration errors;
    /// I/O failures during stream setup are transient.
    pub fn status_detail(&self) -> StatusDetail {
        match self {
            BridgeError::Io { .. } => StatusDetail::CommunicationError,
            _ => StatusDetail::ConfigurationError,
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Category attached to an offline status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusDetail {
    ConfigurationError,
    CommunicationError,
}

/// Platform-visible availability of a bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeStatus {
    Online,
    Offline,
    OfflineDetail { detail: StatusDetail, message: String },
}

impl BridgeStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, BridgeStatus::Online)
    }
}

/// Bridge options re-read from the instance configuration on every connect
/// attempt, so edits take effect without recreating the handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeSettings {
    /// Bus address the bridge uses in protocol addressing.
    pub id: u8,
    /// Enable automatic discovery of sub-devices on the bus.
    pub discovery: bool,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            id: 34,
            discovery: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults() {
        let settings = BridgeSettings::default();
        assert_eq!(settings.id, 34);
        assert!(settings.discovery);
    }

    #[test]
    fn io_errors_are_communication_class() {
        let err = BridgeError::Io {
            locator: "/dev/ttyUSB0".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        };
        assert_eq!(err.status_detail(), StatusDetail::CommunicationError);
    }

    #[test]
    fn busy_errors_are_configuration_class_and_name_the_port() {
        let err = BridgeError::Busy {
            port: "/dev/ttyUSB0".into(),
            owner: Some("screenlogic".into()),
        };
        assert_eq!(err.status_detail(), StatusDetail::ConfigurationError);
        let message = err.to_string();
        assert!(message.contains("/dev/ttyUSB0"));
        assert!(message.contains("screenlogic"));
    }
}
