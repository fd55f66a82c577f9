use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::device::models::DeviceInstance;
use crate::transport::{OpenError, PortManager, SerialLink, PROTOCOL_LINE_PARAMS};

use super::handler::{BridgeTransport, TransportStreams};
use super::{BridgeError, Result};

/// Owner tag recorded against the port acquisition.
pub const OWNER_TAG: &str = "pentair-bridge";

/// Bounded wait when opening a port that may be busy.
pub const OPEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration surface of a serial bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SerialBridgeConfig {
    /// Locator of the RS-485 adapter's port.
    pub serial_port: String,
    pub id: u8,
    pub discovery: bool,
}

impl Default for SerialBridgeConfig {
    fn default() -> Self {
        Self {
            serial_port: String::new(),
            id: 34,
            discovery: true,
        }
    }
}

/// Transport adapter for a locally attached RS-485 serial adapter.
pub struct SerialTransport {
    port_manager: Arc<dyn PortManager>,
    link: Option<Box<dyn SerialLink>>,
}

impl SerialTransport {
    pub fn new(port_manager: Arc<dyn PortManager>) -> Self {
        Self {
            port_manager,
            link: None,
        }
    }
}

#[async_trait]
impl BridgeTransport for SerialTransport {
    fn kind(&self) -> &'static str {
        "serial"
    }

    async fn open(&mut self, instance: &DeviceInstance) -> Result<TransportStreams> {
        let config: SerialBridgeConfig = instance
            .config_as()
            .map_err(|e| BridgeError::Configuration(e.to_string()))?;

        if config.serial_port.is_empty() {
            return Err(BridgeError::Configuration(
                "no serial port configured".to_string(),
            ));
        }

        let identifier = self
            .port_manager
            .identifier(&config.serial_port)
            .ok_or_else(|| {
                BridgeError::Configuration("configured serial port does not exist".to_string())
            })?;

        log::debug!("Connect port: {}", config.serial_port);

        if identifier.is_currently_owned() {
            // Exclusive ownership is only advisory, so try to open anyway.
            log::debug!(
                "Serial port {} is currently being used by another application: {}",
                config.serial_port,
                identifier.current_owner().unwrap_or_else(|| "unknown".to_string())
            );
        }

        let mut link = identifier
            .open(OWNER_TAG, OPEN_TIMEOUT)
            .map_err(|e| map_open_error(&config.serial_port, e))?;

        // A failure from here on drops `link`, which releases the port.
        link.set_line_params(&PROTOCOL_LINE_PARAMS)
            .map_err(|e| map_open_error(&config.serial_port, e))?;

        let (reader, writer) = link.byte_streams().map_err(|source| BridgeError::Io {
            locator: config.serial_port.clone(),
            source,
        })?;

        self.link = Some(link);
        Ok(TransportStreams { reader, writer })
    }

    async fn close(&mut self) {
        if self.link.take().is_some() {
            log::debug!("Serial port closed");
        }
    }
}

fn map_open_error(port: &str, error: OpenError) -> BridgeError {
    match error {
        OpenError::Busy { owner } => BridgeError::Busy {
            port: port.to_string(),
            owner,
        },
        OpenError::Unsupported(reason) => BridgeError::Unsupported {
            port: port.to_string(),
            reason,
        },
        OpenError::Io(source) => BridgeError::Io {
            locator: port.to_string(),
            source,
        },
    }
}
