use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::device::models::DeviceInstance;

use super::handler::{BridgeTransport, TransportStreams};
use super::{BridgeError, Result};

/// Bounded wait for the TCP connect.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default port of RS-485 gateways exposing the bus over TCP.
pub const DEFAULT_GATEWAY_PORT: u16 = 10000;

/// Configuration surface of an IP bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IpBridgeConfig {
    /// Host name or address of the gateway.
    pub address: String,
    pub port: u16,
    pub id: u8,
    pub discovery: bool,
}

impl Default for IpBridgeConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            port: DEFAULT_GATEWAY_PORT,
            id: 34,
            discovery: true,
        }
    }
}

/// Transport adapter for an RS-485 gateway reached over TCP.
#[derive(Default)]
pub struct IpTransport {
    stream: Option<TcpStream>,
}

impl IpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BridgeTransport for IpTransport {
    fn kind(&self) -> &'static str {
        "ip"
    }

    async fn open(&mut self, instance: &DeviceInstance) -> Result<TransportStreams> {
        let config: IpBridgeConfig = instance
            .config_as()
            .map_err(|e| BridgeError::Configuration(e.to_string()))?;

        if config.address.is_empty() {
            return Err(BridgeError::Configuration(
                "no gateway address configured".to_string(),
            ));
        }

        let locator = format!("{}:{}", config.address, config.port);
        let addr = locator
            .to_socket_addrs()
            .map_err(|e| {
                BridgeError::Configuration(format!("cannot resolve {}: {}", locator, e))
            })?
            .next()
            .ok_or_else(|| {
                BridgeError::Configuration(format!("cannot resolve {}", locator))
            })?;

        log::debug!("Connect gateway: {}", locator);

        let stream =
            TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).map_err(|source| {
                BridgeError::Io {
                    locator: locator.clone(),
                    source,
                }
            })?;

        if let Err(e) = stream.set_nodelay(true) {
            log::debug!("Failed to set TCP_NODELAY on {}: {}", locator, e);
        }

        let reader = stream.try_clone().map_err(|source| BridgeError::Io {
            locator: locator.clone(),
            source,
        })?;
        let writer = stream.try_clone().map_err(|source| BridgeError::Io {
            locator: locator.clone(),
            source,
        })?;

        self.stream = Some(stream);
        Ok(TransportStreams {
            reader: Box::new(reader),
            writer: Box::new(writer),
        })
    }

    async fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                log::debug!("Gateway socket shutdown failed: {}", e);
            }
        }
    }
}
