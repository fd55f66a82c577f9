use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::SerialPort;

use super::{LineParams, OpenError, PortIdentifier, PortManager, SerialLink};

/// Port manager backed by the local serial subsystem via the `serialport`
/// crate.
#[derive(Debug, Default)]
pub struct SystemPortManager;

impl SystemPortManager {
    pub fn new() -> Self {
        Self
    }
}

impl PortManager for SystemPortManager {
    fn identifier(&self, locator: &str) -> Option<Box<dyn PortIdentifier>> {
        let ports = match serialport::available_ports() {
            Ok(ports) => ports,
            Err(e) => {
                log::warn!("Failed to enumerate serial ports: {}", e);
                return None;
            }
        };

        ports
            .iter()
            .find(|p| p.port_name == locator)
            .map(|p| {
                Box::new(SystemPortIdentifier {
                    name: p.port_name.clone(),
                }) as Box<dyn PortIdentifier>
            })
    }
}

struct SystemPortIdentifier {
    name: String,
}

impl PortIdentifier for SystemPortIdentifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_currently_owned(&self) -> bool {
        // The local serial subsystem has no portable ownership probe;
        // contention surfaces as a busy error at open time instead.
        false
    }

    fn current_owner(&self) -> Option<String> {
        None
    }

    fn open(&self, owner: &str, timeout: Duration) -> Result<Box<dyn SerialLink>, OpenError> {
        log::debug!("Opening {} for {}", self.name, owner);

        let port = serialport::new(&self.name, super::PROTOCOL_LINE_PARAMS.baud_rate)
            .timeout(timeout)
            .open()
            .map_err(map_serialport_error)?;

        Ok(Box::new(SystemSerialLink { port }))
    }
}

struct SystemSerialLink {
    port: Box<dyn SerialPort>,
}

impl SerialLink for SystemSerialLink {
    fn set_line_params(&mut self, params: &LineParams) -> Result<(), OpenError> {
        self.port.set_baud_rate(params.baud_rate).map_err(unsupported)?;
        self.port.set_data_bits(params.data_bits).map_err(unsupported)?;
        self.port.set_parity(params.parity).map_err(unsupported)?;
        self.port.set_stop_bits(params.stop_bits).map_err(unsupported)?;
        self.port
            .set_flow_control(params.flow_control)
            .map_err(unsupported)?;
        Ok(())
    }

    fn byte_streams(
        &mut self,
    ) -> io::Result<(Box<dyn Read + Send>, Box<dyn Write + Send>)> {
        let reader = self.port.try_clone().map_err(io::Error::from)?;
        let writer = self.port.try_clone().map_err(io::Error::from)?;
        Ok((Box::new(reader), Box::new(writer)))
    }
}

fn unsupported(e: serialport::Error) -> OpenError {
    OpenError::Unsupported(e.to_string())
}

fn map_serialport_error(e: serialport::Error) -> OpenError {
    match e.kind() {
        serialport::ErrorKind::NoDevice => OpenError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            e.to_string(),
        )),
        serialport::ErrorKind::InvalidInput => OpenError::Unsupported(e.to_string()),
        serialport::ErrorKind::Io(kind)
            if kind == io::ErrorKind::PermissionDenied || kind == io::ErrorKind::AddrInUse =>
        {
            OpenError::Busy { owner: None }
        }
        serialport::ErrorKind::Io(kind) => {
            OpenError::Io(io::Error::new(kind, e.to_string()))
        }
        _ => OpenError::Io(io::Error::new(io::ErrorKind::Other, e.to_string())),
    }
}
