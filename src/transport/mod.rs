pub mod system;

pub use system::SystemPortManager;

use std::io::{Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits};

/// Serial line parameters applied to an open port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineParams {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
}

/// Fixed line parameters of the Pentair RS-485 bus (9600 8N1, no flow
/// control). These are protocol constants, not user configuration.
pub const PROTOCOL_LINE_PARAMS: LineParams = LineParams {
    baud_rate: 9600,
    data_bits: DataBits::Eight,
    parity: Parity::None,
    stop_bits: StopBits::One,
    flow_control: FlowControl::None,
};

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("port already in use{}", .owner.as_deref().map(|o| format!(" by {}", o)).unwrap_or_default())]
    Busy { owner: Option<String> },

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port-resolution capability supplied by the hosting platform.
///
/// `SystemPortManager` is the default implementation backed by the local
/// serial subsystem; platforms with their own port registry can provide
/// another.
pub trait PortManager: Send + Sync {
    /// Resolve a configured locator to a concrete port identity, if the
    /// system knows such a port.
    fn identifier(&self, locator: &str) -> Option<Box<dyn PortIdentifier>>;
}

/// A resolved but not yet opened serial port.
pub trait PortIdentifier: Send {
    fn name(&self) -> &str;

    /// Whether another process currently holds this port. Advisory only;
    /// acquisition may still be attempted when this reports true.
    fn is_currently_owned(&self) -> bool;

    /// Name of the current owner when known.
    fn current_owner(&self) -> Option<String>;

    /// Open the port, tagging the acquisition with `owner` and bounding the
    /// wait by `timeout`.
    fn open(&self, owner: &str, timeout: Duration) -> Result<Box<dyn SerialLink>, OpenError>;
}

/// An open serial port. Dropping the link releases the port.
pub trait SerialLink: Send {
    /// Apply line parameters to the open port.
    fn set_line_params(&mut self, params: &LineParams) -> Result<(), OpenError>;

    /// Derive independent read and write byte-stream endpoints for the open
    /// link.
    fn byte_streams(
        &mut self,
    ) -> std::io::Result<(Box<dyn Read + Send>, Box<dyn Write + Send>)>;
}
