pub mod bridge;
pub mod device;
pub mod protocol;
pub mod transport;

pub use bridge::{BridgeHandler, BridgeSettings, BridgeStatus, StatusDetail};
pub use device::{DeviceInstance, DeviceTypeId, Handler, HandlerFactory};
pub use protocol::{BusProcessor, ProtocolProcessor};
pub use transport::{PortManager, SystemPortManager};
