use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::bridge::{BridgeHandler, IpTransport, SerialTransport};
use crate::transport::PortManager;

use super::handlers::{
    ControllerHandler, IntelliChemHandler, IntelliChlorHandler, IntelliFloHandler,
};
use super::models::DeviceInstance;
use super::types::{
    DeviceTypeId, CONTROLLER_TYPE, INTELLICHEM_TYPE, INTELLICHLOR_TYPE, INTELLIFLO_TYPE,
    IP_BRIDGE_TYPE, SERIAL_BRIDGE_TYPE,
};

/// A concrete handler instance produced by the factory.
pub enum Handler {
    SerialBridge(BridgeHandler),
    IpBridge(BridgeHandler),
    Controller(ControllerHandler),
    IntelliFlo(IntelliFloHandler),
    IntelliChlor(IntelliChlorHandler),
    IntelliChem(IntelliChemHandler),
}

impl Handler {
    pub fn instance(&self) -> &DeviceInstance {
        match self {
            Handler::SerialBridge(h) | Handler::IpBridge(h) => h.instance(),
            Handler::Controller(h) => h.instance(),
            Handler::IntelliFlo(h) => h.instance(),
            Handler::IntelliChlor(h) => h.instance(),
            Handler::IntelliChem(h) => h.instance(),
        }
    }

    pub fn device_type(&self) -> &DeviceTypeId {
        &self.instance().device_type
    }

    /// The bridge handler, when this is a bridge kind.
    pub fn as_bridge(&self) -> Option<&BridgeHandler> {
        match self {
            Handler::SerialBridge(h) | Handler::IpBridge(h) => Some(h),
            _ => None,
        }
    }
}

type Constructor = fn(&HandlerFactory, DeviceInstance) -> Handler;

/// Dispatch table from device type to handler constructor. Adding a device
/// kind is a new entry here plus its constructor below.
static REGISTRY: Lazy<Vec<(&'static DeviceTypeId, Constructor)>> = Lazy::new(|| {
    vec![
        (&*SERIAL_BRIDGE_TYPE, make_serial_bridge as Constructor),
        (&*IP_BRIDGE_TYPE, make_ip_bridge),
        (&*CONTROLLER_TYPE, make_controller),
        (&*INTELLIFLO_TYPE, make_intelliflo),
        (&*INTELLICHLOR_TYPE, make_intellichlor),
        (&*INTELLICHEM_TYPE, make_intellichem),
    ]
});

/// Produces handler instances for recognized device types.
pub struct HandlerFactory {
    port_manager: Arc<dyn PortManager>,
}

impl HandlerFactory {
    /// The port manager is shared platform infrastructure; the factory
    /// forwards it into every serial bridge it creates without owning it.
    pub fn new(port_manager: Arc<dyn PortManager>) -> Self {
        Self { port_manager }
    }

    /// Membership test against the closed set of supported device types.
    pub fn supports_type(&self, device_type: &DeviceTypeId) -> bool {
        REGISTRY.iter().any(|(id, _)| *id == device_type)
    }

    /// Construct the handler for the instance's device type.
    ///
    /// `None` means the type is not ours to handle; the caller decides what
    /// to do next. It is never an error.
    pub fn create_handler(&self, instance: &DeviceInstance) -> Option<Handler> {
        let constructor = REGISTRY
            .iter()
            .find(|(id, _)| *id == &instance.device_type)
            .map(|(_, constructor)| constructor)?;

        log::debug!(
            "Creating {} handler for {}",
            instance.device_type,
            instance.label
        );
        Some(constructor(self, instance.clone()))
    }
}

fn make_serial_bridge(factory: &HandlerFactory, instance: DeviceInstance) -> Handler {
    let transport = SerialTransport::new(Arc::clone(&factory.port_manager));
    Handler::SerialBridge(BridgeHandler::new(instance, Box::new(transport)))
}

fn make_ip_bridge(_factory: &HandlerFactory, instance: DeviceInstance) -> Handler {
    Handler::IpBridge(BridgeHandler::new(instance, Box::new(IpTransport::new())))
}

fn make_controller(_factory: &HandlerFactory, instance: DeviceInstance) -> Handler {
    Handler::Controller(ControllerHandler::new(instance))
}

fn make_intelliflo(_factory: &HandlerFactory, instance: DeviceInstance) -> Handler {
    Handler::IntelliFlo(IntelliFloHandler::new(instance))
}

fn make_intellichlor(_factory: &HandlerFactory, instance: DeviceInstance) -> Handler {
    Handler::IntelliChlor(IntelliChlorHandler::new(instance))
}

fn make_intellichem(_factory: &HandlerFactory, instance: DeviceInstance) -> Handler {
    Handler::IntelliChem(IntelliChemHandler::new(instance))
}
