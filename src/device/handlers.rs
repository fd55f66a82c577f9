use serde_json::Value;

use super::models::DeviceInstance;
use super::types::DeviceTypeId;

/// Handler for the pool controller (EasyTouch/IntelliTouch) on the bus.
#[derive(Debug, Clone)]
pub struct ControllerHandler {
    instance: DeviceInstance,
}

/// Handler for an IntelliFlo variable-speed pump.
#[derive(Debug, Clone)]
pub struct IntelliFloHandler {
    instance: DeviceInstance,
}

/// Handler for an IntelliChlor salt chlorine generator.
#[derive(Debug, Clone)]
pub struct IntelliChlorHandler {
    instance: DeviceInstance,
}

/// Handler for an IntelliChem water chemistry controller.
#[derive(Debug, Clone)]
pub struct IntelliChemHandler {
    instance: DeviceInstance,
}

macro_rules! leaf_handler {
    ($handler:ident) => {
        impl $handler {
            pub fn new(instance: DeviceInstance) -> Self {
                Self { instance }
            }

            pub fn instance(&self) -> &DeviceInstance {
                &self.instance
            }

            pub fn device_type(&self) -> &DeviceTypeId {
                &self.instance.device_type
            }

            /// Bus address of the device, when configured.
            pub fn bus_id(&self) -> Option<u8> {
                self.instance
                    .config_value("id")
                    .as_ref()
                    .and_then(Value::as_u64)
                    .map(|id| id as u8)
            }
        }
    };
}

leaf_handler!(ControllerHandler);
leaf_handler!(IntelliFloHandler);
leaf_handler!(IntelliChlorHandler);
leaf_handler!(IntelliChemHandler);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::types::INTELLIFLO_TYPE;

    #[test]
    fn bus_id_reads_from_configuration() {
        let instance =
            DeviceInstance::new("pump", INTELLIFLO_TYPE.clone()).with_config("id", 96);
        let handler = IntelliFloHandler::new(instance);
        assert_eq!(handler.bus_id(), Some(96));
    }

    #[test]
    fn bus_id_absent_when_unconfigured() {
        let handler =
            IntelliFloHandler::new(DeviceInstance::new("pump", INTELLIFLO_TYPE.clone()));
        assert_eq!(handler.bus_id(), None);
    }
}
