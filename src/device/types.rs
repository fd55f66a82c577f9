use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Opaque identifier for a device kind. Compared by equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceTypeId(String);

impl DeviceTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceTypeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// Bridge kinds
pub static SERIAL_BRIDGE_TYPE: Lazy<DeviceTypeId> =
    Lazy::new(|| DeviceTypeId::new("serial-bridge"));
pub static IP_BRIDGE_TYPE: Lazy<DeviceTypeId> = Lazy::new(|| DeviceTypeId::new("ip-bridge"));

// Leaf device kinds
pub static CONTROLLER_TYPE: Lazy<DeviceTypeId> = Lazy::new(|| DeviceTypeId::new("controller"));
pub static INTELLIFLO_TYPE: Lazy<DeviceTypeId> = Lazy::new(|| DeviceTypeId::new("intelliflo"));
pub static INTELLICHLOR_TYPE: Lazy<DeviceTypeId> =
    Lazy::new(|| DeviceTypeId::new("intellichlor"));
pub static INTELLICHEM_TYPE: Lazy<DeviceTypeId> = Lazy::new(|| DeviceTypeId::new("intellichem"));

/// The closed set of device types this crate can produce handlers for.
pub static SUPPORTED_DEVICE_TYPES: Lazy<Vec<DeviceTypeId>> = Lazy::new(|| {
    vec![
        SERIAL_BRIDGE_TYPE.clone(),
        IP_BRIDGE_TYPE.clone(),
        CONTROLLER_TYPE.clone(),
        INTELLIFLO_TYPE.clone(),
        INTELLICHLOR_TYPE.clone(),
        INTELLICHEM_TYPE.clone(),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_set_is_closed_and_distinct() {
        let set: std::collections::HashSet<_> =
            SUPPORTED_DEVICE_TYPES.iter().map(DeviceTypeId::as_str).collect();
        assert_eq!(set.len(), SUPPORTED_DEVICE_TYPES.len());
        assert!(!set.contains("intellibrite"));
    }

    #[test]
    fn type_ids_compare_by_value() {
        assert_eq!(DeviceTypeId::new("serial-bridge"), *SERIAL_BRIDGE_TYPE);
        assert_ne!(*SERIAL_BRIDGE_TYPE, *IP_BRIDGE_TYPE);
    }
}
