use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::types::DeviceTypeId;
use super::{DeviceError, Result};

type ConfigMap = Map<String, Value>;

/// A configured unit to be bridged or handled.
///
/// Instances are owned by the hosting platform; this crate only reads them.
/// The configuration map is shared between clones so that platform-side
/// edits are visible to a handler's next connect attempt.
#[derive(Debug, Clone)]
pub struct DeviceInstance {
    pub id: Uuid,
    pub label: String,
    pub device_type: DeviceTypeId,
    config: Arc<RwLock<ConfigMap>>,
    pub created_at: DateTime<Utc>,
}

impl DeviceInstance {
    pub fn new(label: impl Into<String>, device_type: DeviceTypeId) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            device_type,
            config: Arc::new(RwLock::new(ConfigMap::new())),
            created_at: Utc::now(),
        }
    }

    /// Builder-style configuration entry, for constructing instances.
    pub fn with_config(self, key: &str, value: impl Into<Value>) -> Self {
        self.set_config(key, value);
        self
    }

    /// Set a configuration option. Visible to all clones of this instance.
    pub fn set_config(&self, key: &str, value: impl Into<Value>) {
        write_config(&self.config).insert(key.to_string(), value.into());
    }

    pub fn config_value(&self, key: &str) -> Option<Value> {
        read_config(&self.config).get(key).cloned()
    }

    /// Deserialize the current configuration map into a typed config struct.
    pub fn config_as<T: DeserializeOwned>(&self) -> Result<T> {
        let map = read_config(&self.config).clone();
        serde_json::from_value(Value::Object(map)).map_err(DeviceError::InvalidConfiguration)
    }
}

fn read_config(config: &RwLock<ConfigMap>) -> RwLockReadGuard<'_, ConfigMap> {
    match config.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_config(config: &RwLock<ConfigMap>) -> RwLockWriteGuard<'_, ConfigMap> {
    match config.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
