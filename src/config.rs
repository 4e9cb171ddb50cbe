/*!
Router inventory.

Routers are configured through the `ROUTER_CONFIG` environment variable, a JSON object mapping
router ids to connection parameters:

```json
{"edge1": {"host": "192.0.2.1", "username": "admin", "password": "secret", "location": "Zurich"}}
```

Optional per-router keys: `port` (22), `secret` (enable secret, defaults to `password`),
`device_type` (`cisco_ios`), `timeout_secs` (30).
*/

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data_aquisition::core::DeviceType;

pub const ROUTER_CONFIG_VAR: &str = "ROUTER_CONFIG";
pub const ROUTER_LOCATION_VAR: &str = "ROUTER_LOCATION";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("ROUTER_CONFIG environment variable not found")]
    Missing,
    #[error("Invalid JSON in ROUTER_CONFIG: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[allow(dead_code)]
    #[error("Router ID '{0}' not found in configuration")]
    UnknownRouter(String),
}

fn default_port() -> u16 {
    22
}

fn default_timeout_secs() -> u64 {
    30
}

/// Connection parameters of one router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConnectionConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub secret: Option<String>,
    pub location: String,
    #[serde(default)]
    pub device_type: DeviceType,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RouterConnectionConfig {
    /// Secret for enable mode. Falls back to the login password.
    pub fn enable_secret(&self) -> &str {
        self.secret.as_deref().unwrap_or(&self.password)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// All configured routers, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterInventory {
    routers: Vec<(String, RouterConnectionConfig)>,
}

impl RouterInventory {
    /// Reads the inventory from `ROUTER_CONFIG`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let json = std::env::var(ROUTER_CONFIG_VAR).map_err(|_| ConfigError::Missing)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Err(ConfigError::Missing);
        }
        // a Map keeps document order since serde_json is built with `preserve_order`
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let routers = map
            .into_iter()
            .map(|(id, value)| Ok((id, serde_json::from_value::<RouterConnectionConfig>(value)?)))
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        Ok(Self { routers })
    }

    #[allow(dead_code)]
    pub fn get(&self, router_id: &str) -> Result<&RouterConnectionConfig, ConfigError> {
        self.routers
            .iter()
            .find(|(id, _)| id == router_id)
            .map(|(_, config)| config)
            .ok_or_else(|| ConfigError::UnknownRouter(router_id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouterConnectionConfig)> {
        self.routers.iter().map(|(id, config)| (id.as_str(), config))
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    /// Routers at `location`, compared case-insensitively.
    pub fn by_location(&self, location: &str) -> Self {
        let location = location.to_lowercase();
        Self {
            routers: self
                .routers
                .iter()
                .filter(|(_, config)| config.location.to_lowercase() == location)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const CONFIG: &str = r#"{
        "zrh-edge": {"host": "192.0.2.1", "username": "admin", "password": "pw1", "location": "Zurich"},
        "ams-core": {"host": "192.0.2.2", "port": 2222, "username": "ops", "password": "pw2",
                     "secret": "en", "location": "Amsterdam", "device_type": "cisco_xe", "timeout_secs": 5},
        "zrh-core": {"host": "192.0.2.3", "username": "admin", "password": "pw3", "location": "zurich"}
    }"#;

    #[test]
    fn test_from_json_keeps_order_and_defaults() {
        let inventory = RouterInventory::from_json(CONFIG).unwrap();
        let ids: Vec<_> = inventory.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["zrh-edge", "ams-core", "zrh-core"]);

        let edge = inventory.get("zrh-edge").unwrap();
        assert_eq!(edge.port, 22);
        assert_eq!(edge.enable_secret(), "pw1");
        assert_eq!(edge.device_type, DeviceType::CiscoIos);
        assert_eq!(edge.timeout(), Duration::from_secs(30));

        let core = inventory.get("ams-core").unwrap();
        assert_eq!(core.port, 2222);
        assert_eq!(core.enable_secret(), "en");
        assert_eq!(core.device_type, DeviceType::CiscoXe);
        assert_eq!(core.timeout_secs, 5);
    }

    #[test]
    fn test_unknown_router() {
        let inventory = RouterInventory::from_json(CONFIG).unwrap();
        assert!(matches!(
            inventory.get("nope"),
            Err(ConfigError::UnknownRouter(id)) if id == "nope"
        ));
    }

    #[test]
    fn test_by_location_is_case_insensitive() {
        let inventory = RouterInventory::from_json(CONFIG).unwrap();
        let zurich = inventory.by_location("ZURICH");
        let ids: Vec<_> = zurich.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["zrh-edge", "zrh-core"]);
        assert!(inventory.by_location("Paris").is_empty());
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(RouterInventory::from_json(""), Err(ConfigError::Missing)));
        assert!(matches!(
            RouterInventory::from_json("{not json"),
            Err(ConfigError::InvalidJson(_))
        ));
        // missing required `host`
        assert!(matches!(
            RouterInventory::from_json(r#"{"r1": {"username": "a", "password": "b", "location": "c"}}"#),
            Err(ConfigError::InvalidJson(_))
        ));
    }
}
