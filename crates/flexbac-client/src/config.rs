//! Per-device configuration.

use crate::error::ConfigError;
use flexbac_core::types::ObjectId;
use flexbac_datalink::BACNET_IP_DEFAULT_PORT;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use tokio::net::lookup_host;

/// Highest assignable device instance; 4194303 is the wildcard.
pub const MAX_DEVICE_INSTANCE: u32 = ObjectId::MAX_INSTANCE - 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Host name or IP address of the unit.
    pub address: String,
    pub device_id: u32,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Minutes between scheduled refreshes.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,
    /// Seconds each session operation may take.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Fixed local UDP port. Ephemeral when unset.
    #[serde(default)]
    pub local_port: Option<u16>,
}

fn default_name() -> String {
    "Flexit Local".to_string()
}

fn default_port() -> u16 {
    BACNET_IP_DEFAULT_PORT
}

fn default_refresh_interval() -> u64 {
    5
}

fn default_timeout() -> u64 {
    10
}

impl DeviceConfig {
    pub fn new(address: impl Into<String>, device_id: u32) -> Self {
        Self {
            name: default_name(),
            address: address.into(),
            device_id,
            port: default_port(),
            refresh_interval: default_refresh_interval(),
            timeout: default_timeout(),
            local_port: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::EmptyAddress);
        }
        if self.device_id > MAX_DEVICE_INSTANCE {
            return Err(ConfigError::DeviceIdOutOfRange(self.device_id));
        }
        if self.refresh_interval == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "refresh_interval",
            });
        }
        if self.timeout == 0 {
            return Err(ConfigError::ZeroDuration { field: "timeout" });
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval.saturating_mul(60))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Resolves `address` to a socket address, preferring IPv4.
    pub async fn resolve_peer(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.address.trim();
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }

        let unresolved = |reason: String| ConfigError::Unresolved {
            host: host.to_string(),
            reason,
        };
        let addrs: Vec<SocketAddr> = lookup_host((host, self.port))
            .await
            .map_err(|e| unresolved(e.to_string()))?
            .collect();
        addrs
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| unresolved("no addresses".to_string()))
    }
}
