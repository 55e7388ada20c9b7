// ── Router configuration snapshots ──
//
// Singletons with no natural key: each describes "the current value" of
// one settings page in the router's web UI.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Main Wi-Fi network configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct WifiInfo {
    pub ssid: String,
    pub security_type: String,
    pub security_mode: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl std::fmt::Debug for WifiInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifiInfo")
            .field("ssid", &self.ssid)
            .field("security_type", &self.security_type)
            .field("security_mode", &self.security_mode)
            .field("password", &"***")
            .finish_non_exhaustive()
    }
}

/// Guest network configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct GuestInfo {
    pub enabled: bool,
    pub ssid: String,
    pub password: String,
    pub time_restriction: String,
    pub bandwidth_limit: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl std::fmt::Debug for GuestInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuestInfo")
            .field("enabled", &self.enabled)
            .field("ssid", &self.ssid)
            .field("password", &"***")
            .field("time_restriction", &self.time_restriction)
            .field("bandwidth_limit", &self.bandwidth_limit)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpnpInfo {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Firmware version and upgrade availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub has_new: bool,
    pub version: String,
    pub changelog: String,
    pub current_version: String,
    pub system_has_new: bool,
}
