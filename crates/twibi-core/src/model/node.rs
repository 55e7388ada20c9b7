// ── Mesh node domain types ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::mac::MacAddress;

/// Role of a unit inside the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeRole {
    /// Terminates the WAN link.
    Primary,
    /// Relays over the mesh backhaul.
    Secondary,
}

impl NodeRole {
    /// Firmware marks the primary with `"1"`; every other value is secondary.
    pub fn from_marker(marker: &str) -> Self {
        if marker == "1" {
            Self::Primary
        } else {
            Self::Secondary
        }
    }
}

/// One physical mesh router unit. Keyed by serial number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    pub serial: String,
    pub serial_number: String,
    pub group_serial: String,
    pub role: NodeRole,
    pub led_on: bool,

    // Network identity
    pub ip: String,
    pub netmask: String,
    pub gateway: String,
    pub first_dns: String,
    pub second_dns: String,
    pub ipv6: String,

    // Hardware identity
    pub lan_mac: MacAddress,
    pub wan_mac: MacAddress,
    pub wifi_5g_mac: MacAddress,
    pub wifi_2g_mac: MacAddress,
    pub device_name: String,
    pub device_version: String,
    pub location: String,

    // Link telemetry
    pub uptime_secs: u64,
    pub link_quality: Option<String>,
    pub net_status: String,
    pub link_status: String,
    pub up_speed: String,
    pub down_speed: String,
    pub update_date: String,

    /// Firmware fields without a typed counterpart.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl NodeInfo {
    pub fn is_primary(&self) -> bool {
        self.role == NodeRole::Primary
    }

    /// Serials listed in the group serial (comma-separated).
    pub fn group_members(&self) -> Vec<&str> {
        self.group_serial
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Backhaul link quality in dBm, when reported and numeric.
    pub fn link_quality_dbm(&self) -> Option<i32> {
        self.link_quality
            .as_deref()
            .and_then(|q| q.trim().parse().ok())
    }
}
