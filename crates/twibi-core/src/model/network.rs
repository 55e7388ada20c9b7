// ── WAN / LAN domain types ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::mac::MacAddress;

/// Per-WAN-interface traffic counters. Keyed by WAN id.
///
/// Speeds and totals are kept as reported; the firmware's units vary by
/// build, so only the numeric accessors interpret them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WanStatistic {
    pub id: String,
    pub up_speed: String,
    pub down_speed: String,
    pub total_upload: String,
    pub total_download: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

fn parse_or_zero(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(0.0)
}

impl WanStatistic {
    pub fn up_speed_value(&self) -> f64 {
        parse_or_zero(&self.up_speed)
    }

    pub fn down_speed_value(&self) -> f64 {
        parse_or_zero(&self.down_speed)
    }

    pub fn total_upload_value(&self) -> f64 {
        parse_or_zero(&self.total_upload)
    }

    pub fn total_download_value(&self) -> f64 {
        parse_or_zero(&self.total_download)
    }
}

/// WAN interface addressing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WanInfo {
    pub id: String,
    pub ip: String,
    pub netmask: String,
    pub gateway: String,
    pub mac: MacAddress,
    pub first_dns: String,
    pub second_dns: String,
    pub ipv6: String,
    pub ipv6_gateway: String,
    pub ipv6_first_dns: String,
    pub ipv6_second_dns: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// LAN addressing and DHCP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanInfo {
    pub lan_ip: String,
    pub lan_mask: String,
    pub dhcp_enabled: bool,
    pub start_ip: String,
    pub end_ip: String,
    pub lease_time: String,
    pub dns1: String,
    pub dns2: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Internet reachability per node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkLinkStatus {
    pub id: String,
    pub net_status: String,
}

impl NetworkLinkStatus {
    /// Status code `"3"` means the uplink is online.
    pub fn is_connected(&self) -> bool {
        self.net_status == "3"
    }
}
