// ── Aggregate snapshot ──
//
// Everything one successful poll cycle produced. The coordinator caches the
// latest one behind an `Arc` and swaps it whole; nothing is mutated in place.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::device::OnlineDevice;
use super::mac::MacAddress;
use super::network::{LanInfo, WanInfo, WanStatistic};
use super::node::NodeInfo;
use super::settings::{GuestInfo, UpnpInfo, WifiInfo};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<NodeInfo>,
    pub devices: Vec<OnlineDevice>,
    pub wan_statistics: Vec<WanStatistic>,

    // Extended modules: absent when their fetch failed this cycle.
    pub wan_info: Option<Vec<WanInfo>>,
    pub lan_info: Option<LanInfo>,
    pub wifi: Option<WifiInfo>,
    pub guest: Option<GuestInfo>,
    pub upnp: Option<UpnpInfo>,

    /// Modules returned by the router that have no typed model.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,

    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    /// The node whose role marker says primary; first match wins.
    pub fn primary_node(&self) -> Option<&NodeInfo> {
        self.nodes.iter().find(|n| n.is_primary())
    }

    pub fn secondary_nodes(&self) -> impl Iterator<Item = &NodeInfo> {
        self.nodes.iter().filter(|n| !n.is_primary())
    }

    pub fn node_by_serial(&self, serial: &str) -> Option<&NodeInfo> {
        self.nodes.iter().find(|n| n.serial == serial)
    }

    /// Look up a client by MAC in any common notation.
    pub fn device_by_mac(&self, mac: &str) -> Option<&OnlineDevice> {
        let wanted = MacAddress::new(mac);
        self.devices.iter().find(|d| d.mac == wanted)
    }

    pub fn first_wan_statistic(&self) -> Option<&WanStatistic> {
        self.wan_statistics.first()
    }

    /// Uptime per node serial.
    pub fn uptimes(&self) -> HashMap<&str, u64> {
        self.nodes
            .iter()
            .map(|n| (n.serial.as_str(), n.uptime_secs))
            .collect()
    }
}
