// Module identifiers understood by `GET /goform/get?module_id=...`.
//
// The firmware groups its state into named modules; a single request may
// name several, comma-separated, and the response is an object keyed by
// module name.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// A named data category exposed by the router firmware.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum ModuleId {
    #[strum(serialize = "node_info")]
    #[serde(rename = "node_info")]
    NodeInfo,
    #[strum(serialize = "online_list")]
    #[serde(rename = "online_list")]
    OnlineList,
    #[strum(serialize = "wan_statistic")]
    #[serde(rename = "wan_statistic")]
    WanStatistic,
    #[strum(serialize = "wan_info")]
    #[serde(rename = "wan_info")]
    WanInfo,
    #[strum(serialize = "lan_info")]
    #[serde(rename = "lan_info")]
    LanInfo,
    #[strum(serialize = "wifi")]
    #[serde(rename = "wifi")]
    Wifi,
    #[strum(serialize = "guest_info")]
    #[serde(rename = "guest_info")]
    GuestInfo,
    #[strum(serialize = "static_ip")]
    #[serde(rename = "static_ip")]
    StaticIp,
    #[strum(serialize = "port_list")]
    #[serde(rename = "port_list")]
    PortList,
    #[strum(serialize = "upnp_info")]
    #[serde(rename = "upnp_info")]
    UpnpInfo,
    #[strum(serialize = "tr069_info")]
    #[serde(rename = "tr069_info")]
    Tr069Info,
    #[strum(serialize = "remote_web")]
    #[serde(rename = "remote_web")]
    RemoteWeb,
    #[strum(serialize = "dns_conf")]
    #[serde(rename = "dns_conf")]
    DnsConf,
    #[strum(serialize = "mac_clone")]
    #[serde(rename = "mac_clone")]
    MacClone,
    #[strum(serialize = "getversion")]
    #[serde(rename = "getversion")]
    GetVersion,
    #[strum(serialize = "net_link_status")]
    #[serde(rename = "net_link_status")]
    NetLinkStatus,
    #[strum(serialize = "link_module")]
    #[serde(rename = "link_module")]
    LinkModule,
    #[strum(serialize = "localhost")]
    #[serde(rename = "localhost")]
    Localhost,
    #[strum(serialize = "getupgradestatus")]
    #[serde(rename = "getupgradestatus")]
    GetUpgradeStatus,
    /// Spelled this way by the firmware.
    #[strum(serialize = "serach_node")]
    #[serde(rename = "serach_node")]
    SearchNode,
    #[strum(serialize = "static_wan_info")]
    #[serde(rename = "static_wan_info")]
    StaticWanInfo,
    #[strum(serialize = "dynamic_wan_info")]
    #[serde(rename = "dynamic_wan_info")]
    DynamicWanInfo,
    #[strum(serialize = "net_link_check")]
    #[serde(rename = "net_link_check")]
    NetLinkCheck,
}

impl ModuleId {
    /// Modules that must succeed for a polling cycle to count.
    pub const CORE: [Self; 3] = [Self::NodeInfo, Self::OnlineList, Self::WanStatistic];

    /// Modules fetched one at a time on a best-effort basis.
    pub const EXTENDED: [Self; 5] = [
        Self::WanInfo,
        Self::LanInfo,
        Self::Wifi,
        Self::GuestInfo,
        Self::UpnpInfo,
    ];

    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

/// Join module names into the `module_id` query value.
pub fn join_modules(modules: &[ModuleId]) -> String {
    modules
        .iter()
        .map(ModuleId::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
