// ── Domain model ──
//
// Typed records produced from the router's module payloads. All records are
// created fresh on every fetch; identity across fetches is by natural key
// only (node serial, client MAC, WAN id).

pub mod device;
pub mod mac;
pub mod network;
pub mod node;
pub mod settings;
pub mod snapshot;

pub use device::{OnlineDevice, WifiBand, exclude_wired};
pub use mac::MacAddress;
pub use network::{LanInfo, NetworkLinkStatus, WanInfo, WanStatistic};
pub use node::{NodeInfo, NodeRole};
pub use settings::{GuestInfo, UpnpInfo, VersionInfo, WifiInfo};
pub use snapshot::Snapshot;
