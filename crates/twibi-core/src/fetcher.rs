// ── Module fetching and decoding ──
//
// Issues module-scoped GETs through the shared `Connection` and turns the
// raw JSON into domain records. Decoding is strict about shape (a list
// module must be a list) and lenient about content (missing scalars take
// the firmware's defaults).

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use twibi_api::models::{
    RawGuestInfo, RawLanInfo, RawNetLinkStatus, RawNodeInfo, RawOnlineDevice, RawUpnpInfo,
    RawVersionInfo, RawWanInfo, RawWanStatistic, RawWifi,
};
use twibi_api::{Connection, ModuleId, ModuleMap};

use crate::error::CoreError;
use crate::model::{
    GuestInfo, LanInfo, NetworkLinkStatus, NodeInfo, OnlineDevice, Snapshot,
    UpnpInfo, VersionInfo, WanInfo, WanStatistic, WifiInfo, exclude_wired,
};

// ── Decoding helpers ────────────────────────────────────────────────

fn decode_list<R, T>(module: ModuleId, value: Value) -> Result<Vec<T>, CoreError>
where
    R: DeserializeOwned,
    T: From<R>,
{
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value::<Vec<R>>(value)
        .map(|items| items.into_iter().map(T::from).collect())
        .map_err(|e| CoreError::validation(format!("module `{module}`: {e}")))
}

/// Singleton modules: `null` and `{}` both mean "not reported".
fn decode_single<R, T>(module: ModuleId, value: Value) -> Result<Option<T>, CoreError>
where
    R: DeserializeOwned,
    T: From<R>,
{
    match &value {
        Value::Null => return Ok(None),
        Value::Object(map) if map.is_empty() => return Ok(None),
        _ => {}
    }
    serde_json::from_value::<R>(value)
        .map(|raw| Some(T::from(raw)))
        .map_err(|e| CoreError::validation(format!("module `{module}`: {e}")))
}

fn take(raw: &mut ModuleMap, module: ModuleId) -> Value {
    raw.remove(module.as_str()).unwrap_or(Value::Null)
}

// ── FetchedModules ──────────────────────────────────────────────────

/// Decoded result of one or more `get` requests.
///
/// Fields stay `None` for modules the router did not return, so partial
/// results from separate requests can be merged before validation.
#[derive(Debug, Default, Clone)]
pub struct FetchedModules {
    pub nodes: Option<Vec<NodeInfo>>,
    pub devices: Option<Vec<OnlineDevice>>,
    pub wan_statistics: Option<Vec<WanStatistic>>,
    pub wan_info: Option<Vec<WanInfo>>,
    pub lan_info: Option<LanInfo>,
    pub wifi: Option<WifiInfo>,
    pub guest: Option<GuestInfo>,
    pub upnp: Option<UpnpInfo>,
    /// Modules with no typed model, passed through untouched.
    pub extra: Map<String, Value>,
}

impl FetchedModules {
    /// Overlay `other` onto `self`; modules present in `other` win.
    pub fn merge(&mut self, other: Self) {
        fn overlay<T>(slot: &mut Option<T>, incoming: Option<T>) {
            if incoming.is_some() {
                *slot = incoming;
            }
        }
        overlay(&mut self.nodes, other.nodes);
        overlay(&mut self.devices, other.devices);
        overlay(&mut self.wan_statistics, other.wan_statistics);
        overlay(&mut self.wan_info, other.wan_info);
        overlay(&mut self.lan_info, other.lan_info);
        overlay(&mut self.wifi, other.wifi);
        overlay(&mut self.guest, other.guest);
        overlay(&mut self.upnp, other.upnp);
        self.extra.extend(other.extra);
    }

    /// Validate the core modules and freeze into a [`Snapshot`].
    ///
    /// The node list must be non-empty with unique serials; the device and
    /// WAN statistic lists must be present but may be empty.
    pub fn into_snapshot(self, fetched_at: DateTime<Utc>) -> Result<Snapshot, CoreError> {
        let nodes = match self.nodes {
            Some(nodes) if !nodes.is_empty() => nodes,
            Some(_) => return Err(CoreError::validation("node_info is empty")),
            None => return Err(CoreError::validation("node_info missing from response")),
        };
        {
            let mut serials = HashSet::with_capacity(nodes.len());
            if let Some(dup) = nodes.iter().find(|n| !serials.insert(n.serial.as_str())) {
                return Err(CoreError::validation(format!(
                    "node_info lists serial {} more than once",
                    dup.serial
                )));
            }
        }
        let devices = self
            .devices
            .ok_or_else(|| CoreError::validation("online_list missing from response"))?;
        let wan_statistics = self
            .wan_statistics
            .ok_or_else(|| CoreError::validation("wan_statistic missing from response"))?;

        Ok(Snapshot {
            nodes,
            devices,
            wan_statistics,
            wan_info: self.wan_info,
            lan_info: self.lan_info,
            wifi: self.wifi,
            guest: self.guest,
            upnp: self.upnp,
            extra: self.extra,
            fetched_at,
        })
    }
}

// ── DataFetcher ─────────────────────────────────────────────────────

/// Fetches modules and maps them into domain records.
#[derive(Clone)]
pub struct DataFetcher {
    connection: Arc<Connection>,
    exclude_wired: bool,
}

impl DataFetcher {
    pub fn new(connection: Arc<Connection>, exclude_wired: bool) -> Self {
        Self {
            connection,
            exclude_wired,
        }
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    pub fn excludes_wired(&self) -> bool {
        self.exclude_wired
    }

    /// Fetch `modules` in one request and decode every module returned.
    pub async fn get_all_data(&self, modules: &[ModuleId]) -> Result<FetchedModules, CoreError> {
        let raw = self.connection.get_data(modules).await?;
        self.map_modules(raw)
    }

    /// Decode a raw module map. Unrecognized modules pass through in `extra`.
    pub fn map_modules(&self, raw: ModuleMap) -> Result<FetchedModules, CoreError> {
        let mut out = FetchedModules::default();

        for (key, value) in raw {
            let Ok(module) = key.parse::<ModuleId>() else {
                trace!(module = %key, "passing through unknown module");
                out.extra.insert(key, value);
                continue;
            };
            match module {
                ModuleId::NodeInfo => {
                    out.nodes = Some(decode_list::<RawNodeInfo, _>(module, value)?);
                }
                ModuleId::OnlineList => {
                    let devices = decode_list::<RawOnlineDevice, OnlineDevice>(module, value)?;
                    out.devices = Some(self.filter_devices(devices));
                }
                ModuleId::WanStatistic => {
                    out.wan_statistics = Some(decode_list::<RawWanStatistic, _>(module, value)?);
                }
                ModuleId::WanInfo => {
                    out.wan_info = Some(decode_list::<RawWanInfo, _>(module, value)?);
                }
                ModuleId::LanInfo => out.lan_info = decode_single::<RawLanInfo, _>(module, value)?,
                ModuleId::Wifi => out.wifi = decode_single::<RawWifi, _>(module, value)?,
                ModuleId::GuestInfo => {
                    out.guest = decode_single::<RawGuestInfo, _>(module, value)?;
                }
                ModuleId::UpnpInfo => out.upnp = decode_single::<RawUpnpInfo, _>(module, value)?,
                _ => {
                    out.extra.insert(key, value);
                }
            }
        }

        Ok(out)
    }

    fn filter_devices(&self, devices: Vec<OnlineDevice>) -> Vec<OnlineDevice> {
        if self.exclude_wired {
            let total = devices.len();
            let kept = exclude_wired(devices);
            debug!(total, kept = kept.len(), "excluded wired clients");
            kept
        } else {
            devices
        }
    }

    async fn fetch_one(&self, module: ModuleId) -> Result<Value, CoreError> {
        let mut raw = self.connection.get_data(&[module]).await?;
        Ok(take(&mut raw, module))
    }

    // ── Per-module accessors ─────────────────────────────────────────

    pub async fn get_node_info(&self) -> Result<Vec<NodeInfo>, CoreError> {
        let value = self.fetch_one(ModuleId::NodeInfo).await?;
        decode_list::<RawNodeInfo, _>(ModuleId::NodeInfo, value)
    }

    /// Online clients, with wired ones dropped when so configured.
    pub async fn get_online_devices(&self) -> Result<Vec<OnlineDevice>, CoreError> {
        let value = self.fetch_one(ModuleId::OnlineList).await?;
        let devices = decode_list::<RawOnlineDevice, _>(ModuleId::OnlineList, value)?;
        Ok(self.filter_devices(devices))
    }

    pub async fn get_wan_statistics(&self) -> Result<Vec<WanStatistic>, CoreError> {
        let value = self.fetch_one(ModuleId::WanStatistic).await?;
        decode_list::<RawWanStatistic, _>(ModuleId::WanStatistic, value)
    }

    pub async fn get_wan_info(&self) -> Result<Vec<WanInfo>, CoreError> {
        let value = self.fetch_one(ModuleId::WanInfo).await?;
        decode_list::<RawWanInfo, _>(ModuleId::WanInfo, value)
    }

    pub async fn get_lan_info(&self) -> Result<Option<LanInfo>, CoreError> {
        let value = self.fetch_one(ModuleId::LanInfo).await?;
        decode_single::<RawLanInfo, _>(ModuleId::LanInfo, value)
    }

    pub async fn get_wifi_info(&self) -> Result<Option<WifiInfo>, CoreError> {
        let value = self.fetch_one(ModuleId::Wifi).await?;
        decode_single::<RawWifi, _>(ModuleId::Wifi, value)
    }

    pub async fn get_guest_info(&self) -> Result<Option<GuestInfo>, CoreError> {
        let value = self.fetch_one(ModuleId::GuestInfo).await?;
        decode_single::<RawGuestInfo, _>(ModuleId::GuestInfo, value)
    }

    pub async fn get_upnp_info(&self) -> Result<Option<UpnpInfo>, CoreError> {
        let value = self.fetch_one(ModuleId::UpnpInfo).await?;
        decode_single::<RawUpnpInfo, _>(ModuleId::UpnpInfo, value)
    }

    pub async fn get_network_link_status(&self) -> Result<Vec<NetworkLinkStatus>, CoreError> {
        let value = self.fetch_one(ModuleId::NetLinkStatus).await?;
        decode_list::<RawNetLinkStatus, _>(ModuleId::NetLinkStatus, value)
    }

    pub async fn get_version_info(&self) -> Result<Option<VersionInfo>, CoreError> {
        let value = self.fetch_one(ModuleId::GetVersion).await?;
        decode_single::<RawVersionInfo, _>(ModuleId::GetVersion, value)
    }

    /// Cheap liveness probe: authenticated `node_info` fetch that must
    /// return at least one node.
    pub async fn health_check(&self) -> Result<(), CoreError> {
        let nodes = self.get_node_info().await?;
        if nodes.is_empty() {
            return Err(CoreError::health_check("router returned no node information", None));
        }
        trace!(nodes = nodes.len(), "health check passed");
        Ok(())
    }
}
