// Raw wire records for the router's module payloads
//
// Field names mirror the firmware exactly. Almost every value arrives as a
// JSON string, but some firmware builds emit bare numbers (notably
// `link_quality` and `Uptime`), so scalar fields go through the lenient
// deserializers below. Unknown keys are kept in `extra` so nothing the
// firmware adds is lost on the way up.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Object keyed by module name, as returned by `GET /goform/get`.
pub type ModuleMap = Map<String, Value>;

fn zero() -> String {
    "0".into()
}

fn wired_marker() -> String {
    "--".into()
}

/// Coerce any scalar into its string form; `null` becomes an empty string.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

/// Like [`lenient_string`] but keeps `null` distinct from an empty string.
pub fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Bool(b)) => Some(if b { "1" } else { "0" }.to_owned()),
        Some(other) => Some(other.to_string()),
    })
}

// ── node_info ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawNodeInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ip: String,
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub netmask: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gw: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_dns: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sec_dns: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub up_speed: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub down_speed: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub serial_number: String,
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub led: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lan_mac: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub wan_mac: String,
    #[serde(rename = "5Gwifi_mac", default, deserialize_with = "lenient_string")]
    pub wifi_5g_mac: String,
    #[serde(rename = "2Gwifi_mac", default, deserialize_with = "lenient_string")]
    pub wifi_2g_mac: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dut_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dut_version: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sn: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub groupsn: String,
    #[serde(rename = "Uptime", default, deserialize_with = "lenient_string")]
    pub uptime: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub up_date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ipv6: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub net_status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub link_status: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub link_quality: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── online_list ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOnlineDevice {
    #[serde(default, deserialize_with = "lenient_string")]
    pub dev_ip: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dev_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dev_mac: String,
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub download_speed: String,
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub upload_speed: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub connect_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sn: String,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub link_type: Option<String>,
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub rssi: String,
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub tx_rate: String,
    #[serde(default = "wired_marker", deserialize_with = "lenient_string")]
    pub wifi_mode: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── wan_statistic ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawWanStatistic {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub up_speed: String,
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub down_speed: String,
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub ttotal_up: String,
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub ttotal_down: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── wifi ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawWifi {
    #[serde(default, deserialize_with = "lenient_string")]
    pub ssid: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub security_type: String,
    #[serde(rename = "security", default, deserialize_with = "lenient_string")]
    pub security_mode: String,
    #[serde(rename = "pass", default, deserialize_with = "lenient_string")]
    pub password: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── guest_info ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGuestInfo {
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub guest_en: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub guest_ssid: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub guest_pass: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub guest_time: String,
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub limit: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── lan_info ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLanInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub lan_ip: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lan_mask: String,
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub dhcp_en: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_ip: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_ip: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lease_time: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dns1: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub dns2: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── wan_info ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawWanInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ip: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub netmask: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gw: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mac: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub first_dns: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub sec_dns: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ipv6: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ipv6_gw: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ipv6_first_dns: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub ipv6_sec_dns: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── upnp_info / net_link_status / getversion ─────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUpnpInfo {
    #[serde(default = "zero", deserialize_with = "lenient_string")]
    pub upnp_en: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawNetLinkStatus {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub net_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVersionInfo {
    #[serde(rename = "hasNew", default = "zero", deserialize_with = "lenient_string")]
    pub has_new: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub changelog: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub current_version: String,
    #[serde(rename = "sysHasNew", default = "zero", deserialize_with = "lenient_string")]
    pub sys_has_new: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_info_accepts_numeric_scalars() {
        let raw: RawNodeInfo = serde_json::from_value(json!({
            "sn": "SWSI100347178",
            "Uptime": 17662,
            "link_quality": -82,
            "5Gwifi_mac": "24:FD:0D:9A:82:33"
        }))
        .unwrap();
        assert_eq!(raw.uptime, "17662");
        assert_eq!(raw.link_quality.as_deref(), Some("-82"));
        assert_eq!(raw.wifi_5g_mac, "24:FD:0D:9A:82:33");
        assert_eq!(raw.role, "0");
        assert_eq!(raw.led, "0");
        assert_eq!(raw.gw, "");
    }

    #[test]
    fn online_device_defaults_follow_firmware_conventions() {
        let raw: RawOnlineDevice =
            serde_json::from_value(json!({ "dev_mac": "AA-BB-CC-DD-EE-FF" })).unwrap();
        assert_eq!(raw.wifi_mode, "--");
        assert_eq!(raw.rssi, "0");
        assert_eq!(raw.download_speed, "0");
        assert_eq!(raw.dev_name, "");
        assert!(raw.link_type.is_none());
    }

    #[test]
    fn unknown_fields_are_kept() {
        let raw: RawUpnpInfo =
            serde_json::from_value(json!({ "upnp_en": "1", "upnp_port": "1900" })).unwrap();
        assert_eq!(raw.upnp_en, "1");
        assert_eq!(raw.extra.get("upnp_port"), Some(&json!("1900")));
    }

    #[test]
    fn explicit_null_link_quality_stays_absent() {
        let raw: RawNodeInfo = serde_json::from_value(json!({ "link_quality": null })).unwrap();
        assert!(raw.link_quality.is_none());
    }
}
