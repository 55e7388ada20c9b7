// ── Online client domain types ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::mac::MacAddress;

/// Radio band a client is attached through, decoded from the `wifi_mode` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WifiBand {
    /// `"--"`: plugged into an Ethernet port.
    Wired,
    /// `"AC"`
    FiveGhz,
    /// `"BGN"`
    TwoPointFourGhz,
    Unknown,
}

impl WifiBand {
    pub const WIRED_MARKER: &'static str = "--";

    pub fn from_marker(marker: &str) -> Self {
        match marker {
            Self::WIRED_MARKER => Self::Wired,
            "AC" => Self::FiveGhz,
            "BGN" => Self::TwoPointFourGhz,
            _ => Self::Unknown,
        }
    }

    /// Human-readable connection type.
    pub fn label(self) -> &'static str {
        match self {
            Self::Wired => "Ethernet",
            Self::FiveGhz => "5GHz",
            Self::TwoPointFourGhz => "2.4GHz",
            Self::Unknown => "Unknown",
        }
    }
}

/// A client currently associated with the mesh. Keyed by normalized MAC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineDevice {
    pub mac: MacAddress,
    pub ip: String,
    pub name: String,
    pub upload_speed: String,
    pub download_speed: String,
    pub connect_time: String,
    /// Serial of the node serving this client.
    pub node_serial: String,
    pub rssi: String,
    pub tx_rate: String,
    pub link_type: Option<String>,
    /// Raw band marker as reported.
    pub wifi_mode: String,
    pub band: WifiBand,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl OnlineDevice {
    pub fn is_wired(&self) -> bool {
        self.wifi_mode == WifiBand::WIRED_MARKER
    }

    pub fn connection_type(&self) -> &'static str {
        self.band.label()
    }

    /// The reported name, or `Device <mac>` when the firmware has none.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("Device {}", self.mac)
        } else {
            self.name.clone()
        }
    }
}

/// Drop Ethernet-attached clients, preserving order.
pub fn exclude_wired(devices: Vec<OnlineDevice>) -> Vec<OnlineDevice> {
    devices.into_iter().filter(|d| !d.is_wired()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(mac: &str, name: &str, mode: &str) -> OnlineDevice {
        OnlineDevice {
            mac: MacAddress::new(mac),
            ip: String::new(),
            name: name.into(),
            upload_speed: "0".into(),
            download_speed: "0".into(),
            connect_time: String::new(),
            node_serial: String::new(),
            rssi: "0".into(),
            tx_rate: "0".into(),
            link_type: None,
            wifi_mode: mode.into(),
            band: WifiBand::from_marker(mode),
            extra: Map::new(),
        }
    }

    #[test]
    fn band_markers() {
        assert_eq!(WifiBand::from_marker("--"), WifiBand::Wired);
        assert_eq!(WifiBand::from_marker("AC"), WifiBand::FiveGhz);
        assert_eq!(WifiBand::from_marker("BGN"), WifiBand::TwoPointFourGhz);
        assert_eq!(WifiBand::from_marker("AX"), WifiBand::Unknown);
    }

    #[test]
    fn display_name_falls_back_to_mac() {
        assert_eq!(
            device("AA:BB:CC:DD:EE:FF", "", "AC").display_name(),
            "Device aa:bb:cc:dd:ee:ff"
        );
        assert_eq!(device("AA:BB:CC:DD:EE:FF", "Phone", "AC").display_name(), "Phone");
    }

    #[test]
    fn wired_filter_is_an_order_preserving_subset() {
        let input = vec![
            device("00:00:00:00:00:01", "a", "AC"),
            device("00:00:00:00:00:02", "b", "--"),
            device("00:00:00:00:00:03", "c", "BGN"),
            device("00:00:00:00:00:04", "d", "??"),
            device("00:00:00:00:00:05", "e", "--"),
        ];
        let kept: Vec<String> = exclude_wired(input)
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(kept, ["a", "c", "d"]);
    }

    #[test]
    fn connection_type_labels() {
        assert_eq!(device("1", "", "--").connection_type(), "Ethernet");
        assert_eq!(device("1", "", "BGN").connection_type(), "2.4GHz");
    }
}
