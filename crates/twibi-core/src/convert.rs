// ── Wire-to-domain conversions ──
//
// Bridges raw `twibi_api::models` records into `twibi_core::model` types.
// Each `From` impl decodes the firmware's string sentinels into strong
// types and normalizes MAC addresses; unmodeled fields ride along in `extra`.

use twibi_api::models::{
    RawGuestInfo, RawLanInfo, RawNetLinkStatus, RawNodeInfo, RawOnlineDevice, RawUpnpInfo,
    RawVersionInfo, RawWanInfo, RawWanStatistic, RawWifi,
};

use crate::model::{
    GuestInfo, LanInfo, MacAddress, NetworkLinkStatus, NodeInfo, NodeRole, OnlineDevice,
    UpnpInfo, VersionInfo, WanInfo, WanStatistic, WifiBand, WifiInfo,
};

/// Firmware boolean sentinel: `"1"` is on, anything else is off.
fn flag(raw: &str) -> bool {
    raw.trim() == "1"
}

/// Uptime arrives as whole seconds, occasionally with a fractional part.
fn parse_uptime(raw: &str) -> u64 {
    let raw = raw.trim();
    raw.parse::<u64>().unwrap_or_else(|_| {
        raw.split('.')
            .next()
            .and_then(|whole| whole.parse().ok())
            .unwrap_or(0)
    })
}

impl From<RawNodeInfo> for NodeInfo {
    fn from(raw: RawNodeInfo) -> Self {
        Self {
            id: raw.id,
            serial: raw.sn,
            serial_number: raw.serial_number,
            group_serial: raw.groupsn,
            role: NodeRole::from_marker(&raw.role),
            led_on: flag(&raw.led),
            ip: raw.ip,
            netmask: raw.netmask,
            gateway: raw.gw,
            first_dns: raw.first_dns,
            second_dns: raw.sec_dns,
            ipv6: raw.ipv6,
            lan_mac: MacAddress::new(raw.lan_mac),
            wan_mac: MacAddress::new(raw.wan_mac),
            wifi_5g_mac: MacAddress::new(raw.wifi_5g_mac),
            wifi_2g_mac: MacAddress::new(raw.wifi_2g_mac),
            device_name: raw.dut_name,
            device_version: raw.dut_version,
            location: raw.location,
            uptime_secs: parse_uptime(&raw.uptime),
            link_quality: raw.link_quality,
            net_status: raw.net_status,
            link_status: raw.link_status,
            up_speed: raw.up_speed,
            down_speed: raw.down_speed,
            update_date: raw.up_date,
            extra: raw.extra,
        }
    }
}

impl From<RawOnlineDevice> for OnlineDevice {
    fn from(raw: RawOnlineDevice) -> Self {
        Self {
            mac: MacAddress::new(raw.dev_mac),
            ip: raw.dev_ip,
            name: raw.dev_name,
            upload_speed: raw.upload_speed,
            download_speed: raw.download_speed,
            connect_time: raw.connect_time,
            node_serial: raw.sn,
            rssi: raw.rssi,
            tx_rate: raw.tx_rate,
            link_type: raw.link_type,
            band: WifiBand::from_marker(&raw.wifi_mode),
            wifi_mode: raw.wifi_mode,
            extra: raw.extra,
        }
    }
}

impl From<RawWanStatistic> for WanStatistic {
    fn from(raw: RawWanStatistic) -> Self {
        Self {
            id: raw.id,
            up_speed: raw.up_speed,
            down_speed: raw.down_speed,
            total_upload: raw.ttotal_up,
            total_download: raw.ttotal_down,
            extra: raw.extra,
        }
    }
}

impl From<RawWanInfo> for WanInfo {
    fn from(raw: RawWanInfo) -> Self {
        Self {
            id: raw.id,
            ip: raw.ip,
            netmask: raw.netmask,
            gateway: raw.gw,
            mac: MacAddress::new(raw.mac),
            first_dns: raw.first_dns,
            second_dns: raw.sec_dns,
            ipv6: raw.ipv6,
            ipv6_gateway: raw.ipv6_gw,
            ipv6_first_dns: raw.ipv6_first_dns,
            ipv6_second_dns: raw.ipv6_sec_dns,
            extra: raw.extra,
        }
    }
}

impl From<RawLanInfo> for LanInfo {
    fn from(raw: RawLanInfo) -> Self {
        Self {
            lan_ip: raw.lan_ip,
            lan_mask: raw.lan_mask,
            dhcp_enabled: flag(&raw.dhcp_en),
            start_ip: raw.start_ip,
            end_ip: raw.end_ip,
            lease_time: raw.lease_time,
            dns1: raw.dns1,
            dns2: raw.dns2,
            extra: raw.extra,
        }
    }
}

impl From<RawWifi> for WifiInfo {
    fn from(raw: RawWifi) -> Self {
        Self {
            ssid: raw.ssid,
            security_type: raw.security_type,
            security_mode: raw.security_mode,
            password: raw.password,
            extra: raw.extra,
        }
    }
}

impl From<RawGuestInfo> for GuestInfo {
    fn from(raw: RawGuestInfo) -> Self {
        Self {
            enabled: flag(&raw.guest_en),
            ssid: raw.guest_ssid,
            password: raw.guest_pass,
            time_restriction: raw.guest_time,
            bandwidth_limit: raw.limit,
            extra: raw.extra,
        }
    }
}

impl From<RawUpnpInfo> for UpnpInfo {
    fn from(raw: RawUpnpInfo) -> Self {
        Self {
            enabled: flag(&raw.upnp_en),
            extra: raw.extra,
        }
    }
}

impl From<RawNetLinkStatus> for NetworkLinkStatus {
    fn from(raw: RawNetLinkStatus) -> Self {
        Self {
            id: raw.id,
            net_status: raw.net_status,
        }
    }
}

impl From<RawVersionInfo> for VersionInfo {
    fn from(raw: RawVersionInfo) -> Self {
        Self {
            has_new: flag(&raw.has_new),
            version: raw.version,
            changelog: raw.changelog,
            current_version: raw.current_version,
            system_has_new: flag(&raw.sys_has_new),
        }
    }
}
