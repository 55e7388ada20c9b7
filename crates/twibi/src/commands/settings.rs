//! Router settings overview.

use serde::Serialize;
use twibi_core::{LanInfo, Snapshot, VersionInfo};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Session;
use super::util::or_dash;

/// Settings as shown to the user. Passwords are reported as set/unset only.
#[derive(Serialize)]
pub struct SettingsView {
    lan: Option<LanInfo>,
    wifi: Option<WifiView>,
    guest: Option<GuestView>,
    upnp_enabled: Option<bool>,
    firmware: Option<VersionInfo>,
}

#[derive(Serialize)]
struct WifiView {
    ssid: String,
    security_type: String,
    security_mode: String,
    password_set: bool,
}

#[derive(Serialize)]
struct GuestView {
    enabled: bool,
    ssid: String,
    password_set: bool,
    time_restriction: String,
    bandwidth_limit: String,
}

impl SettingsView {
    pub fn new(snapshot: &Snapshot, firmware: Option<VersionInfo>) -> Self {
        Self {
            lan: snapshot.lan_info.clone(),
            wifi: snapshot.wifi.as_ref().map(|w| WifiView {
                ssid: w.ssid.clone(),
                security_type: w.security_type.clone(),
                security_mode: w.security_mode.clone(),
                password_set: !w.password.is_empty(),
            }),
            guest: snapshot.guest.as_ref().map(|g| GuestView {
                enabled: g.enabled,
                ssid: g.ssid.clone(),
                password_set: !g.password.is_empty(),
                time_restriction: g.time_restriction.clone(),
                bandwidth_limit: g.bandwidth_limit.clone(),
            }),
            upnp_enabled: snapshot.upnp.as_ref().map(|u| u.enabled),
            firmware,
        }
    }

    pub fn wifi_ssid(&self) -> Option<&str> {
        self.wifi.as_ref().map(|w| w.ssid.as_str())
    }
}

fn detail(view: &SettingsView, color: bool) -> String {
    const UNAVAILABLE: &str = "(unavailable)";
    let mut lines = Vec::new();

    match &view.lan {
        Some(lan) => {
            lines.push(format!(
                "LAN:        {} / {}",
                or_dash(&lan.lan_ip),
                or_dash(&lan.lan_mask)
            ));
            lines.push(format!(
                "DHCP:       {} ({} - {})",
                output::paint_flag(lan.dhcp_enabled, color),
                or_dash(&lan.start_ip),
                or_dash(&lan.end_ip)
            ));
        }
        None => lines.push(format!("LAN:        {UNAVAILABLE}")),
    }
    match &view.wifi {
        Some(w) => lines.push(format!(
            "Wi-Fi:      {} ({} {})",
            or_dash(&w.ssid),
            or_dash(&w.security_type),
            or_dash(&w.security_mode)
        )),
        None => lines.push(format!("Wi-Fi:      {UNAVAILABLE}")),
    }
    match &view.guest {
        Some(g) => lines.push(format!(
            "Guest:      {} {}",
            output::paint_flag(g.enabled, color),
            or_dash(&g.ssid)
        )),
        None => lines.push(format!("Guest:      {UNAVAILABLE}")),
    }
    lines.push(format!(
        "UPnP:       {}",
        view.upnp_enabled
            .map_or_else(|| UNAVAILABLE.to_owned(), |on| output::paint_flag(on, color))
    ));
    if let Some(fw) = &view.firmware {
        let update = if fw.has_new || fw.system_has_new {
            format!(" (update available: {})", or_dash(&fw.version))
        } else {
            String::new()
        };
        lines.push(format!("Firmware:   {}{update}", or_dash(&fw.current_version)));
    }
    lines.join("\n")
}

pub async fn handle(session: &Session, global: &GlobalOpts, color: bool) -> Result<(), CliError> {
    let snapshot = session.snapshot().await?;
    let firmware = match session.coordinator.fetcher().get_version_info().await {
        Ok(info) => info,
        Err(e) => {
            tracing::debug!(error = %e, "firmware version unavailable");
            None
        }
    };

    let view = SettingsView::new(&snapshot, firmware);
    let out = output::render_single(
        global.output,
        &view,
        |v| detail(v, color),
        |v| v.wifi_ssid().unwrap_or_default().to_owned(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
