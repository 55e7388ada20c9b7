//! WAN status handler.

use serde::Serialize;
use tabled::Tabled;
use twibi_core::{NetworkLinkStatus, WanInfo, WanStatistic};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Session;
use super::util::or_dash;

#[derive(Serialize)]
struct WanReport {
    statistics: Vec<WanStatistic>,
    addressing: Vec<WanInfo>,
    links: Vec<NetworkLinkStatus>,
}

#[derive(Tabled)]
struct WanRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Up")]
    up: String,
    #[tabled(rename = "Down")]
    down: String,
    #[tabled(rename = "Total Up")]
    total_up: String,
    #[tabled(rename = "Total Down")]
    total_down: String,
}

impl From<&WanStatistic> for WanRow {
    fn from(s: &WanStatistic) -> Self {
        Self {
            id: s.id.clone(),
            up: format!("{:.1}", s.up_speed_value()),
            down: format!("{:.1}", s.down_speed_value()),
            total_up: format!("{:.1}", s.total_upload_value()),
            total_down: format!("{:.1}", s.total_download_value()),
        }
    }
}

fn detail(report: &WanReport) -> String {
    use std::fmt::Write;

    let mut out = output::render_list(
        crate::cli::OutputFormat::Table,
        &report.statistics,
        |x| WanRow::from(x),
        |s| s.id.clone(),
    );
    for info in &report.addressing {
        let _ = write!(
            out,
            "\n\nWAN {}: {} / {} via {} (DNS {} {})",
            info.id,
            or_dash(&info.ip),
            or_dash(&info.netmask),
            or_dash(&info.gateway),
            or_dash(&info.first_dns),
            or_dash(&info.second_dns),
        );
    }
    for link in &report.links {
        let state = if link.is_connected() { "online" } else { "offline" };
        let _ = write!(out, "\nUplink {}: {state}", link.id);
    }
    out
}

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = session.snapshot().await?;
    // Link status is not part of the polling cycle; a failure here only
    // hides that section.
    let links = match session.coordinator.fetcher().get_network_link_status().await {
        Ok(links) => links,
        Err(e) => {
            tracing::debug!(error = %e, "network link status unavailable");
            Vec::new()
        }
    };

    let report = WanReport {
        statistics: snapshot.wan_statistics.clone(),
        addressing: snapshot.wan_info.clone().unwrap_or_default(),
        links,
    };
    let out = output::render_single(global.output, &report, detail, |r| {
        r.statistics
            .iter()
            .map(|s| format!("{} {} {}", s.id, s.up_speed_value(), s.down_speed_value()))
            .collect::<Vec<_>>()
            .join("\n")
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
