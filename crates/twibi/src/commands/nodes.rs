//! Mesh node command handlers.

use tabled::Tabled;
use twibi_core::{CoreError, NodeInfo};

use crate::cli::{GlobalOpts, NodesArgs, NodesCommand};
use crate::error::CliError;
use crate::output;

use super::Session;
use super::util::{format_uptime, or_dash};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "LED")]
    led: String,
}

impl From<&NodeInfo> for NodeRow {
    fn from(n: &NodeInfo) -> Self {
        Self {
            serial: n.serial.clone(),
            name: or_dash(&n.device_name).to_owned(),
            role: n.role.to_string(),
            ip: or_dash(&n.ip).to_owned(),
            uptime: format_uptime(n.uptime_secs),
            link: n
                .link_quality_dbm()
                .map_or_else(|| "-".into(), |dbm| format!("{dbm} dBm")),
            led: if n.led_on { "on" } else { "off" }.into(),
        }
    }
}

fn detail(n: &NodeInfo) -> String {
    let mut lines = vec![
        format!("Serial:    {}", n.serial),
        format!("Name:      {}", or_dash(&n.device_name)),
        format!("Role:      {}", n.role),
        format!("Firmware:  {}", or_dash(&n.device_version)),
        format!("Location:  {}", or_dash(&n.location)),
        format!("IP:        {}", or_dash(&n.ip)),
        format!("Gateway:   {}", or_dash(&n.gateway)),
        format!("LAN MAC:   {}", n.lan_mac),
        format!("WAN MAC:   {}", n.wan_mac),
        format!("Uptime:    {}", format_uptime(n.uptime_secs)),
        format!("LED:       {}", if n.led_on { "on" } else { "off" }),
    ];
    if let Some(dbm) = n.link_quality_dbm() {
        lines.push(format!("Link:      {dbm} dBm"));
    }
    let members = n.group_members();
    if !members.is_empty() {
        lines.push(format!("Mesh:      {}", members.join(", ")));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: NodesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = session.snapshot().await?;
    match args.command {
        NodesCommand::List => {
            let out = output::render_list(
                global.output,
                &snapshot.nodes,
                |x| NodeRow::from(x),
                |n| n.serial.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
        NodesCommand::Get { serial } => {
            let node = snapshot.node_by_serial(&serial).ok_or_else(|| {
                session.error(CoreError::NotFound {
                    entity: "node",
                    identifier: serial.clone(),
                })
            })?;
            let out = output::render_single(global.output, node, detail, |n| n.serial.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
