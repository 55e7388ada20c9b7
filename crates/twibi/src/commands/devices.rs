//! Connected-device command handlers.

use tabled::Tabled;
use twibi_core::{CoreError, MacAddress, OnlineDevice};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Session;
use super::util::or_dash;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Connection")]
    connection: String,
    #[tabled(rename = "RSSI")]
    rssi: String,
    #[tabled(rename = "Node")]
    node: String,
}

impl From<&OnlineDevice> for DeviceRow {
    fn from(d: &OnlineDevice) -> Self {
        Self {
            mac: d.mac.to_string(),
            name: d.display_name(),
            ip: or_dash(&d.ip).to_owned(),
            connection: d.connection_type().to_owned(),
            rssi: or_dash(&d.rssi).to_owned(),
            node: or_dash(&d.node_serial).to_owned(),
        }
    }
}

#[derive(Tabled)]
struct KnownRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Online")]
    online: String,
}

fn detail(d: &OnlineDevice) -> String {
    [
        format!("Name:       {}", d.display_name()),
        format!("MAC:        {}", d.mac),
        format!("IP:         {}", or_dash(&d.ip)),
        format!("Connection: {}", d.connection_type()),
        format!("Node:       {}", or_dash(&d.node_serial)),
        format!("RSSI:       {}", or_dash(&d.rssi)),
        format!("TX rate:    {}", or_dash(&d.tx_rate)),
        format!("Upload:     {}", or_dash(&d.upload_speed)),
        format!("Download:   {}", or_dash(&d.download_speed)),
        format!("Connected:  {}", or_dash(&d.connect_time)),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = session.snapshot().await?;
    match args.command {
        DevicesCommand::List { .. } => {
            let out = output::render_list(
                global.output,
                &snapshot.devices,
                |x| DeviceRow::from(x),
                |d| d.mac.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
        DevicesCommand::Get { mac } => {
            let device = snapshot.device_by_mac(&mac).ok_or_else(|| {
                session.error(CoreError::NotFound {
                    entity: "device",
                    identifier: MacAddress::new(&mac).to_string(),
                })
            })?;
            let out = output::render_single(global.output, device, detail, |d| d.mac.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }
        DevicesCommand::Known => {
            let known = session.coordinator.known_devices();
            let out = output::render_list(
                global.output,
                &known,
                |mac| KnownRow {
                    mac: mac.to_string(),
                    online: if snapshot.device_by_mac(mac.as_str()).is_some() {
                        "yes"
                    } else {
                        "no"
                    }
                    .into(),
                },
                MacAddress::to_string,
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
