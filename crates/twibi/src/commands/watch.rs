//! `twibi watch`: drive the coordinator and print every update until Ctrl-C.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use twibi_core::{ConnectionStatus, Snapshot};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::Session;

/// One line of watch output.
#[derive(Serialize)]
struct Tick {
    fetched_at: String,
    status: String,
    #[serde(skip)]
    state: ConnectionStatus,
    recovering: bool,
    nodes: usize,
    devices: usize,
    wan_down: f64,
    wan_up: f64,
}

impl Tick {
    fn new(snapshot: &Snapshot, status: ConnectionStatus, recovering: bool) -> Self {
        let wan = snapshot.first_wan_statistic();
        Self {
            fetched_at: snapshot.fetched_at.to_rfc3339(),
            status: status.to_string(),
            state: status,
            recovering,
            nodes: snapshot.nodes.len(),
            devices: snapshot.devices.len(),
            wan_down: wan.map_or(0.0, twibi_core::WanStatistic::down_speed_value),
            wan_up: wan.map_or(0.0, twibi_core::WanStatistic::up_speed_value),
        }
    }

    fn render(&self, format: OutputFormat, color: bool) -> String {
        match format {
            OutputFormat::Table | OutputFormat::Plain => format!(
                "{}  {}{}  nodes={} devices={} down={:.1} up={:.1}",
                self.fetched_at,
                output::paint_status(self.state, color),
                if self.recovering { " (recovering)" } else { "" },
                self.nodes,
                self.devices,
                self.wan_down,
                self.wan_up,
            ),
            // One JSON document per line
            OutputFormat::Json | OutputFormat::JsonCompact => output::render_single(
                OutputFormat::JsonCompact,
                self,
                |_| String::new(),
                |_| String::new(),
            ),
            OutputFormat::Yaml => {
                let doc = output::render_single(
                    OutputFormat::Yaml,
                    self,
                    |_| String::new(),
                    |_| String::new(),
                );
                format!("---\n{}", doc.trim_end())
            }
        }
    }
}

pub async fn handle(session: &Session, global: &GlobalOpts, color: bool) -> Result<(), CliError> {
    let coordinator = session.coordinator.clone();
    let mut snapshots = coordinator.subscribe();
    let mut statuses = coordinator.subscribe_status();

    let cancel = CancellationToken::new();
    let driver = tokio::spawn({
        let coordinator = coordinator.clone();
        let cancel = cancel.clone();
        async move { coordinator.run(cancel).await }
    });

    if !global.quiet {
        eprintln!(
            "Watching {} every {}s (Ctrl-C to stop)",
            coordinator.config().host,
            coordinator.config().update_interval.as_secs()
        );
    }

    let mut last_status = *statuses.borrow();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = snapshot {
                    let tick = Tick::new(
                        &snapshot,
                        coordinator.connection_status(),
                        coordinator.is_restart_recovery(),
                    );
                    output::print_output(&tick.render(global.output, color), global.quiet);
                }
            }
            changed = statuses.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = *statuses.borrow_and_update();
                if status != last_status && status != ConnectionStatus::Connected {
                    tracing::warn!(
                        %status,
                        failures = coordinator.consecutive_failures(),
                        "router status changed"
                    );
                }
                last_status = status;
            }
        }
    }

    debug!("stopping refresh driver");
    cancel.cancel();
    let _ = driver.await;
    Ok(())
}
