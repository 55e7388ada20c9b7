//! Command dispatch: bridges CLI args -> coordinator calls -> output formatting.

pub mod config_cmd;
pub mod control;
pub mod devices;
pub mod nodes;
pub mod settings;
pub mod util;
pub mod wan;
pub mod watch;

use std::sync::Arc;

use twibi_core::{CommandOutcome, CoreError, Coordinator, Snapshot};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// A coordinator bound to the profile it was built from.
pub struct Session {
    pub coordinator: Coordinator,
    pub profile: String,
}

impl Session {
    pub fn new(coordinator: Coordinator, profile: String) -> Self {
        Self {
            coordinator,
            profile,
        }
    }

    pub fn error(&self, err: CoreError) -> CliError {
        CliError::from_core(err, &self.profile, &self.coordinator.config().host)
    }

    /// Run one polling cycle and return the fresh snapshot.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>, CliError> {
        self.coordinator.refresh().await.map_err(|e| self.error(e))
    }

    /// Turn a soft command failure into a CLI error.
    pub fn applied(outcome: CommandOutcome, action: &str) -> Result<(), CliError> {
        match outcome {
            CommandOutcome::Applied => Ok(()),
            CommandOutcome::NotApplied { reason } => Err(CliError::CommandRejected {
                action: action.into(),
                reason,
            }),
        }
    }
}

/// Dispatch a router-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    session: &Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(global.color);
    match cmd {
        Command::Nodes(args) => nodes::handle(session, args, global).await,
        Command::Devices(args) => devices::handle(session, args, global).await,
        Command::Wan => wan::handle(session, global).await,
        Command::Settings => settings::handle(session, global, color).await,
        Command::Led { serial, state } => control::led(session, &serial, state, global).await,
        Command::Restart => control::restart(session, global).await,
        Command::Wifi(args) => control::wifi(session, args, global, color).await,
        Command::Guest(args) => control::guest(session, args, global).await,
        Command::Upnp { state } => control::upnp(session, state, global).await,
        Command::Watch(_) => watch::handle(session, global, color).await,
        // Handled before a session exists
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
