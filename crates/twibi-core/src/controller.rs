// ── Router commands ──
//
// Fire-and-forget configuration changes. A command failure must never
// surface as an error to the caller (a UI toggle should not blow up the
// polling loop), so every method folds failures into `CommandOutcome`.
// Nothing is read back here; callers refresh afterwards if they need to.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, info, warn};

use twibi_api::{Connection, SetCommand, timestamp_ms};

use crate::model::GuestInfo;

/// Result of issuing a command to the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The router accepted the request.
    Applied,
    /// The request failed; `reason` describes why.
    NotApplied { reason: String },
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Guest network settings for [`RouterController::set_guest_network`].
#[derive(Debug, Clone)]
pub struct GuestNetworkRequest {
    pub enabled: bool,
    pub ssid: Option<String>,
    pub password: Option<SecretString>,
    pub time_restriction: String,
    pub bandwidth_limit: String,
}

impl GuestNetworkRequest {
    /// Toggle the guest network, leaving SSID and password empty.
    pub fn toggle(enabled: bool) -> Self {
        Self {
            enabled,
            ssid: None,
            password: None,
            time_restriction: "always".into(),
            bandwidth_limit: "0".into(),
        }
    }

    /// Change only the enabled flag, keeping the router's current SSID,
    /// password and limits.
    pub fn from_current(current: &GuestInfo, enabled: bool) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_owned());
        Self {
            enabled,
            ssid: non_empty(&current.ssid),
            password: non_empty(&current.password).map(SecretString::from),
            time_restriction: non_empty(&current.time_restriction)
                .unwrap_or_else(|| "always".into()),
            bandwidth_limit: non_empty(&current.bandwidth_limit).unwrap_or_else(|| "0".into()),
        }
    }
}

/// Issues `/goform/set` commands through a shared connection.
#[derive(Clone)]
pub struct RouterController {
    connection: Arc<Connection>,
}

impl RouterController {
    pub fn new(connection: Arc<Connection>) -> Self {
        Self { connection }
    }

    async fn issue(&self, command: SetCommand) -> CommandOutcome {
        let key = command.key();
        match self.connection.send_command(&command).await {
            Ok(_) => {
                debug!(command = key, "command applied");
                CommandOutcome::Applied
            }
            Err(e) => {
                warn!(command = key, error = %e, "command failed");
                CommandOutcome::NotApplied {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Turn a node's status LED on or off.
    pub async fn set_led_status(&self, serial: &str, enabled: bool) -> CommandOutcome {
        debug!(serial, enabled, "setting LED");
        self.issue(SetCommand::led(serial, enabled, timestamp_ms()))
            .await
    }

    /// Reboot the whole mesh. The router drops off the network for a while
    /// afterwards.
    pub async fn restart_router(&self) -> CommandOutcome {
        let outcome = self.issue(SetCommand::reboot(timestamp_ms())).await;
        if outcome.is_applied() {
            info!(host = %self.connection.host(), "router restart requested");
        }
        outcome
    }

    /// Set the main Wi-Fi network. Firmware defaults are `aes` / `psk psk2`.
    pub async fn set_wifi_config(
        &self,
        ssid: &str,
        password: &SecretString,
        security_type: &str,
        security_mode: &str,
    ) -> CommandOutcome {
        self.issue(SetCommand::wifi(
            ssid,
            password,
            security_type,
            security_mode,
            timestamp_ms(),
        ))
        .await
    }

    pub async fn set_guest_network(&self, request: &GuestNetworkRequest) -> CommandOutcome {
        let command = SetCommand::guest_network(
            request.enabled,
            request.ssid.as_deref(),
            request.password.as_ref(),
            &request.time_restriction,
            &request.bandwidth_limit,
            timestamp_ms(),
        );
        info!(payload = %command.redacted(), "configuring guest network");
        self.issue(command).await
    }

    pub async fn set_upnp_status(&self, enabled: bool) -> CommandOutcome {
        self.issue(SetCommand::upnp(enabled, timestamp_ms())).await
    }
}
