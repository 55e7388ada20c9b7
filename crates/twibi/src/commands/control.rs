//! Command handlers that change router state.

use secrecy::SecretString;
use tracing::warn;
use twibi_core::{GuestInfo, GuestNetworkRequest};

use crate::cli::{GlobalOpts, GuestArgs, Toggle, WifiArgs, WifiCommand};
use crate::error::CliError;

use super::Session;
use super::util;

fn done(message: &str, global: &GlobalOpts) {
    if !global.quiet {
        eprintln!("{message}");
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

/// Set a node LED and refresh so the new state is read back.
pub async fn led(
    session: &Session,
    serial: &str,
    state: Toggle,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = session
        .coordinator
        .set_led_status_and_refresh(serial, state.enabled())
        .await;
    Session::applied(outcome, "led")?;

    let confirmed = session
        .coordinator
        .node_by_serial(serial)
        .map(|n| n.led_on);
    let message = match confirmed {
        Some(on) if on != state.enabled() => {
            format!("LED command sent to {serial}; router still reports it {}", on_off(on))
        }
        _ => format!("LED on {serial} turned {}", on_off(state.enabled())),
    };
    done(&message, global);
    Ok(())
}

pub async fn restart(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let host = session.coordinator.config().host.clone();
    if !util::confirm("restart", &format!("Reboot the mesh at {host}?"), global.yes)? {
        return Ok(());
    }
    Session::applied(session.coordinator.restart_router().await, "restart")?;
    done("Restart requested; the router will be unreachable for a few minutes", global);
    Ok(())
}

pub async fn wifi(
    session: &Session,
    args: WifiArgs,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    match args.command {
        WifiCommand::Show => super::settings::handle(session, global, color).await,
        WifiCommand::Set {
            ssid,
            security_type,
            security_mode,
            password_env,
        } => {
            if ssid.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "ssid".into(),
                    reason: "SSID cannot be empty".into(),
                });
            }
            let password = util::read_secret("Wi-Fi password: ", password_env.as_deref())?;
            if !util::confirm(
                "wifi set",
                &format!("Change the Wi-Fi network to '{ssid}'? Connected clients will drop."),
                global.yes,
            )? {
                return Ok(());
            }
            let outcome = session
                .coordinator
                .controller()
                .set_wifi_config(&ssid, &password, &security_type, &security_mode)
                .await;
            Session::applied(outcome, "wifi set")?;
            done(&format!("Wi-Fi network set to '{ssid}'"), global);
            Ok(())
        }
    }
}

pub async fn guest(
    session: &Session,
    args: GuestArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let enabled = args.state.enabled();
    let current = match session.coordinator.fetcher().get_guest_info().await {
        Ok(info) => info,
        Err(e) => {
            warn!(error = %e, "could not read current guest network settings");
            None
        }
    };
    if current.is_none() && (args.ssid.is_none() || !args.set_password) {
        return Err(CliError::Router {
            message: "current guest network settings are unavailable; pass --ssid and \
                      --set-password so the existing ones are not cleared"
                .into(),
        });
    }

    let password = if args.set_password {
        Some(util::read_secret("Guest password: ", None)?)
    } else {
        None
    };
    let mut request = guest_request(current.as_ref(), enabled, args.ssid, password);
    if let Some(time) = args.time {
        request.time_restriction = time;
    }
    if let Some(limit) = args.limit {
        request.bandwidth_limit = limit;
    }

    let outcome = session.coordinator.controller().set_guest_network(&request).await;
    Session::applied(outcome, "guest")?;
    done(
        &format!("Guest network {}", if enabled { "enabled" } else { "disabled" }),
        global,
    );
    Ok(())
}

/// Start from the router's current guest settings when known, then apply
/// explicit overrides.
fn guest_request(
    current: Option<&GuestInfo>,
    enabled: bool,
    ssid: Option<String>,
    password: Option<SecretString>,
) -> GuestNetworkRequest {
    let mut request = current.map_or_else(
        || GuestNetworkRequest::toggle(enabled),
        |info| GuestNetworkRequest::from_current(info, enabled),
    );
    if ssid.is_some() {
        request.ssid = ssid;
    }
    if password.is_some() {
        request.password = password;
    }
    request
}

pub async fn upnp(session: &Session, state: Toggle, global: &GlobalOpts) -> Result<(), CliError> {
    let outcome = session
        .coordinator
        .controller()
        .set_upnp_status(state.enabled())
        .await;
    Session::applied(outcome, "upnp")?;
    done(
        &format!("UPnP {}", if state.enabled() { "enabled" } else { "disabled" }),
        global,
    );
    Ok(())
}
