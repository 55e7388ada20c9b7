//! CLI configuration -- thin wrapper around `twibi_config` shared types.
//!
//! Adds CLI-specific resolution that respects `GlobalOpts` flag overrides
//! (--host, --timeout).

use std::time::Duration;

use twibi_core::RouterConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use twibi_config::{
    Config, FileDeviceStore, Profile, config_path, load_config, resolve_password, router_config,
    save_config, store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Build a `RouterConfig` from the config file, active profile and flags.
///
/// Without a matching profile, `--host` plus `TWIBI_PASSWORD` (or a
/// keyring entry under the profile name) is enough.
pub fn resolve_router_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(String, RouterConfig), CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.host.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(cfg),
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // Flag > env > profile
    if let Some(ref host) = global.host {
        profile.host.clone_from(host);
    }

    let password = resolve_password(&profile, &profile_name)?;
    let mut router = router_config(&profile, &cfg.defaults, password)?;
    if let Some(timeout) = global.timeout {
        router.timeout = Duration::from_secs(timeout);
    }
    Ok((profile_name, router))
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}
