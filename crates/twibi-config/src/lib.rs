//! Shared configuration for twibi consumers.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! translation to `twibi_core::RouterConfig`, and a JSON file store for
//! previously seen device MACs.

mod store;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use twibi_core::{RetryPolicy, RouterConfig};

pub use store::FileDeviceStore;

const KEYRING_SERVICE: &str = "twibi";
const PASSWORD_ENV: &str = "TWIBI_PASSWORD";
/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "TWIBI_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named router profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Polling period in seconds.
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,

    #[serde(default = "default_true")]
    pub exclude_wired: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            update_interval: default_update_interval(),
            exclude_wired: true,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_update_interval() -> u64 {
    30
}
fn default_true() -> bool {
    true
}

/// A named router profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Router address (e.g., "192.168.5.1").
    pub host: String,

    /// Admin password (plaintext; prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable name containing the password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_wired: Option<bool>,

    /// Override timeout (seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Override polling period (seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_interval: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Base retry delay (seconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_retry_delay: Option<u64>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "twibi", "twibi")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("twibi");
    p
}

/// Resolve the config file path: `TWIBI_CONFIG`, then platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Where a profile's known-device list is persisted.
pub fn known_devices_path(profile_name: &str) -> PathBuf {
    let base = project_dirs().map_or_else(dirs_fallback, |dirs| dirs.data_dir().to_path_buf());
    base.join("known_devices").join(format!("{profile_name}.json"))
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + `TWIBI_`-prefixed environment variables.
///
/// Nested keys use a double underscore: `TWIBI_PROFILES__HOME__HOST`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TWIBI_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

fn keyring_lookup(user: &str) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, user)
        .ok()
        .and_then(|entry| entry.get_password().ok())
}

/// Resolve the router password from the credential chain.
///
/// Order: `password_env` variable, `TWIBI_PASSWORD`, system keyring
/// (`twibi` / `<profile>/password`), plaintext in the profile.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    resolve_password_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        keyring_lookup,
    )
}

/// [`resolve_password`] with injectable environment and keyring lookups.
pub fn resolve_password_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(pw) = profile.password_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(pw));
    }

    // 2. Global env var
    if let Some(pw) = env(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 3. System keyring
    if let Some(pw) = keyring(&keyring_user(profile_name)) {
        return Ok(SecretString::from(pw));
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Keyring(e.to_string()))
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `RouterConfig` from a profile and already-resolved password.
pub fn router_config(
    profile: &Profile,
    defaults: &Defaults,
    password: SecretString,
) -> Result<RouterConfig, ConfigError> {
    let host = profile.host.trim();
    if host.is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }

    let update_interval = profile.update_interval.unwrap_or(defaults.update_interval);
    if update_interval == 0 {
        return Err(ConfigError::Validation {
            field: "update_interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let mut retry = RetryPolicy::default();
    if let Some(max_retries) = profile.max_retries {
        if max_retries == 0 {
            return Err(ConfigError::Validation {
                field: "max_retries".into(),
                reason: "must be at least 1".into(),
            });
        }
        retry.max_retries = max_retries;
    }
    if let Some(base) = profile.base_retry_delay {
        retry.base_delay = Duration::from_secs(base);
    }

    let mut config = RouterConfig::new(host, password);
    config.exclude_wired = profile.exclude_wired.unwrap_or(defaults.exclude_wired);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.update_interval = Duration::from_secs(update_interval);
    config.retry = retry;
    Ok(config)
}

/// Resolve credentials and build a `RouterConfig` for a profile.
pub fn profile_to_router_config(
    config: &Config,
    profile_name: &str,
) -> Result<RouterConfig, ConfigError> {
    let profile = config.profile(profile_name)?;
    let password = resolve_password(profile, profile_name)?;
    router_config(profile, &config.defaults, password)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn profile() -> Profile {
        Profile {
            host: "192.168.5.1".into(),
            password: Some("plain".into()),
            password_env: Some("HOME_ROUTER_PW".into()),
            ..Profile::default()
        }
    }

    fn none(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn password_env_wins() {
        let pw = resolve_password_with(
            &profile(),
            "home",
            |name| (name == "HOME_ROUTER_PW").then(|| "from-env".to_owned()),
            |_| Some("from-keyring".to_owned()),
        )
        .unwrap();
        assert_eq!(pw.expose_secret(), "from-env");
    }

    #[test]
    fn global_env_then_keyring_then_plaintext() {
        let pw = resolve_password_with(
            &profile(),
            "home",
            |name| (name == PASSWORD_ENV).then(|| "global".to_owned()),
            |_| Some("from-keyring".to_owned()),
        )
        .unwrap();
        assert_eq!(pw.expose_secret(), "global");

        let pw = resolve_password_with(&profile(), "home", none, |user| {
            (user == "home/password").then(|| "from-keyring".to_owned())
        })
        .unwrap();
        assert_eq!(pw.expose_secret(), "from-keyring");

        let pw = resolve_password_with(&profile(), "home", none, none).unwrap();
        assert_eq!(pw.expose_secret(), "plain");
    }

    #[test]
    fn missing_password_is_an_error() {
        let bare = Profile {
            host: "192.168.5.1".into(),
            ..Profile::default()
        };
        let err = resolve_password_with(&bare, "home", none, none).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn profile_overrides_defaults() {
        let mut p = profile();
        p.exclude_wired = Some(false);
        p.timeout = Some(3);
        p.max_retries = Some(5);
        p.base_retry_delay = Some(2);

        let cfg =
            router_config(&p, &Defaults::default(), SecretString::from("x".to_owned())).unwrap();
        assert_eq!(cfg.host, "192.168.5.1");
        assert!(!cfg.exclude_wired);
        assert_eq!(cfg.timeout, Duration::from_secs(3));
        assert_eq!(cfg.update_interval, Duration::from_secs(30));
        assert_eq!(cfg.retry.max_retries, 5);
        assert_eq!(cfg.retry.base_delay, Duration::from_secs(2));
        assert_eq!(cfg.retry.restart_recovery_attempts, 10);
    }

    #[test]
    fn invalid_profiles_are_rejected() {
        let secret = || SecretString::from("x".to_owned());
        let empty_host = Profile::default();
        assert!(router_config(&empty_host, &Defaults::default(), secret()).is_err());

        let mut zero_retries = profile();
        zero_retries.max_retries = Some(0);
        assert!(matches!(
            router_config(&zero_retries, &Defaults::default(), secret()),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn config_round_trips_through_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("home".into(), profile());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let home = loaded.profile("home").unwrap();
        assert_eq!(home.host, "192.168.5.1");
        assert_eq!(home.password_env.as_deref(), Some("HOME_ROUTER_PW"));
        assert_eq!(loaded.defaults.update_interval, 30);
        assert!(loaded.profile("office").is_err());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.default_profile_name(), "default");
        assert!(loaded.profiles.is_empty());
        assert!(loaded.defaults.exclude_wired);
    }
}
