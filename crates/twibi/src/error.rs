//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` / `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use twibi_config::ConfigError;
use twibi_core::{CoreError, FailureClass};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach router at {host}")]
    #[diagnostic(
        code(twibi::connection_failed),
        help(
            "Check that the router is powered on and reachable from this machine.\n\
             Host: {host}\n\
             Cause: {reason}"
        )
    )]
    ConnectionFailed { host: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed for profile '{profile}'")]
    #[diagnostic(
        code(twibi::auth_failed),
        help(
            "Verify the router admin password.\n\
             Run: twibi config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(twibi::no_credentials),
        help(
            "Configure credentials with: twibi config init\n\
             Or set the TWIBI_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(twibi::not_found),
        help("Run: twibi {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Router ───────────────────────────────────────────────────────
    #[error("Router error: {message}")]
    #[diagnostic(code(twibi::router_error))]
    Router { message: String },

    #[error("Router did not apply '{action}': {reason}")]
    #[diagnostic(
        code(twibi::command_rejected),
        help("The router may be busy or rebooting. Retry in a moment.")
    )]
    CommandRejected { action: String, reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(twibi::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(twibi::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: twibi config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No router configured")]
    #[diagnostic(
        code(twibi::no_config),
        help(
            "Create a profile with: twibi config init\n\
             Or pass --host (and set TWIBI_PASSWORD).\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(twibi::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(twibi::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Router { .. }
            | Self::CommandRejected { .. }
            | Self::NoConfig { .. }
            | Self::Config(_)
            | Self::Io(_) => exit_code::GENERAL,
        }
    }

    /// Translate a core failure, naming the profile and host involved.
    pub fn from_core(err: CoreError, profile: &str, host: &str) -> Self {
        match err {
            CoreError::NotFound { entity, identifier } => Self::NotFound {
                resource_type: entity.into(),
                list_command: format!("{entity}s list"),
                identifier,
            },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            other => match other.class() {
                FailureClass::Authentication => Self::AuthFailed {
                    profile: profile.into(),
                },
                FailureClass::Connection
                    if other.api_error().is_some_and(|e| !e.is_transient()) =>
                {
                    Self::Router {
                        message: other.to_string(),
                    }
                }
                FailureClass::Connection => Self::ConnectionFailed {
                    host: host.into(),
                    reason: other.to_string(),
                },
                FailureClass::Other => Self::Router {
                    message: other.to_string(),
                },
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config(other),
        }
    }
}
