// ── Core error types ──
//
// Domain-level errors from twibi-core. Transport failures keep the original
// `twibi_api::Error` as their source so the coordinator can still classify
// them; everything else is a domain condition.

use thiserror::Error;
use twibi_api::ErrorKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Failure reported by the connection layer.
    #[error(transparent)]
    Api(#[from] twibi_api::Error),

    /// A fetched payload did not have the expected shape.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// The pre-fetch health probe failed. Always retried as a connection
    /// failure, whatever the underlying cause.
    #[error("Health check failed: {reason}")]
    HealthCheckFailed {
        reason: String,
        #[source]
        source: Option<Box<CoreError>>,
    },

    /// A poll cycle exhausted its attempt budget.
    #[error("Update failed after {attempts} attempts: {source}")]
    UpdateFailed {
        attempts: u32,
        #[source]
        source: Box<CoreError>,
    },

    #[error("{entity} not found: {identifier}")]
    NotFound {
        entity: &'static str,
        identifier: String,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// How the coordinator's retry loop treats a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Credentials rejected or session expired.
    Authentication,
    /// Transport failure or unusable payload from a reachable router.
    Connection,
    /// Anything else (validation, internal).
    Other,
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn health_check(reason: impl Into<String>, source: Option<CoreError>) -> Self {
        Self::HealthCheckFailed {
            reason: reason.into(),
            source: source.map(Box::new),
        }
    }

    pub fn class(&self) -> FailureClass {
        match self {
            Self::Api(e) => match e.kind() {
                ErrorKind::Authentication => FailureClass::Authentication,
                ErrorKind::Connection | ErrorKind::Api => FailureClass::Connection,
            },
            Self::HealthCheckFailed { .. } => FailureClass::Connection,
            Self::UpdateFailed { source, .. } => source.class(),
            Self::Validation { .. } | Self::NotFound { .. } | Self::Config { .. } => {
                FailureClass::Other
            }
        }
    }

    /// The connection-layer error at the root of this failure, if any.
    pub fn api_error(&self) -> Option<&twibi_api::Error> {
        match self {
            Self::Api(e) => Some(e),
            Self::UpdateFailed { source, .. } => source.api_error(),
            _ => None,
        }
    }
}
