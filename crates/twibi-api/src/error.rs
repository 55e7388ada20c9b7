use thiserror::Error;

/// Top-level error type for the `twibi-api` crate.
///
/// Covers every failure mode of the router's `/goform` surface.
/// [`Error::kind`] folds the variants into the three classes the polling
/// layer reasons about; `twibi-core` maps them into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected by the router (`errcode == "1"`).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// An authenticated GET came back as the HTML login page.
    #[error("Session expired -- router returned its login page")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Payload ─────────────────────────────────────────────────────
    /// The router answered with an empty body.
    #[error("Empty response from router")]
    EmptyResponse,

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

/// Coarse classification used for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials rejected or session silently expired.
    Authentication,
    /// Transport-level failure; the session is no longer trusted.
    Connection,
    /// Reachable router, unusable payload.
    Api,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } | Self::SessionExpired => ErrorKind::Authentication,
            Self::Transport(_) => ErrorKind::Connection,
            Self::InvalidUrl(_) | Self::EmptyResponse | Self::Deserialization { .. } => {
                ErrorKind::Api
            }
        }
    }

    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::EmptyResponse | Self::SessionExpired => true,
            _ => false,
        }
    }

    pub(crate) fn deserialization(err: &serde_json::Error, body: &str) -> Self {
        let preview: String = body.chars().take(200).collect();
        Self::Deserialization {
            message: format!("{err} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_expiry_is_an_auth_error() {
        assert_eq!(Error::SessionExpired.kind(), ErrorKind::Authentication);
        assert!(Error::SessionExpired.is_auth_expired());
    }

    #[test]
    fn payload_errors_are_api_errors() {
        assert_eq!(Error::EmptyResponse.kind(), ErrorKind::Api);
        let err = Error::Deserialization {
            message: "expected value".into(),
            body: "{".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Api);
        assert!(!err.is_auth_expired());
    }
}
