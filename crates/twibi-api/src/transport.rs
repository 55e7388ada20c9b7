// Shared transport configuration for building reqwest::Client instances.
//
// The router speaks plain HTTP on the LAN and never sets cookies; session
// state lives on the router side, keyed by the client address.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("twibi/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl TransportConfig {
    /// Set the request timeout; the connect timeout never exceeds it.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = self.connect_timeout.min(timeout);
        self
    }

    /// Build a `reqwest::Client` from this config.
    ///
    /// Connection pooling is capped at one idle connection per host: the
    /// embedded HTTP server handles very few sockets at once.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(1)
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::Transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_builder_caps_connect_timeout() {
        let short = TransportConfig::default().with_timeout(Duration::from_secs(2));
        assert_eq!(short.timeout, Duration::from_secs(2));
        assert_eq!(short.connect_timeout, Duration::from_secs(2));

        let long = TransportConfig::default().with_timeout(Duration::from_secs(30));
        assert_eq!(long.timeout, Duration::from_secs(30));
        assert_eq!(long.connect_timeout, Duration::from_secs(5));
    }
}
