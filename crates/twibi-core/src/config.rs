// ── Runtime router configuration ──
//
// Describes *how* to talk to one router and how patiently to poll it.
// Carries credentials but never touches disk: `twibi-config` (or any other
// host) constructs a `RouterConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;

/// Connection settings for a single router endpoint.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// IP address or hostname (optionally `scheme://host:port`).
    pub host: String,
    pub password: SecretString,
    /// Drop Ethernet-attached clients from device lists.
    pub exclude_wired: bool,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Period of the reference refresh driver.
    pub update_interval: Duration,
    pub retry: RetryPolicy,
    /// Pause between individual extended-module fetches.
    pub extended_module_delay: Duration,
}

impl RouterConfig {
    pub fn new(host: impl Into<String>, password: SecretString) -> Self {
        Self {
            host: host.into(),
            password,
            exclude_wired: true,
            timeout: Duration::from_secs(10),
            update_interval: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            extended_module_delay: Duration::from_millis(100),
        }
    }
}

/// Retry, backoff and staleness tuning for the polling coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempt budget per cycle in normal mode.
    pub max_retries: u32,
    /// Attempt budget per cycle while recovering from a router restart.
    pub restart_recovery_attempts: u32,
    pub base_delay: Duration,
    pub recovery_base_delay: Duration,
    pub max_delay: Duration,
    /// Minimum uptime regression that counts as a reboot.
    pub restart_uptime_threshold: Duration,
    /// Consecutive successful cycles needed to leave recovery mode.
    pub recovery_exit_successes: u32,
    /// A failure this soon after a success is treated as a likely reboot.
    pub suspicious_failure_window: Duration,
    /// Maximum age of cached data served when a cycle fails.
    pub fallback_staleness: Duration,
    /// Window for [`has_recent_data`](crate::Coordinator::has_recent_data).
    pub recent_data_window: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            restart_recovery_attempts: 10,
            base_delay: Duration::from_secs(5),
            recovery_base_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(30),
            restart_uptime_threshold: Duration::from_secs(60),
            recovery_exit_successes: 3,
            suspicious_failure_window: Duration::from_secs(600),
            fallback_staleness: Duration::from_secs(300),
            recent_data_window: Duration::from_secs(600),
        }
    }
}

impl RetryPolicy {
    /// Attempt budget for one cycle.
    pub fn budget(&self, recovering: bool) -> u32 {
        let budget = if recovering {
            self.restart_recovery_attempts
        } else {
            self.max_retries
        };
        budget.max(1)
    }

    /// Backoff before retry number `attempt + 1`: `base * 2^attempt`, capped.
    pub fn delay(&self, attempt: u32, recovering: bool) -> Duration {
        let base = if recovering {
            self.recovery_base_delay
        } else {
            self.base_delay
        };
        let factor = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);
        base.saturating_mul(factor).min(self.max_delay)
    }
}
