// ── Polling coordinator ──
//
// Runs one refresh cycle at a time against a router: health probe after
// failures, core module fetch, best-effort extended modules, validation,
// reboot detection, and retry with backoff. The last good snapshot is kept
// and published through a watch channel so consumers can keep showing it
// while the router is flaky.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use twibi_api::{Connection, ModuleId, TransportConfig};

use crate::config::{RetryPolicy, RouterConfig};
use crate::controller::{CommandOutcome, RouterController};
use crate::error::{CoreError, FailureClass};
use crate::fetcher::DataFetcher;
use crate::known_devices::{DeviceIdStore, KnownDevices};
use crate::model::{MacAddress, NodeInfo, OnlineDevice, Snapshot, WanStatistic};

/// Pause between a successful command and the follow-up refresh.
const COMMAND_SETTLE_DELAY: Duration = Duration::from_secs(1);

// ── ConnectionStatus ─────────────────────────────────────────────

/// Router reachability as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ConnectionStatus {
    /// The last attempt succeeded.
    Connected,
    /// Exactly one consecutive failure.
    Reconnecting,
    /// Failing, but still within the retry budget.
    Unstable,
    /// Budget exhausted, or nothing has run yet.
    Disconnected,
}

/// Result of [`Coordinator::refresh_with_fallback`].
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The cycle succeeded.
    Fresh(Arc<Snapshot>),
    /// The cycle failed but the cached snapshot is recent enough to keep using.
    Cached {
        snapshot: Arc<Snapshot>,
        error: CoreError,
    },
}

impl RefreshOutcome {
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        match self {
            Self::Fresh(snapshot) | Self::Cached { snapshot, .. } => snapshot,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

// ── Restart detection ────────────────────────────────────────────

/// `true` when any node present in both snapshots reports an uptime that
/// went backwards by more than `threshold`.
pub fn detect_restart(previous: &Snapshot, current: &Snapshot, threshold: Duration) -> bool {
    let before = previous.uptimes();
    let threshold = threshold.as_secs();
    current.nodes.iter().any(|node| {
        before.get(node.serial.as_str()).is_some_and(|&old| {
            let new = node.uptime_secs;
            old > 0 && new < old && old - new > threshold
        })
    })
}

// ── Bookkeeping ──────────────────────────────────────────────────

#[derive(Default)]
struct CycleState {
    has_run: bool,
    last_ok: bool,
    consecutive_failures: u32,
    last_success: Option<Instant>,
    restart_recovery: bool,
    recovery_successes: u32,
    known_devices: Option<KnownDevices>,
}

impl CycleState {
    fn status(&self, policy: &RetryPolicy) -> ConnectionStatus {
        if !self.has_run {
            return ConnectionStatus::Disconnected;
        }
        if self.last_ok {
            return ConnectionStatus::Connected;
        }
        match self.consecutive_failures {
            0 | 1 => ConnectionStatus::Reconnecting,
            n if n < policy.max_retries => ConnectionStatus::Unstable,
            _ => ConnectionStatus::Disconnected,
        }
    }

    fn success_within(&self, window: Duration) -> bool {
        self.last_success.is_some_and(|at| at.elapsed() < window)
    }

    fn enter_recovery(&mut self) {
        self.restart_recovery = true;
        self.recovery_successes = 0;
    }
}

/// Decision taken after a failed attempt.
struct RetryDecision {
    exhausted: bool,
    delay: Duration,
    recovering: bool,
}

// ── Coordinator ──────────────────────────────────────────────────

/// Owns the polling state for one router endpoint.
///
/// Cheaply cloneable; clones share the same connection, cache and
/// bookkeeping.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: RouterConfig,
    fetcher: DataFetcher,
    controller: RouterController,
    /// Serializes cycles and command+refresh sequences.
    cycle: tokio::sync::Mutex<()>,
    state: Mutex<CycleState>,
    snapshot: watch::Sender<Option<Arc<Snapshot>>>,
    status: watch::Sender<ConnectionStatus>,
}

impl Coordinator {
    /// Build a coordinator with its own connection to `config.host`.
    pub fn new(config: RouterConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let connection = Connection::new(&config.host, config.password.clone(), &transport)?;
        Ok(Self::with_connection(config, Arc::new(connection)))
    }

    /// Build a coordinator around an existing connection.
    pub fn with_connection(config: RouterConfig, connection: Arc<Connection>) -> Self {
        let fetcher = DataFetcher::new(Arc::clone(&connection), config.exclude_wired);
        let controller = RouterController::new(connection);
        let (snapshot, _) = watch::channel(None);
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                fetcher,
                controller,
                cycle: tokio::sync::Mutex::new(()),
                state: Mutex::new(CycleState::default()),
                snapshot,
                status,
            }),
        }
    }

    /// Track every device MAC ever seen, persisting through `store`.
    pub fn attach_device_store(&self, store: Arc<dyn DeviceIdStore>) -> Result<(), CoreError> {
        let known = KnownDevices::load(store)?;
        self.state().known_devices = Some(known);
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, CycleState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn policy(&self) -> &RetryPolicy {
        &self.inner.config.retry
    }

    fn publish_status(&self, state: &CycleState) {
        self.inner.status.send_replace(state.status(self.policy()));
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    pub fn fetcher(&self) -> &DataFetcher {
        &self.inner.fetcher
    }

    pub fn controller(&self) -> &RouterController {
        &self.inner.controller
    }

    /// The last good snapshot, if any cycle has succeeded.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.snapshot.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.status.subscribe()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.state().status(self.policy())
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.state().consecutive_failures
    }

    pub fn is_restart_recovery(&self) -> bool {
        self.state().restart_recovery
    }

    /// A snapshot exists and the last success is within the recent-data window.
    pub fn has_recent_data(&self) -> bool {
        self.inner.snapshot.borrow().is_some()
            && self.state().success_within(self.policy().recent_data_window)
    }

    /// Every MAC seen since the device store was attached.
    pub fn known_devices(&self) -> Vec<MacAddress> {
        self.state()
            .known_devices
            .as_ref()
            .map(|k| k.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Enter restart-recovery mode by hand and clear the failure count.
    pub fn force_restart_recovery(&self) {
        info!("restart recovery mode forced");
        let mut state = self.state();
        state.enter_recovery();
        state.consecutive_failures = 0;
    }

    // ── Cached lookups ───────────────────────────────────────────

    pub fn node_by_serial(&self, serial: &str) -> Option<NodeInfo> {
        self.snapshot()?.node_by_serial(serial).cloned()
    }

    pub fn device_by_mac(&self, mac: &str) -> Option<OnlineDevice> {
        self.snapshot()?.device_by_mac(mac).cloned()
    }

    pub fn primary_node(&self) -> Option<NodeInfo> {
        self.snapshot()?.primary_node().cloned()
    }

    pub fn wan_statistics(&self) -> Option<WanStatistic> {
        self.snapshot()?.first_wan_statistic().cloned()
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Run one full cycle, retrying within the attempt budget.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let _cycle = self.inner.cycle.lock().await;
        self.refresh_locked().await
    }

    /// Like [`refresh`](Self::refresh), but a failed cycle still yields the
    /// cached snapshot when it is younger than the fallback staleness window.
    pub async fn refresh_with_fallback(&self) -> Result<RefreshOutcome, CoreError> {
        match self.refresh().await {
            Ok(snapshot) => Ok(RefreshOutcome::Fresh(snapshot)),
            Err(error) => {
                let fresh_enough = self
                    .state()
                    .success_within(self.policy().fallback_staleness);
                match self.snapshot() {
                    Some(snapshot) if fresh_enough => {
                        warn!(error = %error, "using cached data after update failure");
                        Ok(RefreshOutcome::Cached { snapshot, error })
                    }
                    _ => Err(error),
                }
            }
        }
    }

    async fn refresh_locked(&self) -> Result<Arc<Snapshot>, CoreError> {
        let budget = self.policy().budget(self.is_restart_recovery());
        let mut attempt: u32 = 0;

        loop {
            let probe = self.consecutive_failures() > 0;
            match self.fetch_cycle(probe).await {
                Ok(snapshot) => return Ok(self.commit(snapshot)),
                Err(err) => {
                    let decision = self.record_failure(&err, attempt, budget);
                    if decision.exhausted {
                        let attempts = attempt + 1;
                        if decision.recovering {
                            error!(
                                attempts,
                                error = %err,
                                "update failed in restart recovery; router may still be rebooting"
                            );
                        } else {
                            error!(attempts, error = %err, "update failed");
                        }
                        return Err(CoreError::UpdateFailed {
                            attempts,
                            source: Box::new(err),
                        });
                    }
                    warn!(
                        attempt = attempt + 1,
                        budget,
                        delay_ms = u64::try_from(decision.delay.as_millis()).unwrap_or(u64::MAX),
                        recovering = decision.recovering,
                        error = %err,
                        "update attempt failed; retrying"
                    );
                    tokio::time::sleep(decision.delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// One attempt: optional probe, core modules, then each extended module.
    async fn fetch_cycle(&self, probe: bool) -> Result<Snapshot, CoreError> {
        let fetcher = &self.inner.fetcher;

        if probe {
            debug!("running health check before fetch");
            if let Err(e) = fetcher.health_check().await {
                return Err(match e {
                    CoreError::HealthCheckFailed { .. } => e,
                    other => CoreError::health_check(other.to_string(), Some(other)),
                });
            }
        }

        let mut modules = fetcher.get_all_data(&ModuleId::CORE).await?;

        for module in ModuleId::EXTENDED {
            tokio::time::sleep(self.inner.config.extended_module_delay).await;
            match fetcher.get_all_data(&[module]).await {
                Ok(extended) => modules.merge(extended),
                Err(e) => debug!(%module, error = %e, "extended module unavailable"),
            }
        }

        modules.into_snapshot(Utc::now())
    }

    fn record_failure(&self, err: &CoreError, attempt: u32, budget: u32) -> RetryDecision {
        let policy = self.policy();
        let mut state = self.state();
        state.has_run = true;
        state.last_ok = false;
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        state.recovery_successes = 0;

        let decision = match err.class() {
            FailureClass::Authentication => {
                self.inner.fetcher.connection().invalidate_auth();
                RetryDecision {
                    exhausted: attempt + 1 >= policy.budget(false).min(budget),
                    delay: policy.delay(attempt, false),
                    recovering: state.restart_recovery,
                }
            }
            FailureClass::Connection => {
                if !state.restart_recovery
                    && state.success_within(policy.suspicious_failure_window)
                {
                    info!("failure shortly after a success; assuming router restart");
                    state.enter_recovery();
                }
                RetryDecision {
                    exhausted: attempt + 1 >= budget,
                    delay: policy.delay(attempt, state.restart_recovery),
                    recovering: state.restart_recovery,
                }
            }
            FailureClass::Other => RetryDecision {
                exhausted: attempt + 1 >= policy.budget(false).min(budget),
                delay: policy.delay(attempt, false),
                recovering: state.restart_recovery,
            },
        };

        self.publish_status(&state);
        decision
    }

    fn commit(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let policy = self.policy();
        let restarted = self.inner.snapshot.borrow().as_deref().is_some_and(|previous| {
            detect_restart(previous, &snapshot, policy.restart_uptime_threshold)
        });

        let snapshot = Arc::new(snapshot);
        {
            let mut state = self.state();
            if restarted {
                info!("router restart detected; entering recovery mode");
                state.enter_recovery();
            } else if state.restart_recovery {
                state.recovery_successes += 1;
                if state.recovery_successes >= policy.recovery_exit_successes {
                    info!("router restart recovery completed");
                    state.restart_recovery = false;
                    state.recovery_successes = 0;
                }
            }

            state.has_run = true;
            state.last_ok = true;
            state.consecutive_failures = 0;
            state.last_success = Some(Instant::now());

            if let Some(known) = state.known_devices.as_mut() {
                if let Err(e) = known.observe(&snapshot.devices) {
                    warn!(error = %e, "failed to persist known devices");
                }
            }

            self.publish_status(&state);
        }

        debug!(
            nodes = snapshot.nodes.len(),
            devices = snapshot.devices.len(),
            "snapshot updated"
        );
        self.inner.snapshot.send_replace(Some(Arc::clone(&snapshot)));
        snapshot
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Set a node's LED, then refresh so the snapshot reflects it.
    pub async fn set_led_status_and_refresh(&self, serial: &str, enabled: bool) -> CommandOutcome {
        let _cycle = self.inner.cycle.lock().await;
        let outcome = self.inner.controller.set_led_status(serial, enabled).await;
        if outcome.is_applied() {
            tokio::time::sleep(COMMAND_SETTLE_DELAY).await;
            if let Err(e) = self.refresh_locked().await {
                warn!(error = %e, "refresh after LED change failed");
            }
        }
        outcome
    }

    /// Reboot the router. No refresh follows; the router is going away.
    pub async fn restart_router(&self) -> CommandOutcome {
        self.inner.controller.restart_router().await
    }

    // ── Reference driver ─────────────────────────────────────────

    /// Refresh every `update_interval` until `cancel` fires.
    ///
    /// For hosts without their own scheduler. An in-flight cycle is
    /// abandoned on cancellation.
    pub async fn run(&self, cancel: CancellationToken) {
        let period = self
            .inner
            .config
            .update_interval
            .max(Duration::from_millis(10));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(host = %self.inner.fetcher.connection().host(), ?period, "refresh driver started");

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            tokio::select! {
                () = cancel.cancelled() => break,
                result = self.refresh_with_fallback() => match result {
                    Ok(RefreshOutcome::Fresh(_)) => {}
                    Ok(RefreshOutcome::Cached { .. }) => {
                        debug!("serving cached snapshot");
                    }
                    Err(e) => warn!(error = %e, "refresh cycle failed"),
                },
            }
        }
        debug!("refresh driver stopped");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use twibi_api::models::RawNodeInfo;

    fn snapshot(nodes: &[(&str, u64)]) -> Snapshot {
        Snapshot {
            nodes: nodes
                .iter()
                .map(|(sn, uptime)| {
                    NodeInfo::from(
                        serde_json::from_value::<RawNodeInfo>(
                            json!({ "sn": sn, "Uptime": uptime.to_string() }),
                        )
                        .unwrap(),
                    )
                })
                .collect(),
            devices: Vec::new(),
            wan_statistics: Vec::new(),
            wan_info: None,
            lan_info: None,
            wifi: None,
            guest: None,
            upnp: None,
            extra: serde_json::Map::new(),
            fetched_at: Utc::now(),
        }
    }

    const THRESHOLD: Duration = Duration::from_secs(60);

    #[test]
    fn uptime_regression_flags_restart() {
        let before = snapshot(&[("S", 5000)]);
        assert!(detect_restart(&before, &snapshot(&[("S", 30)]), THRESHOLD));
    }

    #[test]
    fn small_uptime_jitter_is_ignored() {
        let before = snapshot(&[("S", 5000)]);
        assert!(!detect_restart(&before, &snapshot(&[("S", 5005)]), THRESHOLD));
        assert!(!detect_restart(&before, &snapshot(&[("S", 4950)]), THRESHOLD));
    }

    #[test]
    fn unknown_or_zero_uptime_nodes_are_ignored() {
        let before = snapshot(&[("A", 0), ("B", 9000)]);
        let after = snapshot(&[("A", 0), ("C", 10)]);
        assert!(!detect_restart(&before, &after, THRESHOLD));
    }

    #[test]
    fn any_regressed_node_is_enough() {
        let before = snapshot(&[("A", 9000), ("B", 9000)]);
        let after = snapshot(&[("A", 9030), ("B", 12)]);
        assert!(detect_restart(&before, &after, THRESHOLD));
    }

    #[test]
    fn status_derivation() {
        let policy = RetryPolicy::default();
        let mut state = CycleState::default();
        assert_eq!(state.status(&policy), ConnectionStatus::Disconnected);

        state.has_run = true;
        state.last_ok = true;
        assert_eq!(state.status(&policy), ConnectionStatus::Connected);

        state.last_ok = false;
        state.consecutive_failures = 1;
        assert_eq!(state.status(&policy), ConnectionStatus::Reconnecting);
        state.consecutive_failures = 2;
        assert_eq!(state.status(&policy), ConnectionStatus::Unstable);
        state.consecutive_failures = 3;
        assert_eq!(state.status(&policy), ConnectionStatus::Disconnected);
        assert_eq!(ConnectionStatus::Unstable.to_string(), "unstable");
    }
}
