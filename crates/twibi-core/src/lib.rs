//! Domain layer between `twibi-api` and its consumers (CLI or an automation host).
//!
//! - **[`Coordinator`]**: the polling state machine. Each
//!   [`refresh()`](Coordinator::refresh) runs one cycle (health probe after
//!   failures, core modules, best-effort extended modules, validation,
//!   reboot detection) with bounded retries, and caches the last good
//!   [`Snapshot`]. [`run()`](Coordinator::run) is a reference periodic driver.
//!
//! - **[`DataFetcher`]**: module-scoped fetches decoded into typed records,
//!   with the wired-client exclusion filter.
//!
//! - **[`RouterController`]**: LED, reboot, Wi-Fi, guest network and UPnP
//!   commands. Failures fold into [`CommandOutcome`] rather than errors.
//!
//! - **Domain model** ([`model`]): `NodeInfo`, `OnlineDevice`,
//!   `WanStatistic` and the settings snapshots, keyed by node serial and
//!   normalized [`MacAddress`].

pub mod config;
pub mod controller;
pub mod convert;
pub mod coordinator;
pub mod error;
pub mod fetcher;
pub mod known_devices;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{RetryPolicy, RouterConfig};
pub use controller::{CommandOutcome, GuestNetworkRequest, RouterController};
pub use coordinator::{ConnectionStatus, Coordinator, RefreshOutcome, detect_restart};
pub use error::{CoreError, FailureClass};
pub use fetcher::{DataFetcher, FetchedModules};
pub use known_devices::{DeviceIdStore, KnownDevices, MemoryDeviceStore};

pub use model::{
    GuestInfo, LanInfo, MacAddress, NetworkLinkStatus, NodeInfo, NodeRole, OnlineDevice,
    Snapshot, UpnpInfo, VersionInfo, WanInfo, WanStatistic, WifiBand, WifiInfo,
};

// Wire-level types consumers commonly need alongside the domain layer.
pub use twibi_api::{Connection, Error as ApiError, ModuleId};
