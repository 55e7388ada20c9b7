// ── Known device tracking ──
//
// Remembers every client MAC ever observed so a host can keep presence
// entities for devices that are currently offline. Persistence is pluggable
// through `DeviceIdStore`.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::{MacAddress, OnlineDevice};

/// Key-value persistence for previously seen device identifiers.
pub trait DeviceIdStore: Send + Sync {
    fn load(&self) -> Result<Vec<MacAddress>, CoreError>;
    fn save(&self, macs: &[MacAddress]) -> Result<(), CoreError>;
}

/// Process-local store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryDeviceStore {
    macs: Mutex<Vec<MacAddress>>,
}

impl DeviceIdStore for MemoryDeviceStore {
    fn load(&self) -> Result<Vec<MacAddress>, CoreError> {
        Ok(self
            .macs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, macs: &[MacAddress]) -> Result<(), CoreError> {
        *self.macs.lock().unwrap_or_else(PoisonError::into_inner) = macs.to_vec();
        Ok(())
    }
}

/// Set of every normalized MAC seen so far.
pub struct KnownDevices {
    store: Arc<dyn DeviceIdStore>,
    known: BTreeSet<MacAddress>,
}

impl KnownDevices {
    /// Load previously persisted identifiers. Entries are re-normalized so
    /// stores written by older versions still key correctly.
    pub fn load(store: Arc<dyn DeviceIdStore>) -> Result<Self, CoreError> {
        let known: BTreeSet<MacAddress> = store
            .load()?
            .into_iter()
            .map(|mac| MacAddress::new(mac.as_str()))
            .collect();
        debug!(count = known.len(), "loaded known devices");
        Ok(Self { store, known })
    }

    pub fn contains(&self, mac: &MacAddress) -> bool {
        self.known.contains(mac)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MacAddress> {
        self.known.iter()
    }

    /// Record the devices from a fetch. Returns the MACs not seen before and
    /// persists the full set when there are any.
    pub fn observe(&mut self, devices: &[OnlineDevice]) -> Result<Vec<MacAddress>, CoreError> {
        let fresh: Vec<MacAddress> = devices
            .iter()
            .filter(|d| self.known.insert(d.mac.clone()))
            .map(|d| d.mac.clone())
            .collect();

        if !fresh.is_empty() {
            for mac in &fresh {
                info!(%mac, "new device discovered");
            }
            let all: Vec<MacAddress> = self.known.iter().cloned().collect();
            self.store.save(&all)?;
        }
        Ok(fresh)
    }
}
