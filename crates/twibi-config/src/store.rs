// ── Known-device persistence ──
//
// JSON file backing for `twibi_core::DeviceIdStore`. Writes go through a
// sibling temp file and a rename so a crash never leaves a truncated list.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use twibi_core::{CoreError, DeviceIdStore, MacAddress};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredDevices {
    #[serde(default)]
    known_devices: Vec<MacAddress>,
}

/// Known-device list persisted as `{"known_devices": [...]}`.
#[derive(Debug, Clone)]
pub struct FileDeviceStore {
    path: PathBuf,
}

impl FileDeviceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the per-profile data directory.
    pub fn for_profile(profile_name: &str) -> Self {
        Self::new(crate::known_devices_path(profile_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn store_error(path: &Path, err: impl std::fmt::Display) -> CoreError {
    CoreError::Config {
        message: format!("known devices store {}: {err}", path.display()),
    }
}

impl DeviceIdStore for FileDeviceStore {
    fn load(&self) -> Result<Vec<MacAddress>, CoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(store_error(&self.path, e)),
        };
        let stored: StoredDevices =
            serde_json::from_str(&raw).map_err(|e| store_error(&self.path, e))?;
        debug!(
            count = stored.known_devices.len(),
            path = %self.path.display(),
            "read known devices"
        );
        Ok(stored.known_devices)
    }

    fn save(&self, macs: &[MacAddress]) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| store_error(&self.path, e))?;
        }
        let stored = StoredDevices {
            known_devices: macs.to_vec(),
        };
        let body =
            serde_json::to_string_pretty(&stored).map_err(|e| store_error(&self.path, e))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(|e| store_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| store_error(&self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDeviceStore::new(dir.path().join("none.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn saved_macs_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDeviceStore::new(dir.path().join("a").join("home.json"));
        let macs = vec![
            MacAddress::new("AA-BB-CC-DD-EE-FF"),
            MacAddress::new("112233445566"),
        ];
        store.save(&macs).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, macs);
        assert_eq!(loaded[1].as_str(), "11:22:33:44:55:66");
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();
        let err = FileDeviceStore::new(path).load().unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
    }
}
