use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;

use playhub::{
    constants::{DEFAULT_SLIPPAGE_BPS, MAX_SLIPPAGE_BPS},
    error::{PlayError, PlayResult, ValidationError},
    types::PlanId,
    validate,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The one key client state is persisted under.
pub const PREFERENCES_KEY: &str = "playhub.preferences";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub selected_plan: PlanId,
    pub slippage_bps: u16,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            selected_plan: PlanId::default(),
            slippage_bps: DEFAULT_SLIPPAGE_BPS,
        }
    }
}

impl Preferences {
    pub fn validate(&self) -> PlayResult {
        validate!(
            self.slippage_bps <= MAX_SLIPPAGE_BPS,
            ValidationError::InvalidSlippage(self.slippage_bps)
        )
    }
}

/// Key/value persistence for client state.
pub trait PreferenceStorage {
    fn get(&self, key: &str) -> PlayResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> PlayResult;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStorage for MemoryStorage {
    fn get(&self, key: &str) -> PlayResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PlayResult {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key under `dir`.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn storage_error(error: std::io::Error) -> PlayError {
    PlayError::Storage(error.to_string())
}

impl PreferenceStorage for FileStorage {
    fn get(&self, key: &str) -> PlayResult<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> PlayResult {
        fs::create_dir_all(&self.dir).map_err(storage_error)?;
        fs::write(self.path(key), value).map_err(storage_error)
    }
}

/// Stored preferences, or the defaults when nothing usable is stored.
pub fn load_preferences(storage: &dyn PreferenceStorage) -> Preferences {
    let raw = match storage.get(PREFERENCES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Preferences::default(),
        Err(e) => {
            warn!("could not read {}: {}; using defaults", PREFERENCES_KEY, e);
            return Preferences::default();
        }
    };

    match serde_json::from_str::<Preferences>(&raw) {
        Ok(preferences) if preferences.validate().is_ok() => {
            debug!("loaded preferences {:?}", preferences);
            preferences
        }
        Ok(preferences) => {
            warn!("discarding out-of-range preferences {:?}", preferences);
            Preferences::default()
        }
        Err(e) => {
            warn!("corrupt {} record: {}; using defaults", PREFERENCES_KEY, e);
            Preferences::default()
        }
    }
}

pub fn save_preferences(storage: &dyn PreferenceStorage, preferences: &Preferences) -> PlayResult {
    let raw = serde_json::to_string(preferences).map_err(|e| PlayError::Storage(e.to_string()))?;
    storage.set(PREFERENCES_KEY, &raw)
}
