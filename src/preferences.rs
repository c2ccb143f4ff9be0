//! Persisted display currency preference
//!
//! A single key holds the selected currency code. Reads never fail:
//! missing, unreadable or unsupported values fall back to
//! [`DEFAULT_CURRENCY`].

use crate::{
    constants::{
        CURRENCY_PREFERENCE_KEY, DEFAULT_CURRENCY, ENV_PREFERENCES_PATH, PREFERENCES_DIR,
        PREFERENCES_FILE,
    },
    error::PreferenceError,
    types::Currency,
};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// String key/value storage for preferences
pub trait PreferenceBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Volatile backend, mainly for tests and embedding
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Backend storing all keys as one JSON object in a file
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Opens the backend at `$COIN_MARKET_PREFERENCES`, or under the
    /// platform config directory when unset
    pub fn default_location() -> Result<Self, PreferenceError> {
        if let Ok(path) = std::env::var(ENV_PREFERENCES_PATH) {
            return Ok(Self::new(path));
        }

        let path = dirs_next::config_dir()
            .ok_or(PreferenceError::NoConfigDir)?
            .join(PREFERENCES_DIR)
            .join(PREFERENCES_FILE);

        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PreferenceBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        // Unreadable contents are overwritten
        let mut values = self.read_all().unwrap_or_default();
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

/// The user's display currency, persisted in a [`PreferenceBackend`]
pub struct CurrencyPreference {
    backend: Box<dyn PreferenceBackend>,
}

impl CurrencyPreference {
    pub fn new(backend: impl PreferenceBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Preference stored in the default preference file
    pub fn from_default_location() -> Result<Self, PreferenceError> {
        Ok(Self::new(FileBackend::default_location()?))
    }

    /// Reads the stored currency, falling back to the default
    pub fn load(&self) -> Currency {
        match self.backend.get(CURRENCY_PREFERENCE_KEY) {
            Ok(Some(code)) => Currency::from_code(&code).unwrap_or_else(|| {
                tracing::warn!(
                    stored = %code,
                    fallback = %DEFAULT_CURRENCY,
                    "Unsupported stored currency, using default"
                );
                DEFAULT_CURRENCY
            }),
            Ok(None) => DEFAULT_CURRENCY,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = %DEFAULT_CURRENCY,
                    "Failed to read currency preference, using default"
                );
                DEFAULT_CURRENCY
            }
        }
    }

    /// Persists the selected currency
    pub fn set(&self, currency: Currency) -> Result<(), PreferenceError> {
        self.backend.set(CURRENCY_PREFERENCE_KEY, currency.code())?;
        tracing::debug!(currency = %currency, "Saved currency preference");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_when_absent() {
        let preference = CurrencyPreference::new(MemoryBackend::new());
        assert_eq!(preference.load(), Currency::Usd);
    }

    #[test]
    fn test_roundtrip_in_memory() {
        let backend = MemoryBackend::new();
        CurrencyPreference::new(backend.clone())
            .set(Currency::Eur)
            .unwrap();

        // A fresh handle over the same storage models an app reload.
        let reloaded = CurrencyPreference::new(backend);
        assert_eq!(reloaded.load(), Currency::Eur);
    }

    #[test]
    fn test_unsupported_value_falls_back() {
        let backend = MemoryBackend::new();
        backend.set(CURRENCY_PREFERENCE_KEY, "jpy").unwrap();

        assert_eq!(CurrencyPreference::new(backend).load(), Currency::Usd);
    }

    #[test]
    fn test_file_backend_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        CurrencyPreference::new(FileBackend::new(&path))
            .set(Currency::Brl)
            .unwrap();
        assert!(path.exists());

        let reloaded = CurrencyPreference::new(FileBackend::new(&path));
        assert_eq!(reloaded.load(), Currency::Brl);
    }

    #[test]
    fn test_file_backend_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("preferences.json"));
        backend.set("theme", "dark").unwrap();

        CurrencyPreference::new(backend.clone())
            .set(Currency::Eur)
            .unwrap();

        assert_eq!(backend.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_corrupt_file_falls_back_then_recovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{not json").unwrap();

        let preference = CurrencyPreference::new(FileBackend::new(&path));
        assert_eq!(preference.load(), Currency::Usd);

        preference.set(Currency::Eur).unwrap();
        assert_eq!(preference.load(), Currency::Eur);
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let backend = FileBackend::new(dir.path().join("absent.json"));
        assert_eq!(backend.get(CURRENCY_PREFERENCE_KEY).unwrap(), None);
    }
}
