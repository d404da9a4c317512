//! Client-side persistence of the locale preference.
//!
//! Two channels hold the same value: a structured key-value store (the
//! script-facing one) and the `locale` cookie (the one that travels with
//! server-rendered requests). Reads prefer the structured store; writes go to
//! both. Persistence is best-effort: a failed write is logged and otherwise
//! ignored.

use crate::cookie::{PreferenceCookie, COOKIE_NAME};
use crate::i18n::Locale;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, warn};

/// Structured store key holding the locale code.
pub const STORAGE_KEY: &str = "preferred-locale";

/// Structured store key holding how the stored locale was obtained.
pub const PROVENANCE_KEY: &str = "preferred-locale-provenance";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage contents could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// A string key-value store (the browser's local storage, or a stand-in).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Access to the client's cookies.
pub trait CookieJar: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, cookie: &PreferenceCookie) -> Result<(), StorageError>;
}

/// How a preference came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    UserSet,
    CookieRestored,
    BrowserDetected,
    GeoDetected,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::UserSet => "user-set",
            Provenance::CookieRestored => "cookie-restored",
            Provenance::BrowserDetected => "browser-detected",
            Provenance::GeoDetected => "geo-detected",
        }
    }

    pub fn parse(value: &str) -> Option<Provenance> {
        match value {
            "user-set" => Some(Provenance::UserSet),
            "cookie-restored" => Some(Provenance::CookieRestored),
            "browser-detected" => Some(Provenance::BrowserDetected),
            "geo-detected" => Some(Provenance::GeoDetected),
            _ => None,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreferenceRecord {
    pub locale: Locale,
    pub provenance: Provenance,
}

/// Reads and writes the preference across both channels.
///
/// Writes are serialized through an internal lock so that a conditional
/// write ([`compare_and_write`](Self::compare_and_write)) cannot interleave
/// with an explicit one.
pub struct PersistenceAdapter {
    store: Arc<dyn KeyValueStore>,
    cookies: Arc<dyn CookieJar>,
    write_lock: Mutex<()>,
}

impl PersistenceAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>, cookies: Arc<dyn CookieJar>) -> Self {
        Self {
            store,
            cookies,
            write_lock: Mutex::new(()),
        }
    }

    /// Adapter over fresh in-memory channels.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryCookieJar::new()))
    }

    /// The stored preference, structured store first, then cookie.
    pub fn read_preference(&self) -> Option<Locale> {
        self.read_stored()
            .map(|record| record.locale)
            .or_else(|| self.read_cookie())
    }

    /// The structured store's record, if it holds a supported locale.
    ///
    /// A record written without provenance is treated as user-set.
    pub fn read_stored(&self) -> Option<PreferenceRecord> {
        let raw = self.store.get(STORAGE_KEY)?;
        let Some(locale) = Locale::from_stored(&raw) else {
            debug!("Ignoring unsupported stored locale '{}'", raw);
            return None;
        };
        let provenance = self
            .store
            .get(PROVENANCE_KEY)
            .and_then(|p| Provenance::parse(&p))
            .unwrap_or(Provenance::UserSet);
        Some(PreferenceRecord { locale, provenance })
    }

    /// The cookie's locale, if supported.
    pub fn read_cookie(&self) -> Option<Locale> {
        let raw = self.cookies.get(COOKIE_NAME)?;
        let locale = Locale::from_stored(&raw);
        if locale.is_none() {
            debug!("Ignoring unsupported cookie locale '{}'", raw);
        }
        locale
    }

    /// Write the preference to both channels.
    pub fn write_preference(&self, locale: Locale, provenance: Provenance) {
        let _guard = self.lock();
        self.write_unlocked(locale, provenance);
    }

    /// Write only the structured store, leaving the cookie untouched.
    pub fn write_stored(&self, locale: Locale, provenance: Provenance) {
        let _guard = self.lock();
        self.write_store_channel(locale, provenance);
    }

    /// Write both channels only if the current preference still equals
    /// `expected`. Returns whether the write happened.
    pub fn compare_and_write(
        &self,
        expected: Option<Locale>,
        locale: Locale,
        provenance: Provenance,
    ) -> bool {
        let _guard = self.lock();
        let current = self.read_preference();
        if current != expected {
            debug!(
                "Preference changed ({:?} -> {:?}), skipping {} write",
                expected, current, provenance
            );
            return false;
        }
        self.write_unlocked(locale, provenance);
        true
    }

    fn write_unlocked(&self, locale: Locale, provenance: Provenance) {
        self.write_store_channel(locale, provenance);
        if let Err(e) = self.cookies.set(&PreferenceCookie::new(locale)) {
            warn!("Failed to write locale cookie: {}", e);
        }
    }

    fn write_store_channel(&self, locale: Locale, provenance: Provenance) {
        let result = self
            .store
            .set(STORAGE_KEY, locale.code())
            .and_then(|_| self.store.set(PROVENANCE_KEY, provenance.as_str()));
        if let Err(e) = result {
            warn!("Failed to write stored locale preference: {}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.insert(key, value);
        store
    }

    fn insert(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.insert(key, value);
        Ok(())
    }
}

/// In-memory [`CookieJar`] that also remembers the last `Set-Cookie` value.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    values: Mutex<HashMap<String, String>>,
    last_set_cookie: Mutex<Option<String>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jar holding a single cookie, as sent by a returning client.
    pub fn with_cookie(name: &str, value: &str) -> Self {
        let jar = Self::new();
        jar.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), value.to_string());
        jar
    }

    pub fn last_set_cookie(&self) -> Option<String> {
        self.last_set_cookie
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl CookieJar for MemoryCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    fn set(&self, cookie: &PreferenceCookie) -> Result<(), StorageError> {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(COOKIE_NAME.to_string(), cookie.locale.code().to_string());
        *self
            .last_set_cookie
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(cookie.to_header_value());
        Ok(())
    }
}

/// [`KeyValueStore`] persisted as a JSON object in a file.
///
/// An unreadable or corrupt file reads as empty; the next write replaces it.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> HashMap<String, String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!("Cannot read {}: {}", self.path.display(), e);
                }
                return HashMap::new();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring corrupt preference file {}: {}", self.path.display(), e);
            HashMap::new()
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.read_all();
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&values)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// [`CookieJar`] kept in a JSON file, for clients outside a browser.
#[derive(Debug, Clone)]
pub struct FileCookieJar {
    file: FileStore,
}

impl FileCookieJar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: FileStore::new(path),
        }
    }
}

impl CookieJar for FileCookieJar {
    fn get(&self, name: &str) -> Option<String> {
        KeyValueStore::get(&self.file, name)
    }

    fn set(&self, cookie: &PreferenceCookie) -> Result<(), StorageError> {
        KeyValueStore::set(&self.file, COOKIE_NAME, cookie.locale.code())
    }
}
