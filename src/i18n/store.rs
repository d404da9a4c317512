//! Translation store: read-only, in-memory content addressed by key path.

use crate::i18n::content::{parse_entries, ContentError, LocalizedEntry};
use crate::i18n::Locale;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{error, info};

/// Content compiled into the binary.
const EMBEDDED_CONTENT: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/content.json"));

static STORE: OnceLock<TranslationStore> = OnceLock::new();

#[derive(Debug, Default)]
pub struct TranslationStore {
    entries: HashMap<String, LocalizedEntry>,
}

impl TranslationStore {
    /// Get the store built from the embedded content, loading it on first call.
    ///
    /// Later calls return the same instance. Embedded data that fails to
    /// parse leaves an empty store, so every lookup degrades to its key path.
    pub fn load() -> &'static TranslationStore {
        STORE.get_or_init(|| match TranslationStore::from_json(EMBEDDED_CONTENT) {
            Ok(store) => {
                info!("Loaded {} content entries", store.len());
                store
            }
            Err(e) => {
                error!("Embedded content is invalid, serving key paths: {}", e);
                TranslationStore::default()
            }
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(Self {
            entries: parse_entries(json)?,
        })
    }

    /// Look up the value of `key_path` in exactly `locale`.
    ///
    /// A key path names either a flat entry (`nav.docs`) or one field of a
    /// structured entry (`commands.init.description`). No fallback happens
    /// here; see [`crate::i18n::Translator`].
    pub fn get(&self, key_path: &str, locale: Locale) -> Option<&str> {
        match self.entries.get(key_path) {
            Some(LocalizedEntry::Flat(values)) => values.get(&locale).map(String::as_str),
            Some(LocalizedEntry::Structured(_)) => None,
            None => {
                let (entry_key, field) = key_path.rsplit_once('.')?;
                match self.entries.get(entry_key) {
                    Some(LocalizedEntry::Structured(fields)) => fields
                        .get(field)
                        .and_then(|values| values.get(&locale))
                        .map(String::as_str),
                    _ => None,
                }
            }
        }
    }

    /// The whole entry stored under `key`.
    pub fn entry(&self, key: &str) -> Option<&LocalizedEntry> {
        self.entries.get(key)
    }

    /// Entry keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Every addressable key path, expanding structured entries into
    /// `entry.field` paths.
    pub fn key_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for (key, entry) in &self.entries {
            match entry {
                LocalizedEntry::Flat(_) => paths.push(key.clone()),
                LocalizedEntry::Structured(fields) => {
                    paths.extend(fields.keys().map(|field| format!("{}.{}", key, field)))
                }
            }
        }
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_store() -> TranslationStore {
        TranslationStore::from_json(
            r#"{
                "nav.docs": {"en": "Docs", "fr": "Documentation"},
                "commands.init": {
                    "description": {"en": "Create a project", "de": "Projekt anlegen"},
                    "example": {"en": "tool init app"}
                }
            }"#,
        )
        .expect("Sample content should parse")
    }

    #[test]
    fn test_embedded_content_loads() {
        let store = TranslationStore::load();
        assert!(!store.is_empty());
        assert_eq!(store.get("nav.home", Locale::DE), Some("Startseite"));
    }

    #[test]
    fn test_load_is_idempotent() {
        assert!(std::ptr::eq(TranslationStore::load(), TranslationStore::load()));
    }

    #[test]
    fn test_get_flat() {
        let store = sample_store();
        assert_eq!(store.get("nav.docs", Locale::FR), Some("Documentation"));
        assert_eq!(store.get("nav.docs", Locale::EN), Some("Docs"));
        assert_eq!(store.get("nav.docs", Locale::JA), None);
    }

    #[test]
    fn test_get_structured_field() {
        let store = sample_store();
        assert_eq!(
            store.get("commands.init.description", Locale::DE),
            Some("Projekt anlegen")
        );
        assert_eq!(store.get("commands.init.example", Locale::DE), None);
        assert_eq!(store.get("commands.init.missing", Locale::EN), None);
    }

    #[test]
    fn test_structured_entry_itself_is_not_a_string() {
        let store = sample_store();
        assert_eq!(store.get("commands.init", Locale::EN), None);
        assert!(store.entry("commands.init").is_some());
    }

    #[test]
    fn test_get_absent_key() {
        let store = sample_store();
        assert_eq!(store.get("does.not.exist", Locale::EN), None);
        assert_eq!(store.get("", Locale::EN), None);
        // A flat entry has no fields.
        assert_eq!(store.get("nav.docs.extra", Locale::EN), None);
    }

    #[test]
    fn test_key_paths_expand_fields() {
        let store = sample_store();
        assert_eq!(
            store.key_paths(),
            vec![
                "commands.init.description".to_string(),
                "commands.init.example".to_string(),
                "nav.docs".to_string(),
            ]
        );
        assert_eq!(store.keys(), vec!["commands.init", "nav.docs"]);
    }
}
