//! Localized content entries and the embedded data format.
//!
//! The data file is a JSON object keyed by key path. A value whose members
//! are strings is a flat entry; a value whose members are objects is a
//! structured entry, one locale map per field:
//!
//! ```json
//! {
//!   "nav.docs": { "en": "Docs", "fr": "Documentation" },
//!   "commands.init": {
//!     "description": { "en": "Create a new project", "de": "Neues Projekt anlegen" },
//!     "example": { "en": "tool init my-app" }
//!   }
//! }
//! ```

use crate::i18n::Locale;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::warn;

/// Values of one piece of content, keyed by locale.
pub type LocaleMap = HashMap<Locale, String>;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Content data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Entry '{key}' has no value for the default locale")]
    MissingDefault { key: String },

    #[error("Entry '{key}' field '{field}' has no value for the default locale")]
    MissingDefaultField { key: String, field: String },
}

/// A unit of localized content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalizedEntry {
    /// One string per locale.
    Flat(LocaleMap),
    /// Named fields, each independently localized.
    Structured(BTreeMap<String, LocaleMap>),
}

impl LocalizedEntry {
    /// Every locale that has at least one value in this entry.
    pub fn locales(&self) -> Vec<Locale> {
        let mut locales: Vec<Locale> = match self {
            LocalizedEntry::Flat(values) => values.keys().copied().collect(),
            LocalizedEntry::Structured(fields) => {
                fields.values().flat_map(|m| m.keys().copied()).collect()
            }
        };
        locales.sort();
        locales.dedup();
        locales
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Flat(HashMap<String, String>),
    Structured(BTreeMap<String, HashMap<String, String>>),
}

/// Parse the content data file into validated entries.
///
/// Locale codes outside the supported set and blank values are skipped with
/// a warning; an entry (or field) without a default-locale value is rejected.
pub fn parse_entries(json: &str) -> Result<HashMap<String, LocalizedEntry>, ContentError> {
    let raw: HashMap<String, RawEntry> = serde_json::from_str(json)?;
    let default = Locale::default_locale();

    let mut entries = HashMap::with_capacity(raw.len());
    for (key, entry) in raw {
        let entry = match entry {
            RawEntry::Flat(values) => {
                let values = to_locale_map(&key, values);
                if !values.contains_key(&default) {
                    return Err(ContentError::MissingDefault { key });
                }
                LocalizedEntry::Flat(values)
            }
            RawEntry::Structured(fields) => {
                let mut parsed = BTreeMap::new();
                for (field, values) in fields {
                    let values = to_locale_map(&key, values);
                    if !values.contains_key(&default) {
                        return Err(ContentError::MissingDefaultField { key, field });
                    }
                    parsed.insert(field, values);
                }
                LocalizedEntry::Structured(parsed)
            }
        };
        entries.insert(key, entry);
    }

    Ok(entries)
}

fn to_locale_map(key: &str, values: HashMap<String, String>) -> LocaleMap {
    values
        .into_iter()
        .filter_map(|(code, value)| match Locale::from_code(&code) {
            Ok(_) if value.trim().is_empty() => {
                warn!("Skipping empty '{}' value in entry '{}'", code, key);
                None
            }
            Ok(locale) => Some((locale, value)),
            Err(_) => {
                warn!("Skipping unsupported locale '{}' in entry '{}'", code, key);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_entry() {
        let entries = parse_entries(r#"{"nav.docs": {"en": "Docs", "fr": "Documentation"}}"#)
            .expect("Should parse");
        match &entries["nav.docs"] {
            LocalizedEntry::Flat(values) => {
                assert_eq!(values[&Locale::EN], "Docs");
                assert_eq!(values[&Locale::FR], "Documentation");
            }
            other => panic!("Expected flat entry, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_structured_entry() {
        let json = r#"{
            "commands.init": {
                "description": {"en": "Create a project", "de": "Projekt anlegen"},
                "example": {"en": "tool init app"}
            }
        }"#;
        let entries = parse_entries(json).expect("Should parse");
        match &entries["commands.init"] {
            LocalizedEntry::Structured(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields["description"][&Locale::DE], "Projekt anlegen");
                assert!(!fields["example"].contains_key(&Locale::DE));
            }
            other => panic!("Expected structured entry, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_default_rejected() {
        let result = parse_entries(r#"{"hero.title": {"fr": "Bonjour"}}"#);
        assert!(matches!(result, Err(ContentError::MissingDefault { key }) if key == "hero.title"));
    }

    #[test]
    fn test_missing_default_field_rejected() {
        let json = r#"{"commands.run": {"description": {"ja": "実行"}}}"#;
        let result = parse_entries(json);
        assert!(matches!(
            result,
            Err(ContentError::MissingDefaultField { field, .. }) if field == "description"
        ));
    }

    #[test]
    fn test_unsupported_locale_skipped() {
        let entries = parse_entries(r#"{"a": {"en": "A", "pt": "Á"}}"#).expect("Should parse");
        assert_eq!(entries["a"].locales(), vec![Locale::EN]);
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let entries = parse_entries(r#"{"a": {"en": "Docs", "fr": "", "de": "  "}}"#)
            .expect("Should parse");
        assert_eq!(entries["a"].locales(), vec![Locale::EN]);

        let result = parse_entries(r#"{"b": {"en": "", "fr": "Docs"}}"#);
        assert!(matches!(result, Err(ContentError::MissingDefault { key }) if key == "b"));

        let result = parse_entries(r#"{"c": {"example": {"en": " ", "ja": "例"}}}"#);
        assert!(matches!(
            result,
            Err(ContentError::MissingDefaultField { field, .. }) if field == "example"
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_entries("not json"), Err(ContentError::Parse(_))));
        assert!(matches!(parse_entries(r#"{"a": 1}"#), Err(ContentError::Parse(_))));
    }

    #[test]
    fn test_structured_locales_union() {
        let json = r#"{"c": {"x": {"en": "1", "ko": "1"}, "y": {"en": "2", "ru": "2"}}}"#;
        let entries = parse_entries(json).unwrap();
        let locales = entries["c"].locales();
        assert!(locales.contains(&Locale::KO));
        assert!(locales.contains(&Locale::RU));
        assert_eq!(locales.len(), 3);
    }
}
