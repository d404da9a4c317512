//! Content coverage validation.
//!
//! Checks the loaded content for translations that would render badly:
//! - placeholders (`{name}`) that differ from the default-locale value
//!   (errors, since interpolation would leave raw braces or drop data)
//! - locales with missing values (warnings, the default locale fills in)

use crate::i18n::content::{LocaleMap, LocalizedEntry};
use crate::i18n::{Locale, TranslationStore};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Translations whose placeholders do not match the default locale
    pub errors: Vec<String>,

    /// Key paths with no value for some locale
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CoverageValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

impl CoverageValidator {
    /// Validate every key path in the store against every supported locale.
    pub fn validate(store: &TranslationStore) -> ValidationReport {
        let mut report = ValidationReport::new();
        let locales = Locale::all();

        for key in store.keys() {
            match store.entry(key) {
                Some(LocalizedEntry::Flat(values)) => {
                    Self::check_values(key, values, &locales, &mut report)
                }
                Some(LocalizedEntry::Structured(fields)) => {
                    for (field, values) in fields {
                        let path = format!("{}.{}", key, field);
                        Self::check_values(&path, values, &locales, &mut report);
                    }
                }
                None => {}
            }
        }

        report
    }

    /// Percentage (0-100) of key paths that have a value in `locale`.
    pub fn coverage(store: &TranslationStore, locale: Locale) -> f64 {
        let paths = store.key_paths();
        if paths.is_empty() {
            return 0.0;
        }
        let covered = paths
            .iter()
            .filter(|path| store.get(path, locale).is_some())
            .count();
        (covered as f64 / paths.len() as f64) * 100.0
    }

    fn check_values(
        path: &str,
        values: &LocaleMap,
        locales: &[Locale],
        report: &mut ValidationReport,
    ) {
        let default = Locale::default_locale();
        let expected = values
            .get(&default)
            .map(|v| Self::extract_placeholders(v))
            .unwrap_or_default();

        for locale in locales {
            match values.get(locale) {
                Some(value) if *locale != default => {
                    let found = Self::extract_placeholders(value);
                    if found != expected {
                        report.errors.push(format!(
                            "Placeholder mismatch in '{}' ({}): expected {:?}, found {:?}",
                            path, locale, expected, found
                        ));
                    }
                }
                Some(_) => {}
                None => report
                    .warnings
                    .push(format!("Missing '{}' translation for '{}'", locale, path)),
            }
        }
    }

    /// Extract the distinct `{name}` placeholders in a value.
    fn extract_placeholders(text: &str) -> BTreeSet<String> {
        let regex = PLACEHOLDER_REGEX
            .get_or_init(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

        regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }
}
