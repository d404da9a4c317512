//! Translation lookup: key path to renderable text, with fallback.
//!
//! Resolution order for every key path (and for every field of a structured
//! entry independently): the active locale, then the default locale, then the
//! key path itself. The result is never empty for content that has a default
//! value, and never an error.

use crate::i18n::content::LocalizedEntry;
use crate::i18n::{Locale, LookupMetrics, TranslationStore};
use std::collections::BTreeMap;
use tracing::debug;

/// The locale used for text resolution, passed explicitly to every lookup.
///
/// Produced by the resolver and replaced only through the locale switcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleContext {
    pub locale: Locale,
}

impl LocaleContext {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }
}

impl Default for LocaleContext {
    fn default() -> Self {
        Self::new(Locale::default_locale())
    }
}

impl From<Locale> for LocaleContext {
    fn from(locale: Locale) -> Self {
        Self::new(locale)
    }
}

/// Lookup service over a [`TranslationStore`].
#[derive(Clone, Copy)]
pub struct Translator<'a> {
    store: &'a TranslationStore,
    metrics: &'a LookupMetrics,
}

impl Translator<'static> {
    /// Translator over the embedded content and the global metrics.
    pub fn embedded() -> Self {
        Translator::new(TranslationStore::load(), LookupMetrics::global())
    }
}

impl<'a> Translator<'a> {
    pub fn new(store: &'a TranslationStore, metrics: &'a LookupMetrics) -> Self {
        Self { store, metrics }
    }

    pub fn store(&self) -> &'a TranslationStore {
        self.store
    }

    pub fn metrics(&self) -> &'a LookupMetrics {
        self.metrics
    }

    /// Resolve `key_path` for the context's locale.
    pub fn resolve(&self, key_path: &str, ctx: LocaleContext) -> String {
        self.lookup(key_path, ctx.locale)
            .map(str::to_string)
            .unwrap_or_else(|| {
                debug!("No translation for '{}', rendering key path", key_path);
                self.metrics.record_placeholder();
                key_path.to_string()
            })
    }

    /// Resolve `key_path` and substitute `{name}` placeholders.
    ///
    /// Placeholders without a matching argument are left in place.
    pub fn resolve_with(&self, key_path: &str, ctx: LocaleContext, args: &[(&str, &str)]) -> String {
        let mut text = self.resolve(key_path, ctx);
        for (name, value) in args {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }

    /// Resolve every field of a structured entry.
    ///
    /// Each field falls back on its own, so a partially translated entry can
    /// mix languages. A flat entry comes back as a single `"text"` field;
    /// an unknown key yields `None`.
    pub fn resolve_entry(&self, key: &str, ctx: LocaleContext) -> Option<BTreeMap<String, String>> {
        match self.store.entry(key)? {
            LocalizedEntry::Flat(_) => {
                let mut fields = BTreeMap::new();
                fields.insert("text".to_string(), self.resolve(key, ctx));
                Some(fields)
            }
            LocalizedEntry::Structured(fields) => Some(
                fields
                    .keys()
                    .map(|field| {
                        let path = format!("{}.{}", key, field);
                        let text = self.resolve(&path, ctx);
                        (field.clone(), text)
                    })
                    .collect(),
            ),
        }
    }

    fn lookup(&self, key_path: &str, locale: Locale) -> Option<&'a str> {
        if let Some(value) = self.store.get(key_path, locale) {
            self.metrics.record_direct_hit();
            return Some(value);
        }

        let default = Locale::default_locale();
        if locale == default {
            return None;
        }

        let value = self.store.get(key_path, default)?;
        debug!(
            "'{}' missing for {}, falling back to {}",
            key_path, locale, default
        );
        self.metrics.record_default_fallback();
        Some(value)
    }
}
