//! Locale type: validated member of the supported locale set.

use crate::i18n::{LocaleConfig, LocaleRegistry};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocaleError {
    #[error("Unknown locale code: '{0}'")]
    Unknown(String),
}

/// A supported locale.
///
/// Can only be constructed from a code present in the registry, so holding a
/// `Locale` is proof the value is in the closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale {
    code: &'static str,
}

impl Locale {
    pub const EN: Locale = Locale { code: "en" };
    pub const ZH: Locale = Locale { code: "zh" };
    pub const HI: Locale = Locale { code: "hi" };
    pub const FR: Locale = Locale { code: "fr" };
    pub const DE: Locale = Locale { code: "de" };
    pub const JA: Locale = Locale { code: "ja" };
    pub const KO: Locale = Locale { code: "ko" };
    pub const ES: Locale = Locale { code: "es" };
    pub const RU: Locale = Locale { code: "ru" };

    /// Create a Locale from an exact code such as `"fr"`.
    pub fn from_code(code: &str) -> Result<Locale, LocaleError> {
        LocaleRegistry::get()
            .get_by_code(code)
            .map(|config| Locale { code: config.code })
            .ok_or_else(|| LocaleError::Unknown(code.to_string()))
    }

    /// Parse a persisted value (storage entry or cookie).
    ///
    /// Surrounding whitespace and case are tolerated; anything outside the
    /// supported set is `None`.
    pub fn from_stored(value: &str) -> Option<Locale> {
        Locale::from_code(&value.trim().to_ascii_lowercase()).ok()
    }

    /// Match a BCP 47 language tag (`"de-DE"`, `"zh_Hans_CN"`) on its
    /// primary subtag.
    pub fn from_language_tag(tag: &str) -> Option<Locale> {
        let primary = tag.trim().split(['-', '_']).next()?;
        if primary.is_empty() {
            return None;
        }
        Locale::from_stored(primary)
    }

    /// The default/fallback locale.
    pub fn default_locale() -> Locale {
        Locale {
            code: LocaleRegistry::get().default_locale().code,
        }
    }

    /// Every supported locale, in registry order.
    pub fn all() -> Vec<Locale> {
        LocaleRegistry::get()
            .list_all()
            .into_iter()
            .map(|config| Locale { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Registry metadata for this locale.
    ///
    /// Falls back to the default locale's entry, which cannot happen for a
    /// value built through the constructors above.
    pub fn config(&self) -> &'static LocaleConfig {
        let registry = LocaleRegistry::get();
        registry
            .get_by_code(self.code)
            .unwrap_or_else(|| registry.default_locale())
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_default(&self) -> bool {
        self.config().is_default
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::default_locale()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl std::str::FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_code(s)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Locale::from_code(&code).map_err(serde::de::Error::custom)
    }
}
