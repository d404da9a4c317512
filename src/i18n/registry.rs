//! Locale registry: single source of truth for the supported locales.
//!
//! The set is closed. Exactly one entry is the default locale, which every
//! content entry is guaranteed to cover.

use std::sync::OnceLock;

/// Metadata for a supported locale.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// Primary language subtag (e.g., "en", "zh")
    pub code: &'static str,

    /// English name of the language (e.g., "Chinese")
    pub name: &'static str,

    /// Name of the language in itself, shown in the locale switcher (e.g., "中文")
    pub native_name: &'static str,

    /// Whether this is the default/fallback locale (exactly one is)
    pub is_default: bool,
}

/// Global locale registry.
///
/// Initialized once on first access and immutable thereafter.
pub struct LocaleRegistry {
    locales: Vec<LocaleConfig>,
}

static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    /// Get the global locale registry instance.
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry {
            locales: supported_locales(),
        })
    }

    /// Get a locale configuration by its exact code.
    ///
    /// Matching is exact; callers normalize tags (case, region) first.
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    /// All supported locales in switcher display order.
    pub fn list_all(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().collect()
    }

    /// The default locale configuration.
    ///
    /// The table below always carries exactly one default entry; this is
    /// checked by the tests rather than at runtime.
    pub fn default_locale(&self) -> &LocaleConfig {
        self.locales
            .iter()
            .find(|locale| locale.is_default)
            .unwrap_or(&self.locales[0])
    }

    /// Check whether a code is one of the supported locales.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

fn supported_locales() -> Vec<LocaleConfig> {
    vec![
        LocaleConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_default: true,
        },
        LocaleConfig {
            code: "zh",
            name: "Chinese",
            native_name: "中文",
            is_default: false,
        },
        LocaleConfig {
            code: "hi",
            name: "Hindi",
            native_name: "हिन्दी",
            is_default: false,
        },
        LocaleConfig {
            code: "fr",
            name: "French",
            native_name: "Français",
            is_default: false,
        },
        LocaleConfig {
            code: "de",
            name: "German",
            native_name: "Deutsch",
            is_default: false,
        },
        LocaleConfig {
            code: "ja",
            name: "Japanese",
            native_name: "日本語",
            is_default: false,
        },
        LocaleConfig {
            code: "ko",
            name: "Korean",
            native_name: "한국어",
            is_default: false,
        },
        LocaleConfig {
            code: "es",
            name: "Spanish",
            native_name: "Español",
            is_default: false,
        },
        LocaleConfig {
            code: "ru",
            name: "Russian",
            native_name: "Русский",
            is_default: false,
        },
    ]
}
