//! Internationalization (i18n): locales, localized content and lookup.
//!
//! # Architecture
//!
//! - `registry`: single source of truth for the supported locales
//! - `locale`: type-safe `Locale`, constructible only from supported codes
//! - `content`: the flat/structured entry model and the data file format
//! - `store`: read-only in-memory content, loaded once
//! - `lookup`: key path resolution with default-locale and placeholder fallback
//! - `validator`: coverage and placeholder checks over the content
//! - `metrics`: lookup and detection counters
//!
//! # Example
//!
//! ```rust,ignore
//! use site_locale::i18n::{Locale, LocaleContext, Translator};
//!
//! let translator = Translator::embedded();
//! let text = translator.resolve("nav.docs", LocaleContext::new(Locale::FR));
//! ```

pub mod content;
mod locale;
mod lookup;
mod metrics;
mod registry;
mod store;
mod validator;

pub use content::{ContentError, LocalizedEntry};
pub use locale::{Locale, LocaleError};
pub use lookup::{LocaleContext, Translator};
pub use metrics::{LookupMetrics, MetricsReport};
pub use registry::{LocaleConfig, LocaleRegistry};
pub use store::TranslationStore;
pub use validator::{CoverageValidator, ValidationReport};
