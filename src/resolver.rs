//! Locale resolution: which locale a client sees.
//!
//! A single short-circuiting pass over the signals, in priority order:
//!
//! 1. the structured-store preference
//! 2. the cookie (copied into the structured store)
//! 3. the client's advertised languages (persisted)
//! 4. IP geolocation, in the background; persisted for the next visit only
//! 5. the default locale, not persisted
//!
//! Steps 1-3 run synchronously before anything is rendered. Step 4 never
//! changes the locale of the current page and never overwrites an explicit
//! user choice made while it was in flight.

use crate::geo::GeoLocator;
use crate::i18n::Locale;
use crate::persistence::{PersistenceAdapter, Provenance};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Which step produced the active locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionSource {
    Preference,
    Cookie,
    Browser,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub locale: Locale,
    pub source: ResolutionSource,
}

/// Set once the user explicitly picks a locale in this session.
///
/// Shared between the switcher (writer) and background detection (reader).
#[derive(Debug, Clone, Default)]
pub struct UserOverride(Arc<AtomicBool>);

impl UserOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct LocaleResolver {
    adapter: Arc<PersistenceAdapter>,
    geo: Option<GeoLocator>,
    user_override: UserOverride,
}

impl LocaleResolver {
    pub fn new(
        adapter: Arc<PersistenceAdapter>,
        geo: Option<GeoLocator>,
        user_override: UserOverride,
    ) -> Self {
        Self {
            adapter,
            geo,
            user_override,
        }
    }

    /// Run steps 1-3 (and 5). Never suspends.
    pub fn resolve_sync<S: AsRef<str>>(&self, browser_languages: &[S]) -> Resolution {
        if let Some(record) = self.adapter.read_stored() {
            debug!(
                "Resolved {} from stored preference ({})",
                record.locale, record.provenance
            );
            return Resolution {
                locale: record.locale,
                source: ResolutionSource::Preference,
            };
        }

        if let Some(locale) = self.adapter.read_cookie() {
            debug!("Resolved {} from cookie", locale);
            self.adapter.write_stored(locale, Provenance::CookieRestored);
            return Resolution {
                locale,
                source: ResolutionSource::Cookie,
            };
        }

        if let Some(locale) = detect_from_languages(browser_languages) {
            debug!("Resolved {} from browser languages", locale);
            self.adapter.write_preference(locale, Provenance::BrowserDetected);
            return Resolution {
                locale,
                source: ResolutionSource::Browser,
            };
        }

        Resolution {
            locale: Locale::default_locale(),
            source: ResolutionSource::Default,
        }
    }

    /// Run the full chain.
    ///
    /// When steps 1-3 find nothing and geolocation is configured, detection
    /// is spawned on the current Tokio runtime and its handle returned. The
    /// task yields the locale it persisted, or `None` if it detected nothing
    /// or stood down for an explicit user choice.
    pub fn resolve<S: AsRef<str>>(
        &self,
        browser_languages: &[S],
    ) -> (Resolution, Option<JoinHandle<Option<Locale>>>) {
        let resolution = self.resolve_sync(browser_languages);
        if resolution.source != ResolutionSource::Default {
            return (resolution, None);
        }

        let Some(geo) = self.geo.clone() else {
            return (resolution, None);
        };
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("No async runtime, skipping geolocation: {}", e);
                return (resolution, None);
            }
        };

        // Baseline for the conditional write, taken before any other session
        // sharing this storage can switch.
        let observed = self.adapter.read_preference();
        let adapter = Arc::clone(&self.adapter);
        let user_override = self.user_override.clone();
        let handle = runtime.spawn(detect_and_persist(geo, adapter, user_override, observed));
        (resolution, Some(handle))
    }
}

/// Step 4: detect from geolocation and persist unless pre-empted.
async fn detect_and_persist(
    geo: GeoLocator,
    adapter: Arc<PersistenceAdapter>,
    user_override: UserOverride,
    observed: Option<Locale>,
) -> Option<Locale> {
    let locale = geo.detect_locale().await?;

    if user_override.is_set() {
        debug!("User chose a locale during geolocation, discarding {}", locale);
        return None;
    }
    if !adapter.compare_and_write(observed, locale, Provenance::GeoDetected) {
        return None;
    }

    info!("Persisted geolocated locale {} for future visits", locale);
    Some(locale)
}

/// First advertised language whose primary subtag is supported.
pub fn detect_from_languages<S: AsRef<str>>(languages: &[S]) -> Option<Locale> {
    languages
        .iter()
        .find_map(|tag| Locale::from_language_tag(tag.as_ref()))
}

/// Language tags of an `Accept-Language` header, most preferred first.
///
/// Tags are ordered by their `q` weight, keeping header order on ties.
/// Tags with `q=0` are refused by the client and dropped; an unparsable
/// weight counts as 1.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut weighted: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut components = part.split(';');
            let tag = components.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let weight = components
                .find_map(|param| param.trim().strip_prefix("q="))
                .and_then(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (weight > 0.0).then(|| (tag.to_string(), weight))
        })
        .collect();

    weighted.sort_by(|a, b| b.1.total_cmp(&a.1));
    weighted.into_iter().map(|(tag, _)| tag).collect()
}
