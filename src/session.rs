//! A visitor's session: resolution once, then explicit switches.

use crate::geo::GeoLocator;
use crate::i18n::{Locale, LocaleContext, Translator};
use crate::persistence::PersistenceAdapter;
use crate::resolver::{LocaleResolver, Resolution, UserOverride};
use crate::switcher::LocaleSwitcher;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Owns the resolved locale for one client and the single path that
/// changes it.
///
/// Dropping the session aborts background geolocation; a late result is
/// discarded.
pub struct ClientSession {
    resolution: Resolution,
    switcher: LocaleSwitcher,
    geo_task: Option<JoinHandle<Option<Locale>>>,
}

impl ClientSession {
    /// Resolve the locale for a visiting client.
    ///
    /// `browser_languages` is the client's ordered language list. Background
    /// geolocation, when needed, is spawned on the current Tokio runtime.
    pub fn open<S: AsRef<str>>(
        adapter: Arc<PersistenceAdapter>,
        geo: Option<GeoLocator>,
        browser_languages: &[S],
    ) -> Self {
        let user_override = UserOverride::new();
        let resolver = LocaleResolver::new(Arc::clone(&adapter), geo, user_override.clone());
        let (resolution, geo_task) = resolver.resolve(browser_languages);
        debug!(
            "Session opened with {} ({:?})",
            resolution.locale, resolution.source
        );

        Self {
            resolution,
            switcher: LocaleSwitcher::new(adapter, user_override, resolution.locale),
            geo_task,
        }
    }

    /// How the session's initial locale was chosen.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn locale(&self) -> Locale {
        self.switcher.current()
    }

    pub fn context(&self) -> LocaleContext {
        self.switcher.context()
    }

    /// Explicitly switch locale; see [`LocaleSwitcher::set_locale`].
    pub fn set_locale(&self, code: &str) -> bool {
        self.switcher.set_locale(code)
    }

    pub fn subscribe(&self) -> watch::Receiver<Locale> {
        self.switcher.subscribe()
    }

    /// Resolve text for the session's current locale.
    pub fn text(&self, translator: &Translator<'_>, key_path: &str) -> String {
        translator.resolve(key_path, self.context())
    }

    pub fn has_pending_detection(&self) -> bool {
        self.geo_task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Wait for background geolocation, if any, and return the locale it
    /// persisted for future visits.
    pub async fn finish_detection(&mut self) -> Option<Locale> {
        let task = self.geo_task.take()?;
        match task.await {
            Ok(locale) => locale,
            Err(e) => {
                debug!("Geolocation task did not complete: {}", e);
                None
            }
        }
    }
}

impl Drop for ClientSession {
    fn drop(&mut self) {
        if let Some(task) = self.geo_task.take() {
            task.abort();
        }
    }
}
