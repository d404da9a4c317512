//! Locale switcher: the visitor's explicit choice.
//!
//! The only path that changes the active locale after resolution. A switch
//! is persisted as user-set, marks the session as overridden so background
//! detection stands down, and is broadcast to every listener so the
//! rendering layer can re-render.

use crate::i18n::{Locale, LocaleContext};
use crate::persistence::{PersistenceAdapter, Provenance};
use crate::resolver::UserOverride;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

pub struct LocaleSwitcher {
    adapter: Arc<PersistenceAdapter>,
    user_override: UserOverride,
    sender: watch::Sender<Locale>,
}

impl LocaleSwitcher {
    pub fn new(adapter: Arc<PersistenceAdapter>, user_override: UserOverride, initial: Locale) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            adapter,
            user_override,
            sender,
        }
    }

    /// Switch to `code`. Unsupported codes are ignored.
    ///
    /// Returns whether the switch happened.
    pub fn set_locale(&self, code: &str) -> bool {
        let Some(locale) = Locale::from_stored(code) else {
            debug!("Ignoring switch to unsupported locale '{}'", code);
            return false;
        };

        self.user_override.set();
        self.adapter.write_preference(locale, Provenance::UserSet);
        let previous = self.sender.send_replace(locale);
        info!("Locale switched from {} to {}", previous, locale);
        true
    }

    pub fn current(&self) -> Locale {
        *self.sender.borrow()
    }

    pub fn context(&self) -> LocaleContext {
        LocaleContext::new(self.current())
    }

    /// Locale-change events; the receiver sees every switch made after it
    /// was created (and can read the current value at any time).
    pub fn subscribe(&self) -> watch::Receiver<Locale> {
        self.sender.subscribe()
    }
}
