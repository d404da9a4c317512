//! Visit binary - runs locale resolution as a returning or first-time client
//!
//! Usage:
//!   cargo run --bin visit -- de-DE fr-FR      # Resolve with these browser languages
//!   cargo run --bin visit -- --set es         # Explicitly switch to Spanish
//!
//! Without language arguments, the `LANG` environment variable is used.
//! Preferences persist in PREFERENCE_STORE_PATH (and a cookie file beside
//! it), so a second run short-circuits on the stored preference.

use anyhow::Result;
use site_locale::config::Config;
use site_locale::geo::GeoLocator;
use site_locale::i18n::Translator;
use site_locale::persistence::{FileCookieJar, FileStore, PersistenceAdapter};
use site_locale::session::ClientSession;
use std::sync::Arc;
use tracing::{info, warn};

const SHOWN_KEYS: [&str; 4] = ["site.tagline", "nav.docs", "commands.init.description", "footer.copyright"];

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_locale=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let switch_to = args
        .iter()
        .position(|a| a == "--set")
        .and_then(|i| args.get(i + 1).cloned());
    let mut languages: Vec<String> = args
        .iter()
        .enumerate()
        .filter(|(i, a)| !a.starts_with("--") && (*i == 0 || args[i - 1] != "--set"))
        .map(|(_, a)| a.clone())
        .collect();
    if languages.is_empty() {
        if let Ok(lang) = std::env::var("LANG") {
            // LANG looks like "de_DE.UTF-8"
            languages.push(lang.split('.').next().unwrap_or_default().to_string());
        }
    }

    let cookie_path = config.preference_store_path.with_extension("cookies.json");
    let adapter = Arc::new(PersistenceAdapter::new(
        Arc::new(FileStore::new(&config.preference_store_path)),
        Arc::new(FileCookieJar::new(cookie_path)),
    ));

    let geo = if config.geo_enabled {
        match GeoLocator::from_config(&config) {
            Ok(locator) => Some(locator),
            Err(e) => {
                warn!("Geolocation unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    let mut session = ClientSession::open(adapter, geo, &languages);
    let resolution = session.resolution();
    info!(
        "Resolved {} ({}) via {:?}",
        resolution.locale,
        resolution.locale.native_name(),
        resolution.source
    );

    if let Some(code) = switch_to {
        if !session.set_locale(&code) {
            warn!("'{}' is not a supported locale, keeping {}", code, session.locale());
        }
    }

    let translator = Translator::embedded();
    for key in SHOWN_KEYS {
        println!("{:<28} {}", key, session.text(&translator, key));
    }

    if let Some(locale) = session.finish_detection().await {
        info!("Next visit will use {} (from geolocation)", locale);
    }

    Ok(())
}
