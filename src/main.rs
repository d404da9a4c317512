use anyhow::{Context, Result};
use site_locale::config::Config;
use site_locale::i18n::{CoverageValidator, Locale, TranslationStore};
use site_locale::server::{router, AppState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_locale=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    // Check content coverage once at startup
    let store = TranslationStore::load();
    let report = CoverageValidator::validate(store);
    for error in &report.errors {
        warn!("Content error: {}", error);
    }
    for locale in Locale::all() {
        info!(
            "{} ({}): {:.0}% translated",
            locale.native_name(),
            locale,
            CoverageValidator::coverage(store, locale)
        );
    }

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Serving locale API on {}", addr);

    axum::serve(listener, router(AppState::embedded()))
        .await
        .context("Server error")?;

    Ok(())
}
