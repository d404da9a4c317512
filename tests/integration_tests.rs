//! Integration tests for the site locale crate
//!
//! These tests drive whole visits through the public API: resolution over
//! real persistence backends, background geolocation against mocked
//! providers, explicit switches racing detection, and the HTTP surface.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use site_locale::{
    cookie::COOKIE_NAME,
    geo::{CountryField, GeoEndpoint, GeoLocator},
    i18n::{Locale, Translator},
    persistence::{
        CookieJar, FileCookieJar, FileStore, KeyValueStore, MemoryCookieJar, MemoryStore,
        PersistenceAdapter, STORAGE_KEY,
    },
    resolver::ResolutionSource,
    server::{router, AppState},
    session::ClientSession,
};

const NO_LANGUAGES: [&str; 0] = [];

// ==================== Test Helpers ====================

fn file_adapter(temp_dir: &TempDir) -> Arc<PersistenceAdapter> {
    let store = Arc::new(FileStore::new(temp_dir.path().join("preferences.json")));
    let jar = Arc::new(FileCookieJar::new(temp_dir.path().join("cookies.json")));
    Arc::new(PersistenceAdapter::new(store, jar))
}

fn locator(server: &MockServer) -> GeoLocator {
    GeoLocator::new(
        reqwest::Client::new(),
        vec![
            GeoEndpoint::new(format!("{}/primary", server.uri()), CountryField::SnakeCase),
            GeoEndpoint::new(format!("{}/secondary", server.uri()), CountryField::CamelCase),
        ],
    )
}

async fn mount_country(server: &MockServer, country: &str, delay: Duration, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/primary"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "country_code": country }))
                .set_delay(delay),
        )
        .expect(expected)
        .mount(server)
        .await;
}

// ==================== Resolution Flow Tests ====================

#[tokio::test]
async fn test_stored_preference_wins_over_everything() {
    let server = MockServer::start().await;
    mount_country(&server, "JP", Duration::ZERO, 0).await;

    let store = Arc::new(MemoryStore::with_value(STORAGE_KEY, "zh"));
    let jar = Arc::new(MemoryCookieJar::with_cookie(COOKIE_NAME, "fr"));
    let adapter = Arc::new(PersistenceAdapter::new(store, jar));

    let session = ClientSession::open(adapter, Some(locator(&server)), &["de-DE"]);

    assert_eq!(session.locale(), Locale::ZH);
    assert_eq!(session.resolution().source, ResolutionSource::Preference);
    assert!(!session.has_pending_detection());
}

#[tokio::test]
async fn test_cookie_restores_structured_store() {
    let store = Arc::new(MemoryStore::new());
    let jar = Arc::new(MemoryCookieJar::with_cookie(COOKIE_NAME, "fr"));
    let adapter = Arc::new(PersistenceAdapter::new(store.clone(), jar));

    let session = ClientSession::open(adapter, None, &NO_LANGUAGES);

    assert_eq!(session.locale(), Locale::FR);
    assert_eq!(store.get(STORAGE_KEY).as_deref(), Some("fr"));
}

#[tokio::test]
async fn test_browser_languages_use_first_supported_primary_subtag() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = file_adapter(&temp_dir);

    let session = ClientSession::open(adapter.clone(), None, &["pt-BR", "de-DE", "fr-FR"]);

    assert_eq!(session.locale(), Locale::DE);
    assert_eq!(session.resolution().source, ResolutionSource::Browser);
    assert_eq!(adapter.read_preference(), Some(Locale::DE));
    assert_eq!(adapter.read_cookie(), Some(Locale::DE));
}

#[tokio::test]
async fn test_default_when_nothing_matches_and_geo_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/primary"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/secondary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "fail",
            "message": "private range"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = Arc::new(PersistenceAdapter::in_memory());
    let mut session = ClientSession::open(adapter.clone(), Some(locator(&server)), &["it-IT"]);

    assert_eq!(session.locale(), Locale::EN);
    assert_eq!(session.resolution().source, ResolutionSource::Default);
    assert_eq!(session.finish_detection().await, None);
    assert_eq!(adapter.read_preference(), None);
}

// ==================== Geolocation Flow Tests ====================

#[tokio::test]
async fn test_geolocation_persists_for_next_visit_only() {
    let server = MockServer::start().await;
    // One network call across both visits.
    mount_country(&server, "JP", Duration::ZERO, 1).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = file_adapter(&temp_dir);

    let mut first = ClientSession::open(adapter.clone(), Some(locator(&server)), &NO_LANGUAGES);
    assert_eq!(first.locale(), Locale::EN);
    assert_eq!(first.finish_detection().await, Some(Locale::JA));
    // The page already shown keeps its locale.
    assert_eq!(first.locale(), Locale::EN);
    drop(first);

    let second = ClientSession::open(file_adapter(&temp_dir), Some(locator(&server)), &NO_LANGUAGES);
    assert_eq!(second.locale(), Locale::JA);
    assert_eq!(second.resolution().source, ResolutionSource::Preference);
    assert!(!second.has_pending_detection());
}

#[tokio::test]
async fn test_explicit_switch_beats_in_flight_geolocation() {
    let server = MockServer::start().await;
    mount_country(&server, "JP", Duration::from_millis(300), 1).await;

    let adapter = Arc::new(PersistenceAdapter::in_memory());
    let mut session = ClientSession::open(adapter.clone(), Some(locator(&server)), &NO_LANGUAGES);
    assert!(session.has_pending_detection());

    assert!(session.set_locale("es"));

    assert_eq!(session.finish_detection().await, None);
    assert_eq!(session.locale(), Locale::ES);
    assert_eq!(adapter.read_preference(), Some(Locale::ES));
    assert_eq!(adapter.read_cookie(), Some(Locale::ES));
}

#[tokio::test]
async fn test_switch_in_another_session_beats_in_flight_geolocation() {
    let server = MockServer::start().await;
    mount_country(&server, "JP", Duration::from_millis(100), 1).await;

    // Two tabs sharing the same storage.
    let adapter = Arc::new(PersistenceAdapter::in_memory());
    let mut first_tab = ClientSession::open(adapter.clone(), Some(locator(&server)), &NO_LANGUAGES);
    assert!(first_tab.has_pending_detection());

    let second_tab = ClientSession::open(adapter.clone(), None, &NO_LANGUAGES);
    assert!(second_tab.set_locale("es"));

    assert_eq!(first_tab.finish_detection().await, None);
    assert_eq!(adapter.read_preference(), Some(Locale::ES));
    assert_eq!(adapter.read_cookie(), Some(Locale::ES));
}

#[tokio::test]
async fn test_switch_after_detection_still_wins() {
    let server = MockServer::start().await;
    mount_country(&server, "KR", Duration::ZERO, 1).await;

    let adapter = Arc::new(PersistenceAdapter::in_memory());
    let mut session = ClientSession::open(adapter.clone(), Some(locator(&server)), &NO_LANGUAGES);
    assert_eq!(session.finish_detection().await, Some(Locale::KO));

    assert!(session.set_locale("ru"));
    assert_eq!(adapter.read_preference(), Some(Locale::RU));
}

// ==================== Switcher Flow Tests ====================

#[tokio::test]
async fn test_invalid_switch_is_noop() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let adapter = file_adapter(&temp_dir);
    let session = ClientSession::open(adapter.clone(), None, &["fr"]);
    let rx = session.subscribe();

    assert!(!session.set_locale("xx"));

    assert_eq!(session.locale(), Locale::FR);
    assert_eq!(adapter.read_preference(), Some(Locale::FR));
    assert!(!rx.has_changed().expect("Sender should be alive"));
}

#[tokio::test]
async fn test_switch_rerenders_embedded_text() {
    let session = ClientSession::open(Arc::new(PersistenceAdapter::in_memory()), None, &["en-US"]);
    let translator = Translator::embedded();
    let mut rx = session.subscribe();

    assert_eq!(session.text(&translator, "nav.home"), "Home");

    assert!(session.set_locale("de"));
    rx.changed().await.expect("Sender should be alive");

    assert_eq!(*rx.borrow_and_update(), Locale::DE);
    assert_eq!(session.text(&translator, "nav.home"), "Startseite");
    assert_eq!(session.text(&translator, "no.such.key"), "no.such.key");
}

#[tokio::test]
async fn test_switch_writes_both_channels_to_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let session = ClientSession::open(file_adapter(&temp_dir), None, &NO_LANGUAGES);

    assert!(session.set_locale("hi"));

    let store = FileStore::new(temp_dir.path().join("preferences.json"));
    let jar = FileCookieJar::new(temp_dir.path().join("cookies.json"));
    assert_eq!(store.get(STORAGE_KEY).as_deref(), Some("hi"));
    assert_eq!(jar.get(COOKIE_NAME).as_deref(), Some("hi"));
}

// ==================== HTTP Server Tests ====================

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    tokio::spawn(async move {
        axum::serve(listener, router(AppState::embedded()))
            .await
            .expect("Server failed");
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_server_lists_locales() {
    let base = spawn_server().await;

    let locales: Vec<Value> = reqwest::get(format!("{}/api/locales", base))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");

    assert_eq!(locales.len(), 9);
    assert_eq!(locales[0]["code"], "en");
    assert_eq!(locales[0]["is_default"], true);
    assert!(locales.iter().any(|l| l["native_name"] == "한국어"));
}

#[tokio::test]
async fn test_server_negotiates_cookie_then_accept_language() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{}/api/locale", base))
        .header("accept-language", "de-DE,de;q=0.9,en;q=0.5")
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body["locale"], "de");
    assert_eq!(body["source"], "browser");

    let body: Value = client
        .get(format!("{}/api/t/nav.home", base))
        .header("cookie", "locale=ko")
        .header("accept-language", "de-DE")
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");
    assert_eq!(body["locale"], "ko");
    assert_eq!(body["text"], "홈");
}

#[tokio::test]
async fn test_server_switch_sets_cookie() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{}/api/locale/ja", base))
        .send()
        .await
        .expect("request");
    assert!(response.status().is_success());

    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .expect("Set-Cookie header")
        .to_string();
    assert!(cookie.starts_with("locale=ja;"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=31536000"));
    assert!(cookie.contains("SameSite=Lax"));

    let body: Value = response.json().await.expect("json");
    assert_eq!(body["changed"], true);
}

#[tokio::test]
async fn test_server_rejects_unsupported_switch() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("{}/api/locale/xx", base))
        .header("cookie", "locale=fr")
        .send()
        .await
        .expect("request");

    assert!(response.headers().get("set-cookie").is_none());
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["changed"], false);
    assert_eq!(body["locale"], "fr");
}

#[tokio::test]
async fn test_server_unknown_key_returns_key_path() {
    let base = spawn_server().await;

    let body: Value = reqwest::get(format!("{}/api/t/missing.key", base))
        .await
        .expect("request")
        .json()
        .await
        .expect("json");

    assert_eq!(body["text"], "missing.key");
    assert_eq!(body["locale"], "en");
}

#[tokio::test]
async fn test_server_reports_lookup_metrics() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    client
        .get(format!("{}/api/t/nav.home", base))
        .header("cookie", "locale=de")
        .send()
        .await
        .expect("request");

    let report: Value = client
        .get(format!("{}/api/metrics", base))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("json");

    // Counters are process-wide, so other tests may have added to them.
    assert!(report["direct_hits"].as_u64().expect("direct_hits") >= 1);
    assert!(report["direct_hit_rate"].is_number());
    assert!(report["geo_success_rate"].is_number());
}
