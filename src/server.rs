//! Server-side locale negotiation for server-rendered requests.
//!
//! The server sees only what travels with the request: the `locale` cookie
//! and the `Accept-Language` header. The middleware resolves those (cookie
//! first) into a [`Negotiated`] request extension; there is no structured
//! store and no geolocation on this side.

use crate::cookie::PreferenceCookie;
use crate::i18n::{Locale, LocaleContext, LocaleRegistry, MetricsReport, Translator};
use crate::resolver::{detect_from_languages, parse_accept_language, Resolution, ResolutionSource};
use axum::{
    extract::{Path, Request, State},
    http::{
        header::{ACCEPT_LANGUAGE, COOKIE, SET_COOKIE},
        HeaderMap,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::debug;

#[derive(Clone, Copy)]
pub struct AppState {
    pub translator: Translator<'static>,
}

impl AppState {
    pub fn embedded() -> Self {
        Self {
            translator: Translator::embedded(),
        }
    }
}

/// The locale negotiated for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiated(pub Resolution);

impl Negotiated {
    pub fn context(&self) -> LocaleContext {
        LocaleContext::new(self.0.locale)
    }
}

#[derive(Debug, Serialize)]
struct LocaleInfo {
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
    is_default: bool,
}

#[derive(Debug, Serialize)]
struct LocaleResponse {
    locale: Locale,
    source: ResolutionSource,
    native_name: &'static str,
}

#[derive(Debug, Serialize)]
struct SwitchResponse {
    locale: Locale,
    changed: bool,
}

#[derive(Debug, Serialize)]
struct TextResponse {
    key: String,
    locale: Locale,
    text: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/locales", get(list_locales))
        .route("/api/locale", get(current_locale))
        .route("/api/locale/:code", put(switch_locale))
        .route("/api/t/:key", get(translate))
        .route("/api/metrics", get(metrics))
        .layer(middleware::from_fn(negotiate_locale))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolve the request's locale: cookie, then `Accept-Language`, then default.
pub fn negotiate(headers: &HeaderMap) -> Resolution {
    let cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(PreferenceCookie::from_cookie_header);
    if let Some(cookie) = cookie {
        return Resolution {
            locale: cookie.locale,
            source: ResolutionSource::Cookie,
        };
    }

    let languages = headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(parse_accept_language)
        .unwrap_or_default();
    if let Some(locale) = detect_from_languages(&languages) {
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

async fn negotiate_locale(mut req: Request, next: Next) -> Response {
    let resolution = negotiate(req.headers());
    req.extensions_mut().insert(Negotiated(resolution));
    next.run(req).await
}

async fn list_locales() -> Json<Vec<LocaleInfo>> {
    let locales = LocaleRegistry::get()
        .list_all()
        .into_iter()
        .map(|config| LocaleInfo {
            code: config.code,
            name: config.name,
            native_name: config.native_name,
            is_default: config.is_default,
        })
        .collect();
    Json(locales)
}

async fn current_locale(Extension(negotiated): Extension<Negotiated>) -> Json<LocaleResponse> {
    let Negotiated(resolution) = negotiated;
    Json(LocaleResponse {
        locale: resolution.locale,
        source: resolution.source,
        native_name: resolution.locale.native_name(),
    })
}

/// Set the preference cookie. Unsupported codes leave everything as is.
async fn switch_locale(
    Path(code): Path<String>,
    Extension(negotiated): Extension<Negotiated>,
) -> Response {
    match Locale::from_stored(&code) {
        Some(locale) => {
            let cookie = PreferenceCookie::new(locale).to_header_value();
            (
                [(SET_COOKIE, cookie)],
                Json(SwitchResponse {
                    locale,
                    changed: true,
                }),
            )
                .into_response()
        }
        None => {
            debug!("Ignoring switch to unsupported locale '{}'", code);
            Json(SwitchResponse {
                locale: negotiated.0.locale,
                changed: false,
            })
            .into_response()
        }
    }
}

async fn translate(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Extension(negotiated): Extension<Negotiated>,
) -> Json<TextResponse> {
    let ctx = negotiated.context();
    Json(TextResponse {
        text: state.translator.resolve(&key, ctx),
        locale: ctx.locale,
        key,
    })
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsReport> {
    Json(state.translator.metrics().report())
}
