//! IP geolocation: country detection for the last step of locale resolution.
//!
//! Two providers are consulted in order. Each answers with a JSON body whose
//! country field is named differently, so every endpoint carries the shape it
//! speaks. Any failure (transport, status, body) moves on to the next
//! provider; when none answers, detection yields `None`.

use crate::config::Config;
use crate::fallback::first_success;
use crate::i18n::{Locale, LookupMetrics};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Geolocation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geolocation provider returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Geolocation response is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Geolocation response has no usable country code")]
    MissingCountry,
}

/// Name of the country field in a provider's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountryField {
    /// `{"country_code": "JP"}`
    SnakeCase,
    /// `{"countryCode": "JP"}`
    CamelCase,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoEndpoint {
    pub url: String,
    pub field: CountryField,
}

impl GeoEndpoint {
    pub fn new(url: impl Into<String>, field: CountryField) -> Self {
        Self {
            url: url.into(),
            field,
        }
    }
}

impl fmt::Display for GeoEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[derive(Debug, Deserialize)]
struct SnakeCaseResponse {
    country_code: Option<String>,
    #[serde(default)]
    error: bool,
}

#[derive(Debug, Deserialize)]
struct CamelCaseResponse {
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
    status: Option<String>,
}

/// Extract a country code from a provider body of the given shape.
///
/// Returns the upper-cased ISO 3166-1 alpha-2 code.
pub fn parse_country(body: &str, field: CountryField) -> Result<String, GeoError> {
    let code = match field {
        CountryField::SnakeCase => {
            let response: SnakeCaseResponse = serde_json::from_str(body)?;
            if response.error {
                return Err(GeoError::MissingCountry);
            }
            response.country_code
        }
        CountryField::CamelCase => {
            let response: CamelCaseResponse = serde_json::from_str(body)?;
            if response.status.as_deref() == Some("fail") {
                return Err(GeoError::MissingCountry);
            }
            response.country_code
        }
    };

    code.map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic()))
        .ok_or(GeoError::MissingCountry)
}

/// Locale for an ISO country code, from a fixed table.
///
/// Countries outside the table have no detection.
pub fn locale_for_country(country: &str) -> Option<Locale> {
    let locale = match country.to_ascii_uppercase().as_str() {
        "US" | "GB" | "AU" | "CA" | "NZ" | "IE" => Locale::EN,
        "CN" | "TW" | "HK" | "MO" | "SG" => Locale::ZH,
        "IN" => Locale::HI,
        "FR" | "MC" => Locale::FR,
        "DE" | "AT" | "CH" | "LI" => Locale::DE,
        "JP" => Locale::JA,
        "KR" => Locale::KO,
        "ES" | "MX" | "AR" | "CO" | "CL" | "PE" | "VE" | "EC" | "GT" | "CU" | "BO" | "DO"
        | "HN" | "PY" | "SV" | "NI" | "CR" | "PA" | "UY" => Locale::ES,
        "RU" | "BY" | "KZ" | "KG" => Locale::RU,
        _ => return None,
    };
    Some(locale)
}

/// Queries the configured providers in order.
#[derive(Clone)]
pub struct GeoLocator {
    client: reqwest::Client,
    endpoints: Vec<GeoEndpoint>,
}

impl GeoLocator {
    pub fn new(client: reqwest::Client, endpoints: Vec<GeoEndpoint>) -> Self {
        Self { client, endpoints }
    }

    /// Locator over the configured primary and secondary providers.
    pub fn from_config(config: &Config) -> Result<Self, GeoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.geo_timeout_secs))
            .build()?;
        Ok(Self::new(
            client,
            vec![
                GeoEndpoint::new(config.geo_primary_url.clone(), CountryField::SnakeCase),
                GeoEndpoint::new(config.geo_secondary_url.clone(), CountryField::CamelCase),
            ],
        ))
    }

    pub fn endpoints(&self) -> &[GeoEndpoint] {
        &self.endpoints
    }

    /// Country code of the client, or `None` if no provider answered.
    pub async fn detect_country(&self) -> Option<String> {
        first_success("Geolocation", &self.endpoints, |endpoint| {
            let client = self.client.clone();
            let endpoint = endpoint.clone();
            async move {
                let metrics = LookupMetrics::global();
                metrics.record_geo_request();
                let result = fetch_country(&client, &endpoint).await;
                if result.is_err() {
                    metrics.record_geo_failure();
                }
                result
            }
        })
        .await
    }

    /// Locale for the client's country, or `None`.
    pub async fn detect_locale(&self) -> Option<Locale> {
        let country = self.detect_country().await?;
        let locale = locale_for_country(&country);
        debug!("Geolocation country {} maps to {:?}", country, locale);
        locale
    }
}

async fn fetch_country(client: &reqwest::Client, endpoint: &GeoEndpoint) -> Result<String, GeoError> {
    let response = client.get(&endpoint.url).send().await?;

    if !response.status().is_success() {
        return Err(GeoError::Status(response.status()));
    }

    let body = response.text().await?;
    parse_country(&body, endpoint.field)
}
