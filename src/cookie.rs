//! The `locale` preference cookie.
//!
//! Serialized as a `Set-Cookie` value covering the whole site for one year,
//! and parsed back out of a request `Cookie` header.

use crate::i18n::Locale;
use chrono::{DateTime, Duration, Utc};

pub const COOKIE_NAME: &str = "locale";

/// One year, in seconds.
pub const COOKIE_MAX_AGE_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreferenceCookie {
    pub locale: Locale,
}

impl PreferenceCookie {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    /// `Set-Cookie` value expiring one year from now.
    pub fn to_header_value(&self) -> String {
        self.to_header_value_at(Utc::now())
    }

    /// `Set-Cookie` value expiring one year after `now`.
    ///
    /// `Max-Age` takes precedence in current user agents; `Expires` is kept
    /// for the ones that ignore it.
    pub fn to_header_value_at(&self, now: DateTime<Utc>) -> String {
        let expires = now + Duration::seconds(COOKIE_MAX_AGE_SECS);
        format!(
            "{}={}; Path=/; Max-Age={}; Expires={}; SameSite=Lax",
            COOKIE_NAME,
            self.locale.code(),
            COOKIE_MAX_AGE_SECS,
            expires.format("%a, %d %b %Y %H:%M:%S GMT")
        )
    }

    /// Read the preference from a request `Cookie` header.
    ///
    /// Missing or unsupported values are `None`.
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        cookie_value(header, COOKIE_NAME)
            .and_then(Locale::from_stored)
            .map(Self::new)
    }
}

/// Value of the first cookie named `name` in a `Cookie` header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key.trim() == name {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}
