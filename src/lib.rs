//! Locale resolution and translation lookup for a multi-locale documentation
//! site.
//!
//! - [`session::ClientSession`] decides which locale a visitor sees and owns
//!   the one path that changes it.
//! - [`i18n::Translator`] turns key paths into text with fallback.
//! - [`server`] negotiates the locale for server-rendered requests.

pub mod config;
pub mod cookie;
pub mod fallback;
pub mod geo;
pub mod i18n;
pub mod persistence;
pub mod resolver;
pub mod server;
pub mod session;
pub mod switcher;
