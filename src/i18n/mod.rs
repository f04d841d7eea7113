//! Localized, user-facing messages keyed by error kind.

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;

pub mod messages;

pub use messages::MessageKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Tr,
}

impl Locale {
    /// Picks the locale from the first entry of an `Accept-Language` value,
    /// e.g. `tr-TR,tr;q=0.9,en;q=0.8` is Turkish. Unknown tags fall back to
    /// English.
    pub fn from_accept_language(value: &str) -> Self {
        let primary = value
            .split(',')
            .next()
            .and_then(|entry| entry.split(';').next())
            .and_then(|tag| tag.trim().split(['-', '_']).next())
            .unwrap_or_default();

        match primary.to_ascii_lowercase().as_str() {
            "tr" => Locale::Tr,
            _ => Locale::En,
        }
    }
}

pub fn message(key: MessageKey, locale: Locale) -> &'static str {
    match locale {
        Locale::En => messages::english(key),
        Locale::Tr => messages::turkish(key),
    }
}

/// Extracts the caller's [`Locale`] from the `Accept-Language` header.
#[derive(Debug, Clone, Copy)]
pub struct AcceptLanguage(pub Locale);

#[async_trait]
impl<S> FromRequestParts<S> for AcceptLanguage
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .map(Locale::from_accept_language)
            .unwrap_or_default();

        Ok(AcceptLanguage(locale))
    }
}
