//! Typed client for the remote Vendora commerce API.
//!
//! # Architecture
//!
//! - JSON over HTTP via `reqwest`; the commerce API is the source of truth,
//!   nothing is synced locally.
//! - This module is the single decoding boundary: some endpoints wrap their
//!   payload in `{ "data": ... }` and some return it bare, and only
//!   [`decode_body`] knows that. Everything above works with typed structs.
//! - The saved-address list is the one cached read (`moka`, short TTL); it
//!   is read-shared with profile management, and checkout only ever appends
//!   to it.
//!
//! # Example
//!
//! ```rust,ignore
//! use vendora_checkout::api::CommerceClient;
//!
//! let client = CommerceClient::new(&config);
//! let cart = client.get_cart().await?;
//! let quote = client.shipping_quote(&request).await?;
//! ```

mod client;
pub mod types;

pub use client::CommerceClient;
pub use types::*;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur when calling the commerce API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connectivity, DNS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the documented contract.
    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The bearer token was rejected (HTTP 401).
    #[error("authentication expired")]
    AuthExpired,

    /// Resource not found (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The API rejected the request (4xx) or failed it (5xx), with the
    /// server's own messages preserved verbatim.
    #[error("API error ({status}): {}", messages.join("; "))]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Structured server messages, in response order.
        messages: Vec<String>,
    },
}

impl ApiError {
    /// Whether this is a 400-class validation rejection.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Remote { status, .. } if *status >= 400 && *status < 500)
    }
}

/// Response envelope normalization.
///
/// The commerce API is inconsistent about wrapping: newer endpoints return
/// `{ "data": <payload> }`, older ones return the payload bare. Decode is
/// attempted wrapped-first so a payload that itself has a `data` field is
/// still handled correctly by the endpoints that use one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Error payload shapes the API produces for 4xx/5xx responses.
///
/// Either a single `message` or a list of `errors`; both may be present,
/// in which case all messages are kept in order.
#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

impl ErrorBody {
    fn into_messages(self) -> Vec<String> {
        let mut messages = Vec::new();
        if let Some(message) = self.message {
            messages.push(message);
        }
        messages.extend(self.errors);
        messages
    }
}

/// Decode a success body through the envelope.
pub(crate) fn decode_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let envelope: Envelope<T> = serde_json::from_str(text)?;
    Ok(envelope.into_inner())
}

/// Extract server messages from an error body, falling back to the raw
/// text when the body is not the documented error shape.
pub(crate) fn decode_error_messages(text: &str) -> Vec<String> {
    let parsed = serde_json::from_str::<ErrorBody>(text)
        .unwrap_or_default()
        .into_messages();
    if parsed.is_empty() {
        let fallback = text.trim();
        if fallback.is_empty() {
            vec!["request failed with no error detail".to_string()]
        } else {
            vec![fallback.chars().take(200).collect()]
        }
    } else {
        parsed
    }
}
