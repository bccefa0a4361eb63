//! Shipping quote client and staleness tracking.
//!
//! A quote is keyed by the `(address, items, method)` triad and must be
//! recomputed whenever any of the three changes. Rapid input edits can
//! leave multiple requests in flight; a request-generation counter ensures
//! only the response to the latest request is ever applied - earlier
//! responses come back as [`ShippingOutcome::Superseded`] and are dropped.
//!
//! A quote failure is never treated as free shipping: it is recorded as a
//! blocking error that must clear before submission is allowed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::instrument;
use vendora_core::{AddressId, Money};

use crate::api::types::{ShippingItem, ShippingQuoteRequest};
use crate::api::CommerceClient;

/// A delivery fee quote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingQuote {
    pub fee: Money,
    pub total_weight_kg: f64,
}

/// The input triad a quote was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingKey {
    pub address_id: Option<AddressId>,
    pub items: Vec<ShippingItem>,
    pub method: String,
}

/// Result of a quote attempt.
#[derive(Debug, Clone)]
pub enum ShippingOutcome {
    /// A fee was quoted for the key.
    Quoted(ShippingQuote),
    /// No address id yet (draft address); no remote call was made.
    AddressRequired,
    /// The quote failed; blocks submission until cleared.
    Failed(String),
    /// A newer request was started while this one was in flight; the
    /// response must be discarded.
    Superseded,
}

/// Client wrapper enforcing latest-request-wins ordering.
#[derive(Clone)]
pub struct ShippingQuoteClient {
    client: CommerceClient,
    method: String,
    generation: Arc<AtomicU64>,
}

impl ShippingQuoteClient {
    /// Create a quote client for a fixed shipping method tier.
    #[must_use]
    pub fn new(client: CommerceClient, method: impl Into<String>) -> Self {
        Self {
            client,
            method: method.into(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The shipping method tier this client quotes for.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The key a quote for these inputs would carry.
    #[must_use]
    pub fn key(&self, address_id: Option<AddressId>, items: Vec<ShippingItem>) -> ShippingKey {
        ShippingKey {
            address_id,
            items,
            method: self.method.clone(),
        }
    }

    /// Request a delivery fee for the given address and items.
    ///
    /// Short-circuits to [`ShippingOutcome::AddressRequired`] without a
    /// remote call when no address id is available. A response that was
    /// overtaken by a newer request returns
    /// [`ShippingOutcome::Superseded`].
    #[instrument(skip(self, items))]
    pub async fn quote(
        &self,
        address_id: Option<AddressId>,
        items: Vec<ShippingItem>,
    ) -> ShippingOutcome {
        let Some(address_id) = address_id else {
            return ShippingOutcome::AddressRequired;
        };

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self
            .client
            .shipping_quote(&ShippingQuoteRequest {
                address_id,
                items,
                shipping_method: self.method.clone(),
            })
            .await;

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "discarding superseded shipping quote response");
            return ShippingOutcome::Superseded;
        }

        match result {
            Ok(response) => ShippingOutcome::Quoted(ShippingQuote {
                fee: response.shipping_fee_kobo,
                total_weight_kg: response.total_weight_kg,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "shipping quote failed");
                ShippingOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Session-held shipping state.
///
/// Tracks the last applied key so callers can tell when the quote has gone
/// stale, and records quote failures as blocking errors.
#[derive(Debug, Clone, Default)]
pub struct ShippingState {
    last_key: Option<ShippingKey>,
    quote: Option<ShippingQuote>,
    error: Option<String>,
}

impl ShippingState {
    /// Whether the state needs recomputing for `key`.
    ///
    /// A failed attempt is always stale, even for an unchanged triad: the
    /// blocking error must be clearable by retrying once the shipping
    /// service recovers, not only by editing the address or items.
    #[must_use]
    pub fn is_stale(&self, key: &ShippingKey) -> bool {
        self.error.is_some() || self.last_key.as_ref() != Some(key)
    }

    /// Apply a quote outcome for `key`. Superseded outcomes are discarded.
    pub fn apply(&mut self, key: ShippingKey, outcome: ShippingOutcome) {
        match outcome {
            ShippingOutcome::Superseded => {}
            ShippingOutcome::Quoted(quote) => {
                self.last_key = Some(key);
                self.quote = Some(quote);
                self.error = None;
            }
            ShippingOutcome::AddressRequired => {
                self.last_key = Some(key);
                self.quote = None;
                self.error = None;
            }
            ShippingOutcome::Failed(message) => {
                self.last_key = Some(key);
                self.quote = None;
                self.error = Some(message);
            }
        }
    }

    /// The current quote, if one applies.
    #[must_use]
    pub const fn quote(&self) -> Option<&ShippingQuote> {
        self.quote.as_ref()
    }

    /// The quoted fee, or zero while no quote applies.
    #[must_use]
    pub fn fee(&self) -> Money {
        self.quote.map_or(Money::ZERO, |q| q.fee)
    }

    /// The blocking error, if the last attempt failed.
    #[must_use]
    pub fn blocking_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Drop all shipping state (e.g. when the source is replaced).
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
