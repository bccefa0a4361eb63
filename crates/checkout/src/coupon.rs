//! Coupon validation and discount state.
//!
//! The discount amount is only trusted while `applied` is set, and
//! `applied` is only set by an explicit successful validation against the
//! current subtotal. While applied, the input is locked: a new code needs
//! an explicit clear first. A failed validation always resets the
//! discount to zero - a previously applied coupon can never linger behind
//! an invalid one.

use thiserror::Error;
use tracing::instrument;
use vendora_core::Money;

use crate::api::types::CouponRequest;
use crate::api::{ApiError, CommerceClient};

/// Errors from applying a coupon.
#[derive(Debug, Error)]
pub enum CouponError {
    /// The code was empty or whitespace; no network call was made.
    #[error("enter a coupon code")]
    EmptyCode,

    /// A coupon is already applied; it must be cleared explicitly before
    /// another code can be validated. No network call was made.
    #[error("remove the applied coupon before entering a new code")]
    AlreadyApplied,

    /// The server rejected the code, message preserved verbatim.
    #[error("{0}")]
    Rejected(String),

    /// Transport-level failure talking to the API.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Session-held coupon state.
#[derive(Debug, Clone, Default)]
pub struct CouponState {
    code: String,
    applied: bool,
    discount: Money,
}

impl CouponState {
    /// Whether a coupon is currently applied.
    #[must_use]
    pub const fn applied(&self) -> bool {
        self.applied
    }

    /// The applied code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.applied.then_some(self.code.as_str())
    }

    /// The discount in effect. Zero unless a coupon is applied.
    #[must_use]
    pub const fn discount(&self) -> Money {
        if self.applied { self.discount } else { Money::ZERO }
    }

    /// Drop the coupon entirely (also used when the source or item set
    /// changes, so a discount validated against an old subtotal cannot be
    /// carried forward).
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Validate `code` against the current subtotal and update `state`.
///
/// Whitespace-only codes are rejected locally. While a coupon is applied
/// the input is locked: re-applying the same code is a no-op (no second
/// network call, no double discount) and any other code is refused until
/// [`CouponState::clear`] is called. On rejection the state is reset
/// before the error is returned.
///
/// # Errors
///
/// Returns [`CouponError::EmptyCode`] for a blank code,
/// [`CouponError::AlreadyApplied`] when a different coupon is applied,
/// [`CouponError::Rejected`] when the server declines the code, or
/// [`CouponError::Api`] on transport failure.
#[instrument(skip(client, state), fields(subtotal = %subtotal))]
pub async fn apply(
    client: &CommerceClient,
    state: &mut CouponState,
    code: &str,
    subtotal: Money,
) -> Result<(), CouponError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(CouponError::EmptyCode);
    }

    // Applied coupons are locked until cleared: the same code is a no-op,
    // any other code is refused without touching the applied state.
    if state.applied {
        if state.code == code {
            return Ok(());
        }
        return Err(CouponError::AlreadyApplied);
    }

    let validation = client
        .validate_coupon(&CouponRequest {
            code: code.to_string(),
            order_amount: subtotal,
        })
        .await?;

    if validation.valid {
        *state = CouponState {
            code: code.to_string(),
            applied: true,
            discount: validation.discount_amount,
        };
        Ok(())
    } else {
        state.clear();
        Err(CouponError::Rejected(
            validation
                .message
                .unwrap_or_else(|| "this coupon cannot be applied".to_string()),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::CommerceConfig;
    use secrecy::SecretString;

    /// Client pointed at a closed port; any request errors out, so tests
    /// using it prove no network call was attempted.
    fn unreachable_client() -> CommerceClient {
        CommerceClient::new(&CommerceConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_token: SecretString::from("test-token-abcdef123456"),
            shipping_method: "standard".to_string(),
            address_cache_ttl_secs: 60,
        })
    }

    fn applied_state(code: &str, discount: i64) -> CouponState {
        CouponState {
            code: code.to_string(),
            applied: true,
            discount: Money::from_minor(discount),
        }
    }

    #[tokio::test]
    async fn test_whitespace_code_rejected_locally() {
        let client = unreachable_client();
        let mut state = CouponState::default();
        let err = apply(&client, &mut state, "   ", Money::from_minor(1000))
            .await
            .unwrap_err();
        assert!(matches!(err, CouponError::EmptyCode));
        assert!(!state.applied());
    }

    #[tokio::test]
    async fn test_different_code_refused_while_applied() {
        let client = unreachable_client();
        let mut state = applied_state("SAVE20", 20_000);

        // Would fail with CouponError::Api if a request were attempted.
        let err = apply(&client, &mut state, "OTHER10", Money::from_minor(300_000))
            .await
            .unwrap_err();
        assert!(matches!(err, CouponError::AlreadyApplied));

        // The applied coupon is untouched.
        assert!(state.applied());
        assert_eq!(state.code(), Some("SAVE20"));
        assert_eq!(state.discount(), Money::from_minor(20_000));

        // Clearing unlocks the input for the next code.
        state.clear();
        assert!(!state.applied());
    }

    #[tokio::test]
    async fn test_reapplying_same_code_is_local_noop() {
        let client = unreachable_client();
        let mut state = applied_state("SAVE20", 20_000);

        // Would fail with CouponError::Api if a request were attempted.
        apply(&client, &mut state, "SAVE20", Money::from_minor(300_000))
            .await
            .unwrap();
        assert_eq!(state.discount(), Money::from_minor(20_000));
    }

    #[test]
    fn test_discount_not_trusted_unless_applied() {
        let state = CouponState {
            code: "SAVE20".to_string(),
            applied: false,
            discount: Money::from_minor(20_000),
        };
        assert_eq!(state.discount(), Money::ZERO);
        assert!(state.code().is_none());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut state = applied_state("SAVE20", 20_000);
        state.clear();
        assert!(!state.applied());
        assert_eq!(state.discount(), Money::ZERO);
    }
}
