//! Engine-level error taxonomy.
//!
//! Each kind has exactly one user-visible treatment; remote failures are
//! translated at the call site and never surface as raw transport errors.

use thiserror::Error;
use vendora_core::OrderId;

use crate::api::ApiError;

/// Errors surfaced by the checkout engine.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Local validation failed before any network call. The user must
    /// correct their input.
    #[error("{0}")]
    Validation(String),

    /// The checkout source cannot back a session (quote not approved, cart
    /// empty). Terminal for the session.
    #[error("checkout source unusable: {0}")]
    SourceUnusable(String),

    /// Connectivity problem reaching the commerce API.
    #[error("could not reach the store, check your connection and try again")]
    Network(#[source] ApiError),

    /// The API rejected the request with a 400-class validation error;
    /// server messages shown verbatim.
    #[error("{0}")]
    RemoteValidation(String),

    /// The session token was rejected; the user must log in again.
    #[error("your session has expired, please log in again")]
    AuthExpired,

    /// No shipping quote could be obtained. Blocks submission until
    /// resolved.
    #[error("shipping unavailable: {0}")]
    ShippingUnavailable(String),

    /// The order was created but payment could not be started. The user is
    /// told to retry; the unpaid order id is kept for reconciliation.
    #[error("order {order_id} was created but payment could not be started: {message}")]
    PaymentInitFailed {
        order_id: OrderId,
        message: String,
    },
}

impl From<ApiError> for CheckoutError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::AuthExpired => Self::AuthExpired,
            ApiError::Remote { status, messages } if (400..500).contains(&status) => {
                Self::RemoteValidation(messages.join("; "))
            }
            other => Self::Network(other),
        }
    }
}

impl From<crate::pricing::PricingError> for CheckoutError {
    fn from(err: crate::pricing::PricingError) -> Self {
        Self::SourceUnusable(err.to_string())
    }
}

impl From<crate::address::AddressError> for CheckoutError {
    fn from(err: crate::address::AddressError) -> Self {
        use crate::address::AddressError;
        match err {
            AddressError::Incomplete(_) => Self::Validation(err.to_string()),
            AddressError::CreationFailed(message) => Self::RemoteValidation(message),
            AddressError::Api(api) => Self::from(api),
        }
    }
}

impl From<crate::coupon::CouponError> for CheckoutError {
    fn from(err: crate::coupon::CouponError) -> Self {
        use crate::coupon::CouponError;
        match err {
            CouponError::EmptyCode | CouponError::AlreadyApplied | CouponError::Rejected(_) => {
                Self::Validation(err.to_string())
            }
            CouponError::Api(api) => Self::from(api),
        }
    }
}

/// Result type alias for `CheckoutError`.
pub type Result<T> = std::result::Result<T, CheckoutError>;
