//! Status enums for checkout entities.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a B2B price quote.
///
/// Only an [`QuoteStatus::Approved`] quote may back a checkout session;
/// every other status is a terminal load error. Statuses the API adds
/// later deserialize as [`QuoteStatus::Unknown`] rather than failing the
/// decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Expired,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Approved => write!(f, "APPROVED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Whether a line item is sold in a consumer or business context.
///
/// A session containing any B2B line requires business metadata before the
/// delivery step can be confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SellingContext {
    #[default]
    B2c,
    B2b,
}
