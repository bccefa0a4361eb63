//! Monetary amounts in integer minor units.
//!
//! All pricing logic operates on integers in the smallest currency unit
//! (kobo). Division by 100 happens exactly once, inside the `Display`
//! impl, which is the presentation boundary.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount in minor currency units (kobo).
///
/// Arithmetic is checked where the inputs come from the server and could
/// overflow, and saturating where a negative result must clamp to zero
/// (e.g. subtracting a discount).
///
/// ## Examples
///
/// ```
/// use vendora_core::Money;
///
/// let unit = Money::from_minor(150_000);
/// let line = unit.checked_mul(2).unwrap();
/// assert_eq!(line.as_minor(), 300_000);
/// assert_eq!(line.to_string(), "₦3000.00");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero kobo.
    pub const ZERO: Self = Self(0);

    /// Create an amount from minor units (kobo).
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// The amount in minor units (kobo).
    #[must_use]
    pub const fn as_minor(&self) -> i64 {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition; `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked multiplication by a quantity; `None` on overflow.
    #[must_use]
    pub const fn checked_mul(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as i64) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction, clamped at zero.
    ///
    /// Used when applying a discount: a discount larger than the subtotal
    /// never produces a negative amount.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        let v = self.0.saturating_sub(other.0);
        if v < 0 { Self(0) } else { Self(v) }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Presentation boundary: divide by 100 here and nowhere else.
        let major = Decimal::new(self.0, 2);
        write!(f, "₦{major:.2}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_mul() {
        let unit = Money::from_minor(150_000);
        assert_eq!(unit.checked_mul(2).unwrap().as_minor(), 300_000);
    }

    #[test]
    fn test_checked_mul_overflow() {
        assert!(Money::from_minor(i64::MAX).checked_mul(2).is_none());
    }

    #[test]
    fn test_checked_add() {
        let a = Money::from_minor(300_000);
        let b = Money::from_minor(50_000);
        assert_eq!(a.checked_add(b).unwrap().as_minor(), 350_000);
    }

    #[test]
    fn test_saturating_sub_clamps_at_zero() {
        let subtotal = Money::from_minor(10_000);
        let discount = Money::from_minor(20_000);
        assert_eq!(subtotal.saturating_sub(discount), Money::ZERO);
    }

    #[test]
    fn test_display_divides_by_hundred() {
        assert_eq!(Money::from_minor(350_000).to_string(), "₦3500.00");
        assert_eq!(Money::from_minor(50).to_string(), "₦0.50");
        assert_eq!(Money::ZERO.to_string(), "₦0.00");
    }

    #[test]
    fn test_serde_transparent() {
        let m = Money::from_minor(150_000);
        assert_eq!(serde_json::to_string(&m).unwrap(), "150000");
        let parsed: Money = serde_json::from_str("150000").unwrap();
        assert_eq!(parsed, m);
    }
}
