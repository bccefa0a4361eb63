//! Price line-item resolution.
//!
//! Normalizes the two heterogeneous checkout sources - a mutable cart and
//! an approved B2B quote - into one uniform list of priced line items plus
//! a subtotal. Pure: no side effects, no network.
//!
//! Two trust rules are enforced here and nowhere else:
//!
//! - a cart's subtotal is the server-reported total, never a client-side
//!   sum of line totals;
//! - a quote line's unit price is the seller's quoted price when present,
//!   falling back to the buyer's requested price.

use thiserror::Error;
use vendora_core::{CartLineId, Money, ProductId, QuoteId, QuoteStatus, SellingContext};

use crate::api::types::{CartResponse, QuoteResponse, ShippingItem};

/// Errors from resolving a checkout source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// The cart has no items.
    #[error("cart is empty")]
    EmptyCart,

    /// The quote is not in an approved state; the actual status is
    /// surfaced to the caller.
    #[error("quote is not usable (status: {0})")]
    QuoteNotUsable(QuoteStatus),

    /// A line amount overflowed 64-bit kobo arithmetic.
    #[error("line amount overflow")]
    AmountOverflow,
}

/// One cart line as loaded from the server.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub line_id: CartLineId,
    pub product_id: ProductId,
    pub title: String,
    pub quantity: u32,
    pub unit_price: Money,
    /// Authoritative server line total, when supplied.
    pub server_line_total: Option<Money>,
    pub selling_context: SellingContext,
}

/// One quote line with both price candidates.
#[derive(Debug, Clone)]
pub struct QuoteLine {
    pub product_id: ProductId,
    pub title: String,
    pub quantity: u32,
    pub requested_price: Money,
    pub seller_quoted_price: Option<Money>,
}

/// The source of truth backing a checkout session.
///
/// Exactly one source is active per session.
#[derive(Debug, Clone)]
pub enum CheckoutSource {
    /// The buyer's shopping cart, with the server-reported total.
    Cart { items: Vec<CartLine>, total: Money },
    /// A previously negotiated B2B quote.
    Quote {
        id: QuoteId,
        status: QuoteStatus,
        items: Vec<QuoteLine>,
    },
}

impl From<CartResponse> for CheckoutSource {
    fn from(cart: CartResponse) -> Self {
        Self::Cart {
            items: cart
                .items
                .into_iter()
                .map(|item| CartLine {
                    line_id: item.id,
                    product_id: item.product_id,
                    title: item.title,
                    quantity: item.quantity,
                    unit_price: item.price,
                    server_line_total: item.line_total,
                    selling_context: item.selling_context,
                })
                .collect(),
            total: cart.total_amount,
        }
    }
}

impl From<QuoteResponse> for CheckoutSource {
    fn from(quote: QuoteResponse) -> Self {
        Self::Quote {
            id: quote.id,
            status: quote.status,
            items: quote
                .items
                .into_iter()
                .map(|item| QuoteLine {
                    product_id: item.product_id,
                    title: item.title,
                    quantity: item.quantity,
                    requested_price: item.requested_price,
                    seller_quoted_price: item.seller_quoted_price,
                })
                .collect(),
        }
    }
}

/// One resolved line item with its final unit price.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub product_id: ProductId,
    pub title: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
    pub selling_context: SellingContext,
}

/// A resolved source: uniform line items plus the subtotal to price
/// shipping and coupons against.
#[derive(Debug, Clone)]
pub struct PricedItems {
    pub items: Vec<LineItem>,
    pub subtotal: Money,
}

impl PricedItems {
    /// Whether any line requires a business (B2B) context.
    #[must_use]
    pub fn requires_business_metadata(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.selling_context == SellingContext::B2b)
    }

    /// The item projection sent to the shipping service.
    #[must_use]
    pub fn shipping_items(&self) -> Vec<ShippingItem> {
        self.items
            .iter()
            .map(|item| ShippingItem {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect()
    }
}

/// Resolve a checkout source into priced line items and a subtotal.
///
/// # Errors
///
/// Returns [`PricingError::EmptyCart`] for a cart with no items,
/// [`PricingError::QuoteNotUsable`] for any quote that is not approved,
/// and [`PricingError::AmountOverflow`] if a line amount cannot be
/// represented.
pub fn resolve(source: &CheckoutSource) -> Result<PricedItems, PricingError> {
    match source {
        CheckoutSource::Cart { items, total } => {
            if items.is_empty() {
                return Err(PricingError::EmptyCart);
            }
            let items = items
                .iter()
                .map(|line| {
                    // Server total wins; only computed when absent.
                    let line_total = match line.server_line_total {
                        Some(total) => total,
                        None => line
                            .unit_price
                            .checked_mul(line.quantity)
                            .ok_or(PricingError::AmountOverflow)?,
                    };
                    Ok(LineItem {
                        product_id: line.product_id,
                        title: line.title.clone(),
                        quantity: line.quantity,
                        unit_price: line.unit_price,
                        line_total,
                        selling_context: line.selling_context,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(PricedItems {
                items,
                // The server-reported cart total is authoritative.
                subtotal: *total,
            })
        }
        CheckoutSource::Quote { status, items, .. } => {
            if *status != QuoteStatus::Approved {
                return Err(PricingError::QuoteNotUsable(*status));
            }
            let mut subtotal = Money::ZERO;
            let items = items
                .iter()
                .map(|line| {
                    let unit_price = line.seller_quoted_price.unwrap_or(line.requested_price);
                    let line_total = unit_price
                        .checked_mul(line.quantity)
                        .ok_or(PricingError::AmountOverflow)?;
                    subtotal = subtotal
                        .checked_add(line_total)
                        .ok_or(PricingError::AmountOverflow)?;
                    Ok(LineItem {
                        product_id: line.product_id,
                        title: line.title.clone(),
                        quantity: line.quantity,
                        unit_price,
                        line_total,
                        selling_context: SellingContext::B2b,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(PricedItems { items, subtotal })
        }
    }
}
