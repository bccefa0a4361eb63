//! Wire types for the commerce API.
//!
//! These structs mirror the documented response contracts exactly. They are
//! converted into domain types (`pricing::LineItem` etc.) at the module
//! boundary; nothing outside `api` deserializes JSON.

use serde::{Deserialize, Serialize};
use vendora_core::{
    AddressId, CartLineId, Money, OrderId, ProductId, QuoteId, QuoteStatus, SellingContext,
};

// =============================================================================
// Cart and quote
// =============================================================================

/// The buyer's current shopping cart.
#[derive(Debug, Clone, Deserialize)]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    /// Server-reported cart total in kobo. Authoritative; never recomputed.
    pub total_amount: Money,
}

/// One cart line as reported by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    pub id: CartLineId,
    pub product_id: ProductId,
    pub title: String,
    pub quantity: u32,
    /// Unit price in kobo.
    pub price: Money,
    /// Server-supplied line total, when present it wins over `price * quantity`.
    #[serde(default)]
    pub line_total: Option<Money>,
    #[serde(default)]
    pub selling_context: SellingContext,
}

/// A previously negotiated B2B quote.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteResponse {
    pub id: QuoteId,
    pub status: QuoteStatus,
    pub items: Vec<QuoteItem>,
}

/// One quote line with both price candidates.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteItem {
    pub product_id: ProductId,
    pub title: String,
    pub quantity: u32,
    /// The buyer's originally requested unit price in kobo.
    pub requested_price: Money,
    /// The seller's counter-offer, when made. Takes precedence.
    #[serde(default)]
    pub seller_quoted_price: Option<Money>,
}

// =============================================================================
// Addresses and geocoding
// =============================================================================

/// A saved delivery address.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressRecord {
    pub id: AddressId,
    pub label: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Payload for creating a new address.
#[derive(Debug, Clone, Serialize)]
pub struct NewAddress {
    pub label: String,
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// Free-text geocoding request built from address fields.
#[derive(Debug, Clone, Serialize)]
pub struct GeocodeRequest {
    pub address: String,
}

/// Coordinates from a successful geocode.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

// =============================================================================
// Shipping
// =============================================================================

/// Shipping-quote request for a delivery address and item set.
#[derive(Debug, Clone, Serialize)]
pub struct ShippingQuoteRequest {
    pub address_id: AddressId,
    pub items: Vec<ShippingItem>,
    pub shipping_method: String,
}

/// Minimal item projection the shipping service needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ShippingItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Delivery fee quote for a `(address, items, method)` triad.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ShippingQuoteResponse {
    /// Delivery fee in kobo.
    pub shipping_fee_kobo: Money,
    pub total_weight_kg: f64,
}

// =============================================================================
// Coupons
// =============================================================================

/// Coupon validation request against the current subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct CouponRequest {
    pub code: String,
    /// Current subtotal in kobo.
    pub order_amount: Money,
}

/// Result of validating a coupon code.
#[derive(Debug, Clone, Deserialize)]
pub struct CouponValidation {
    pub valid: bool,
    /// Discount in kobo; only meaningful when `valid` is true.
    #[serde(default)]
    pub discount_amount: Money,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Orders and payment
// =============================================================================

/// Order-creation payload.
///
/// Exactly one of `items` (cart checkout) or `quote_id` (B2B quote
/// checkout) is set; `order_type` accompanies `quote_id`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderPayload {
    pub address_id: AddressId,
    pub shipping_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<QuoteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One order line for a cart checkout.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A freshly created order.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OrderCreated {
    pub id: OrderId,
}

/// Payment initialization result.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInit {
    /// External payment provider's hosted page. The provider owns the rest
    /// of the flow after redirect.
    pub authorization_url: String,
}

/// Payment initialization request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PaymentInitRequest {
    pub order_id: OrderId,
}

/// Cart line quantity update request.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartLineUpdate {
    pub line_id: CartLineId,
    pub quantity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_response_decode() {
        let json = r#"{
            "items": [
                {"id": 1, "product_id": 10, "title": "Drum of palm oil",
                 "quantity": 2, "price": 150000}
            ],
            "total_amount": 300000
        }"#;
        let cart: CartResponse = serde_json::from_str(json).unwrap();
        assert_eq!(cart.total_amount, Money::from_minor(300_000));
        assert_eq!(cart.items.len(), 1);
        assert!(cart.items[0].line_total.is_none());
        assert_eq!(cart.items[0].selling_context, SellingContext::B2c);
    }

    #[test]
    fn test_quote_response_decode() {
        let json = r#"{
            "id": 55,
            "status": "APPROVED",
            "items": [
                {"product_id": 10, "title": "Bulk rice", "quantity": 4,
                 "requested_price": 400, "seller_quoted_price": 500}
            ]
        }"#;
        let quote: QuoteResponse = serde_json::from_str(json).unwrap();
        assert_eq!(quote.status, QuoteStatus::Approved);
        assert_eq!(
            quote.items[0].seller_quoted_price,
            Some(Money::from_minor(500))
        );
    }

    #[test]
    fn test_order_payload_omits_unset_fields() {
        let payload = OrderPayload {
            address_id: AddressId::new(3),
            shipping_method: "standard".to_string(),
            coupon_code: None,
            items: Some(vec![OrderItem {
                product_id: ProductId::new(10),
                quantity: 2,
            }]),
            quote_id: None,
            order_type: None,
            business_name: None,
            business_purpose: None,
            notes: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("quote_id").is_none());
        assert!(json.get("coupon_code").is_none());
        assert!(json.get("items").is_some());
    }

    #[test]
    fn test_coupon_validation_defaults() {
        let validation: CouponValidation = serde_json::from_str(r#"{"valid": false}"#).unwrap();
        assert!(!validation.valid);
        assert_eq!(validation.discount_amount, Money::ZERO);
        assert!(validation.message.is_none());
    }
}
