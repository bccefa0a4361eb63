//! Integration tests for the Vendora checkout engine.
//!
//! Every test runs against an in-process `wiremock` server standing in for
//! the commerce API; no external services or credentials are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vendora-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `checkout_cart_flow` - cart-backed end-to-end checkout
//! - `checkout_quote_flow` - quote-backed (B2B) checkout
//! - `checkout_failure_paths` - submission blocking and sequencing
//! - `shipping_staleness` - latest-request-wins quote ordering

use secrecy::SecretString;
use vendora_checkout::api::CommerceClient;
use vendora_checkout::config::CommerceConfig;
use vendora_checkout::session::{CheckoutSession, ContactDetails};
use vendora_core::AddressId;

/// A client pointed at a mock commerce API.
#[must_use]
pub fn client_for(base_url: &str) -> CommerceClient {
    CommerceClient::new(&CommerceConfig {
        base_url: base_url.to_string(),
        api_token: SecretString::from("integration-test-token-123456"),
        shipping_method: "standard".to_string(),
        address_cache_ttl_secs: 60,
    })
}

/// Fill the delivery step with valid contact details and a saved address.
pub fn fill_delivery(session: &mut CheckoutSession, address_id: i64) {
    session.contact = ContactDetails {
        full_name: "Ada Obi".to_string(),
        email: "ada@example.com".to_string(),
        phone: "+2348012345678".to_string(),
    };
    session.select_address(AddressId::new(address_id));
}

/// Canned cart body: one line, quantity 2 at 150,000 kobo, server total
/// 300,000.
#[must_use]
pub fn cart_body() -> serde_json::Value {
    serde_json::json!({
        "items": [
            {"id": 1, "product_id": 10, "title": "Drum of palm oil",
             "quantity": 2, "price": 150_000}
        ],
        "total_amount": 300_000
    })
}

/// Canned approved-quote body with a seller counter-offer.
#[must_use]
pub fn approved_quote_body() -> serde_json::Value {
    serde_json::json!({
        "id": 55,
        "status": "APPROVED",
        "items": [
            {"product_id": 10, "title": "Bulk rice", "quantity": 4,
             "requested_price": 400, "seller_quoted_price": 500}
        ]
    })
}
