//! Final submission: order creation and payment initialization.
//!
//! The five submission steps are strictly sequential because each request
//! body needs the previous step's result: re-validate → resolve address →
//! confirm shipping → create order → initialize payment. Nothing here
//! retries automatically; every retry is the user resubmitting. A failure
//! leaves the session's entered state intact.
//!
//! An order whose payment initialization fails is left created-but-unpaid;
//! the order id is surfaced in the error for reconciliation, and a
//! resubmission creates a fresh order.

use tracing::instrument;
use vendora_core::{AddressId, OrderId};

use crate::address;
use crate::api::types::{OrderItem, OrderPayload};
use crate::api::CommerceClient;
use crate::error::{CheckoutError, Result};
use crate::pricing::CheckoutSource;
use crate::session::{CheckoutSession, Step, SubmissionState};
use crate::shipping::ShippingQuoteClient;

/// Successful submission hand-off: the browser is redirected to the
/// external payment page, which owns the remainder of the flow.
#[derive(Debug, Clone)]
pub struct PaymentRedirect {
    pub order_id: OrderId,
    pub authorization_url: String,
}

/// Submit the session: create the order and initialize payment.
///
/// Only available from the confirmation step, and refused while another
/// submission is in flight. On failure the session transitions to
/// [`SubmissionState::Failed`] with the user's inputs untouched.
///
/// # Errors
///
/// Any [`CheckoutError`] kind from the taxonomy; notably
/// [`CheckoutError::ShippingUnavailable`] blocks order creation outright,
/// and [`CheckoutError::PaymentInitFailed`] means an unpaid order exists.
#[instrument(skip(session, client, shipping))]
pub async fn submit(
    session: &mut CheckoutSession,
    client: &CommerceClient,
    shipping: &ShippingQuoteClient,
) -> Result<PaymentRedirect> {
    if session.submission == SubmissionState::InFlight {
        return Err(CheckoutError::Validation(
            "a submission is already in progress".to_string(),
        ));
    }
    session.submission = SubmissionState::InFlight;

    match run(session, client, shipping).await {
        Ok(redirect) => {
            session.submission = SubmissionState::Redirecting;
            Ok(redirect)
        }
        Err(e) => {
            session.submission = SubmissionState::Failed(e.to_string());
            Err(e)
        }
    }
}

async fn run(
    session: &mut CheckoutSession,
    client: &CommerceClient,
    shipping: &ShippingQuoteClient,
) -> Result<PaymentRedirect> {
    // Defense in depth: a stale session must not bypass the wizard gate.
    if session.step() != Step::Confirmation {
        return Err(CheckoutError::Validation(
            "submission is only available from the confirmation step".to_string(),
        ));
    }
    session.validate_delivery()?;

    // A tracked shipping failure blocks submission before any remote call.
    if let Some(message) = session.shipping.blocking_error() {
        return Err(CheckoutError::ShippingUnavailable(message.to_string()));
    }

    // Address resolution happens here, exactly once, so wizard navigation
    // never creates duplicate addresses.
    let choice = session
        .address
        .clone()
        .ok_or_else(|| CheckoutError::Validation("select or enter a delivery address".to_string()))?;
    let address_id = address::resolve(client, &choice).await?;

    // A draft address could not be quoted earlier; make sure a current
    // quote exists for the resolved id before committing to an order.
    let key = shipping.key(Some(address_id), session.priced.shipping_items());
    if session.shipping.is_stale(&key) || session.shipping.quote().is_none() {
        let outcome = shipping.quote(Some(address_id), key.items.clone()).await;
        session.shipping.apply(key, outcome);
    }
    if session.shipping.quote().is_none() {
        let message = session
            .shipping
            .blocking_error()
            .unwrap_or("no delivery quote is available for this address")
            .to_string();
        return Err(CheckoutError::ShippingUnavailable(message));
    }

    let payload = build_payload(session, address_id, shipping.method());

    let order = client.create_order(&payload).await.map_err(CheckoutError::from)?;

    let payment = client
        .initialize_payment(order.id)
        .await
        .map_err(|e| CheckoutError::PaymentInitFailed {
            order_id: order.id,
            message: e.to_string(),
        })?;

    Ok(PaymentRedirect {
        order_id: order.id,
        authorization_url: payment.authorization_url,
    })
}

fn build_payload(session: &CheckoutSession, address_id: AddressId, method: &str) -> OrderPayload {
    let (items, quote_id, order_type) = match &session.source {
        CheckoutSource::Cart { .. } => {
            let items = session
                .priced
                .items
                .iter()
                .map(|item| OrderItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect();
            (Some(items), None, None)
        }
        CheckoutSource::Quote { id, .. } => (None, Some(*id), Some("B2B".to_string())),
    };

    let business = session
        .priced
        .requires_business_metadata()
        .then(|| session.business.clone())
        .flatten();

    OrderPayload {
        address_id,
        shipping_method: method.to_string(),
        coupon_code: session.coupon.code().map(ToString::to_string),
        items,
        quote_id,
        order_type,
        business_name: business.as_ref().map(|b| b.name.clone()),
        business_purpose: business.map(|b| b.purpose),
        notes: session.notes.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::types::{CartItem, CartResponse, QuoteItem, QuoteResponse};
    use crate::config::CommerceConfig;
    use crate::session::{BusinessMeta, ContactDetails};
    use secrecy::SecretString;
    use vendora_core::{CartLineId, Money, ProductId, QuoteId, QuoteStatus, SellingContext};

    fn unreachable_client() -> CommerceClient {
        CommerceClient::new(&CommerceConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_token: SecretString::from("test-token-abcdef123456"),
            shipping_method: "standard".to_string(),
            address_cache_ttl_secs: 60,
        })
    }

    fn cart_session() -> CheckoutSession {
        CheckoutSession::from_cart(CartResponse {
            items: vec![CartItem {
                id: CartLineId::new(1),
                product_id: ProductId::new(10),
                title: "Drum of palm oil".to_string(),
                quantity: 2,
                price: Money::from_minor(150_000),
                line_total: None,
                selling_context: SellingContext::B2c,
            }],
            total_amount: Money::from_minor(300_000),
        })
        .unwrap()
    }

    fn valid_contact() -> ContactDetails {
        ContactDetails {
            full_name: "Ada Obi".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+2348012345678".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_refused_off_confirmation_step() {
        let client = unreachable_client();
        let shipping = ShippingQuoteClient::new(client.clone(), "standard");
        let mut session = cart_session();

        let err = submit(&mut session, &client, &shipping).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
        assert!(matches!(session.submission(), SubmissionState::Failed(_)));
    }

    #[tokio::test]
    async fn test_double_submit_refused() {
        let client = unreachable_client();
        let shipping = ShippingQuoteClient::new(client.clone(), "standard");
        let mut session = cart_session();
        session.submission = SubmissionState::InFlight;

        let err = submit(&mut session, &client, &shipping).await.unwrap_err();
        assert!(err.to_string().contains("already in progress"));
        // The in-flight submission's state is not clobbered.
        assert_eq!(*session.submission(), SubmissionState::InFlight);
    }

    #[test]
    fn test_cart_payload_carries_items() {
        let mut session = cart_session();
        session.contact = valid_contact();
        let payload = build_payload(&session, vendora_core::AddressId::new(3), "standard");

        assert_eq!(payload.items.as_ref().map(Vec::len), Some(1));
        assert!(payload.quote_id.is_none());
        assert!(payload.order_type.is_none());
        assert!(payload.business_name.is_none());
    }

    #[test]
    fn test_quote_payload_carries_quote_id_and_business_meta() {
        let mut session = CheckoutSession::from_quote(QuoteResponse {
            id: QuoteId::new(55),
            status: QuoteStatus::Approved,
            items: vec![QuoteItem {
                product_id: ProductId::new(10),
                title: "Bulk rice".to_string(),
                quantity: 4,
                requested_price: Money::from_minor(400),
                seller_quoted_price: Some(Money::from_minor(500)),
            }],
        })
        .unwrap();
        session.set_business_meta(BusinessMeta {
            name: "Obi Trading Ltd".to_string(),
            purpose: "Restaurant resupply".to_string(),
        });

        let payload = build_payload(&session, vendora_core::AddressId::new(3), "standard");
        assert!(payload.items.is_none());
        assert_eq!(payload.quote_id, Some(QuoteId::new(55)));
        assert_eq!(payload.order_type.as_deref(), Some("B2B"));
        assert_eq!(payload.business_name.as_deref(), Some("Obi Trading Ltd"));
    }
}
