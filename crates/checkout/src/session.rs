//! Checkout session and wizard step machine.
//!
//! A [`CheckoutSession`] is created when the checkout view mounts, is
//! exclusively owned by that one view instance, and is discarded on
//! navigation away or successful submission. Nothing here is persisted.
//!
//! The wizard is strictly linear forward (Summary → Delivery →
//! Confirmation) and freely backward. The only gated transition is
//! Delivery → Confirmation, which validates contact fields, the address
//! choice, and - when any line item is B2B - business metadata. A gate
//! failure keeps the step where it is and surfaces one human-readable
//! error; it never silently advances.

use tracing::instrument;
use vendora_core::{Email, Money, Phone, QuoteId};

use crate::address::{AddressChoice, DraftAddress};
use crate::api::types::{CartResponse, QuoteResponse};
use crate::api::CommerceClient;
use crate::coupon::{self, CouponState};
use crate::error::{CheckoutError, Result};
use crate::pricing::{self, CheckoutSource, PricedItems};
use crate::shipping::{ShippingQuoteClient, ShippingState};

/// Wizard steps, strictly ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Summary,
    Delivery,
    Confirmation,
}

impl Step {
    /// 1-based step number as shown to the user.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Summary => 1,
            Self::Delivery => 2,
            Self::Confirmation => 3,
        }
    }
}

/// Buyer contact fields, entered at the delivery step.
///
/// Held as raw strings so a failed validation leaves the user's input
/// intact; parsing into [`Email`]/[`Phone`] happens at the gate.
#[derive(Debug, Clone, Default)]
pub struct ContactDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// Business metadata, required when any line item is B2B.
#[derive(Debug, Clone, Default)]
pub struct BusinessMeta {
    pub name: String,
    pub purpose: String,
}

impl BusinessMeta {
    fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.purpose.trim().is_empty()
    }
}

/// Submission lifecycle. The submit action is disabled while `InFlight`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight,
    /// Submission failed; the user's inputs are intact and they may retry.
    Failed(String),
    /// Hand-off to the external payment page is underway.
    Redirecting,
}

/// The checkout session aggregate.
#[derive(Debug)]
pub struct CheckoutSession {
    pub(crate) source: CheckoutSource,
    pub(crate) priced: PricedItems,
    step: Step,
    pub contact: ContactDetails,
    pub(crate) address: Option<AddressChoice>,
    pub notes: Option<String>,
    pub(crate) business: Option<BusinessMeta>,
    pub(crate) coupon: CouponState,
    pub(crate) shipping: ShippingState,
    pub(crate) submission: SubmissionState,
}

impl CheckoutSession {
    fn new(source: CheckoutSource) -> Result<Self> {
        let priced = pricing::resolve(&source)?;
        Ok(Self {
            source,
            priced,
            step: Step::Summary,
            contact: ContactDetails::default(),
            address: None,
            notes: None,
            business: None,
            coupon: CouponState::default(),
            shipping: ShippingState::default(),
            submission: SubmissionState::default(),
        })
    }

    /// Start a session backed by the buyer's cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SourceUnusable`] for an empty cart.
    pub fn from_cart(cart: CartResponse) -> Result<Self> {
        Self::new(cart.into())
    }

    /// Start a session backed by a B2B quote.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SourceUnusable`] unless the quote is
    /// approved; the actual status is included in the message.
    pub fn from_quote(quote: QuoteResponse) -> Result<Self> {
        Self::new(quote.into())
    }

    /// Replace the backing source (e.g. the cart changed underneath).
    ///
    /// An applied coupon was validated against the old subtotal and is
    /// cleared; the shipping quote is keyed on the old item set and is
    /// cleared too.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SourceUnusable`] if the new source cannot
    /// back a session. The session is left unchanged in that case.
    pub fn replace_source(&mut self, source: impl Into<CheckoutSource>) -> Result<()> {
        let source = source.into();
        let priced = pricing::resolve(&source)?;
        self.source = source;
        self.priced = priced;
        self.coupon.clear();
        self.shipping.clear();
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The current wizard step.
    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Resolved line items and subtotal.
    #[must_use]
    pub const fn priced(&self) -> &PricedItems {
        &self.priced
    }

    /// Subtotal before discount and shipping.
    #[must_use]
    pub const fn subtotal(&self) -> Money {
        self.priced.subtotal
    }

    /// Shipping state (quote, staleness, blocking error).
    #[must_use]
    pub const fn shipping(&self) -> &ShippingState {
        &self.shipping
    }

    /// Coupon state.
    #[must_use]
    pub const fn coupon(&self) -> &CouponState {
        &self.coupon
    }

    /// Submission lifecycle state.
    #[must_use]
    pub const fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    /// The delivery address choice, if one has been made.
    #[must_use]
    pub const fn address(&self) -> Option<&AddressChoice> {
        self.address.as_ref()
    }

    /// The backing quote id, for a quote-backed session.
    #[must_use]
    pub const fn quote_id(&self) -> Option<QuoteId> {
        match self.source {
            CheckoutSource::Quote { id, .. } => Some(id),
            CheckoutSource::Cart { .. } => None,
        }
    }

    /// Order total: subtotal − discount + shipping fee.
    #[must_use]
    pub fn total(&self) -> Money {
        self.priced
            .subtotal
            .saturating_sub(self.coupon.discount())
            .saturating_add(self.shipping.fee())
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Select a saved delivery address.
    pub fn select_address(&mut self, id: vendora_core::AddressId) {
        self.address = Some(AddressChoice::Selected(id));
    }

    /// Use a draft address entered during checkout.
    pub fn use_draft_address(&mut self, draft: DraftAddress) {
        self.address = Some(AddressChoice::Draft(draft));
    }

    /// Set business metadata (required for B2B line items).
    pub fn set_business_meta(&mut self, meta: BusinessMeta) {
        self.business = Some(meta);
    }

    // =========================================================================
    // Step machine
    // =========================================================================

    /// Move one step forward.
    ///
    /// Summary → Delivery is unconditional (the summary is read-only);
    /// Delivery → Confirmation runs the delivery gate.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] if the gate fails or the
    /// session is already at the final step; the step does not change.
    #[instrument(skip(self), fields(step = self.step.number()))]
    pub fn advance(&mut self) -> Result<()> {
        match self.step {
            Step::Summary => {
                self.step = Step::Delivery;
                Ok(())
            }
            Step::Delivery => {
                self.validate_delivery()?;
                self.step = Step::Confirmation;
                Ok(())
            }
            Step::Confirmation => Err(CheckoutError::Validation(
                "already at the final step".to_string(),
            )),
        }
    }

    /// Move one step backward. Never validates; a no-op at the first step.
    pub fn back(&mut self) {
        self.step = match self.step {
            Step::Confirmation => Step::Delivery,
            Step::Delivery | Step::Summary => Step::Summary,
        };
    }

    /// The delivery gate: contact fields, address completeness, and
    /// business metadata when the item set requires it.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] with a single human-readable
    /// message for the first failing check.
    pub fn validate_delivery(&self) -> Result<()> {
        if self.contact.full_name.trim().is_empty() {
            return Err(CheckoutError::Validation("full name is required".to_string()));
        }
        Email::parse(self.contact.email.trim())
            .map_err(|e| CheckoutError::Validation(e.to_string()))?;
        Phone::parse(&self.contact.phone).map_err(|e| CheckoutError::Validation(e.to_string()))?;

        match &self.address {
            None => {
                return Err(CheckoutError::Validation(
                    "select or enter a delivery address".to_string(),
                ));
            }
            Some(AddressChoice::Draft(draft)) => draft.validate()?,
            Some(AddressChoice::Selected(_)) => {}
        }

        if self.priced.requires_business_metadata()
            && !self.business.as_ref().is_some_and(BusinessMeta::is_complete)
        {
            return Err(CheckoutError::Validation(
                "business name and purpose are required for business orders".to_string(),
            ));
        }

        Ok(())
    }

    // =========================================================================
    // Shipping and coupon orchestration
    // =========================================================================

    /// Recompute the shipping quote if the `(address, items, method)` triad
    /// changed since the last applied quote. Runs regardless of which step
    /// is visible.
    pub async fn refresh_shipping(&mut self, shipping: &ShippingQuoteClient) {
        let address_id = self.address.as_ref().and_then(AddressChoice::selected_id);
        let key = shipping.key(address_id, self.priced.shipping_items());
        if !self.shipping.is_stale(&key) {
            return;
        }
        let outcome = shipping.quote(key.address_id, key.items.clone()).await;
        self.shipping.apply(key, outcome);
    }

    /// Validate and apply a coupon code against the current subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] for a blank or rejected code
    /// (the coupon state is reset first), or a translated API error.
    pub async fn apply_coupon(&mut self, client: &CommerceClient, code: &str) -> Result<()> {
        coupon::apply(client, &mut self.coupon, code, self.priced.subtotal)
            .await
            .map_err(Into::into)
    }

    /// Remove the applied coupon.
    pub fn clear_coupon(&mut self) {
        self.coupon.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::types::{CartItem, QuoteItem};
    use crate::shipping::{ShippingOutcome, ShippingQuote};
    use vendora_core::{AddressId, CartLineId, ProductId, QuoteStatus, SellingContext};

    fn cart(quantity: u32, unit_kobo: i64, total_kobo: i64) -> CartResponse {
        CartResponse {
            items: vec![CartItem {
                id: CartLineId::new(1),
                product_id: ProductId::new(10),
                title: "Drum of palm oil".to_string(),
                quantity,
                price: Money::from_minor(unit_kobo),
                line_total: None,
                selling_context: SellingContext::B2c,
            }],
            total_amount: Money::from_minor(total_kobo),
        }
    }

    fn session_at_delivery() -> CheckoutSession {
        let mut session = CheckoutSession::from_cart(cart(2, 150_000, 300_000)).unwrap();
        session.advance().unwrap();
        session
    }

    fn fill_valid_delivery(session: &mut CheckoutSession) {
        session.contact = ContactDetails {
            full_name: "Ada Obi".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+2348012345678".to_string(),
        };
        session.select_address(AddressId::new(3));
    }

    fn apply_fee(session: &mut CheckoutSession, fee: i64) {
        let key = crate::shipping::ShippingKey {
            address_id: Some(AddressId::new(3)),
            items: session.priced.shipping_items(),
            method: "standard".to_string(),
        };
        session.shipping.apply(
            key,
            ShippingOutcome::Quoted(ShippingQuote {
                fee: Money::from_minor(fee),
                total_weight_kg: 4.0,
            }),
        );
    }

    #[test]
    fn test_summary_to_delivery_is_unconditional() {
        let mut session = CheckoutSession::from_cart(cart(1, 1000, 1000)).unwrap();
        assert_eq!(session.step(), Step::Summary);
        session.advance().unwrap();
        assert_eq!(session.step(), Step::Delivery);
    }

    #[test]
    fn test_invalid_phone_blocks_delivery_gate() {
        let mut session = session_at_delivery();
        fill_valid_delivery(&mut session);
        session.contact.phone = "12345".to_string();

        let err = session.advance().unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
        assert_eq!(session.step(), Step::Delivery);
    }

    #[test]
    fn test_valid_delivery_advances_to_confirmation() {
        let mut session = session_at_delivery();
        fill_valid_delivery(&mut session);
        session.advance().unwrap();
        assert_eq!(session.step(), Step::Confirmation);
    }

    #[test]
    fn test_draft_with_empty_city_blocks_gate() {
        let mut session = session_at_delivery();
        fill_valid_delivery(&mut session);
        session.use_draft_address(DraftAddress {
            label: "Home".to_string(),
            line1: "14 Adeola Odeku St".to_string(),
            city: String::new(),
            state: "Lagos".to_string(),
            country: "NG".to_string(),
            ..DraftAddress::default()
        });

        let err = session.advance().unwrap_err();
        assert!(err.to_string().contains("city"));
        assert_eq!(session.step(), Step::Delivery);
    }

    #[test]
    fn test_backward_transitions_never_validate() {
        let mut session = session_at_delivery();
        // Contact is empty and would fail any gate.
        session.back();
        assert_eq!(session.step(), Step::Summary);
        session.back(); // no-op at the first step
        assert_eq!(session.step(), Step::Summary);
    }

    #[test]
    fn test_b2b_items_require_business_metadata() {
        let quote = QuoteResponse {
            id: QuoteId::new(55),
            status: QuoteStatus::Approved,
            items: vec![QuoteItem {
                product_id: ProductId::new(10),
                title: "Bulk rice".to_string(),
                quantity: 4,
                requested_price: Money::from_minor(400),
                seller_quoted_price: Some(Money::from_minor(500)),
            }],
        };
        let mut session = CheckoutSession::from_quote(quote).unwrap();
        session.advance().unwrap();
        fill_valid_delivery(&mut session);

        let err = session.advance().unwrap_err();
        assert!(err.to_string().contains("business"));

        session.set_business_meta(BusinessMeta {
            name: "Obi Trading Ltd".to_string(),
            purpose: "Restaurant resupply".to_string(),
        });
        session.advance().unwrap();
        assert_eq!(session.step(), Step::Confirmation);
    }

    #[test]
    fn test_rejected_quote_is_source_unusable() {
        let quote = QuoteResponse {
            id: QuoteId::new(55),
            status: QuoteStatus::Rejected,
            items: vec![],
        };
        let err = CheckoutSession::from_quote(quote).unwrap_err();
        assert!(matches!(err, CheckoutError::SourceUnusable(_)));
        assert!(err.to_string().contains("REJECTED"));
    }

    #[test]
    fn test_total_without_coupon() {
        // 2 x 150000 subtotal, 50000 shipping -> 350000.
        let mut session = session_at_delivery();
        fill_valid_delivery(&mut session);
        apply_fee(&mut session, 50_000);
        assert_eq!(session.total(), Money::from_minor(350_000));
    }

    #[test]
    fn test_quote_subtotal_uses_seller_prices() {
        let quote = QuoteResponse {
            id: QuoteId::new(55),
            status: QuoteStatus::Approved,
            items: vec![QuoteItem {
                product_id: ProductId::new(10),
                title: "Bulk rice".to_string(),
                quantity: 2,
                requested_price: Money::from_minor(400),
                seller_quoted_price: Some(Money::from_minor(500)),
            }],
        };
        let session = CheckoutSession::from_quote(quote).unwrap();
        assert_eq!(session.subtotal(), Money::from_minor(1_000));
        assert_eq!(session.quote_id(), Some(QuoteId::new(55)));
    }

    #[test]
    fn test_replace_source_clears_coupon_and_shipping() {
        let mut session = session_at_delivery();
        fill_valid_delivery(&mut session);
        apply_fee(&mut session, 50_000);
        assert_eq!(session.shipping().fee(), Money::from_minor(50_000));

        session.replace_source(cart(3, 150_000, 450_000)).unwrap();
        assert_eq!(session.subtotal(), Money::from_minor(450_000));
        assert!(!session.coupon().applied());
        assert_eq!(session.shipping().fee(), Money::ZERO);
    }

    #[test]
    fn test_replace_source_with_empty_cart_fails_and_keeps_session() {
        let mut session = session_at_delivery();
        let empty = CartResponse {
            items: vec![],
            total_amount: Money::ZERO,
        };
        let err = session.replace_source(empty).unwrap_err();
        assert!(matches!(err, CheckoutError::SourceUnusable(_)));
        assert_eq!(session.subtotal(), Money::from_minor(300_000));
    }

    #[test]
    fn test_advance_past_confirmation_fails() {
        let mut session = session_at_delivery();
        fill_valid_delivery(&mut session);
        session.advance().unwrap();
        assert!(session.advance().is_err());
        assert_eq!(session.step(), Step::Confirmation);
    }
}
