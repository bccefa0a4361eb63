//! Commerce API client implementation.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::CommerceConfig;

use super::types::{
    AddressRecord, CartLineUpdate, CartResponse, Coordinates, CouponRequest, CouponValidation,
    GeocodeRequest, NewAddress, OrderCreated, OrderPayload, PaymentInit, PaymentInitRequest,
    QuoteResponse, ShippingQuoteRequest, ShippingQuoteResponse,
};
use super::{ApiError, decode_body, decode_error_messages};
use vendora_core::{OrderId, QuoteId};

const ADDRESS_CACHE_KEY: &str = "saved-addresses";

/// Client for the Vendora commerce API.
///
/// Cheaply cloneable via `Arc`. The saved-address list is cached briefly;
/// everything else is mutable remote state and is never cached.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    http: reqwest::Client,
    base_url: String,
    token: String,
    addresses: Cache<String, Vec<AddressRecord>>,
}

impl CommerceClient {
    /// Create a new commerce API client.
    #[must_use]
    pub fn new(config: &CommerceConfig) -> Self {
        let addresses = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(config.address_cache_ttl_secs))
            .build();

        Self {
            inner: Arc::new(CommerceClientInner {
                http: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                token: config.api_token.expose_secret().to_string(),
                addresses,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and decode the response through the envelope boundary.
    ///
    /// Status translation happens here and nowhere else: 401 becomes
    /// `AuthExpired`, 404 becomes `NotFound`, any other non-success status
    /// becomes `Remote` with the server's messages preserved verbatim.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        op: &'static str,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.bearer_auth(&self.inner.token).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::AuthExpired);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(op.to_string()));
        }

        // Body as text first for better error diagnostics
        let text = response.text().await?;

        if !status.is_success() {
            let messages = decode_error_messages(&text);
            tracing::error!(
                operation = op,
                status = %status,
                messages = ?messages,
                "commerce API returned non-success status"
            );
            return Err(ApiError::Remote {
                status: status.as_u16(),
                messages,
            });
        }

        decode_body(&text)
    }

    async fn get<T: DeserializeOwned>(&self, op: &'static str, path: &str) -> Result<T, ApiError> {
        self.dispatch(op, self.inner.http.get(self.url(path))).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        op: &'static str,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.dispatch(op, self.inner.http.post(self.url(path)).json(body))
            .await
    }

    // =========================================================================
    // Checkout sources
    // =========================================================================

    /// Load the buyer's current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response does not match
    /// the cart contract.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<CartResponse, ApiError> {
        self.get("get_cart", "/cart").await
    }

    /// Load a B2B quote by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the quote is not found or the request fails.
    #[instrument(skip(self), fields(quote_id = %quote_id))]
    pub async fn get_quote(&self, quote_id: QuoteId) -> Result<QuoteResponse, ApiError> {
        self.get("get_quote", &format!("/quotes/{quote_id}")).await
    }

    /// Update a cart line quantity; returns the updated cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected or the request fails.
    #[instrument(skip(self), fields(line_id = %update.line_id, quantity = update.quantity))]
    pub async fn update_cart_line(&self, update: &CartLineUpdate) -> Result<CartResponse, ApiError> {
        self.post("update_cart_line", "/cart/update", update).await
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// List the buyer's saved addresses (cached briefly).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_addresses(&self) -> Result<Vec<AddressRecord>, ApiError> {
        if let Some(addresses) = self.inner.addresses.get(ADDRESS_CACHE_KEY).await {
            debug!("cache hit for saved addresses");
            return Ok(addresses);
        }

        let addresses: Vec<AddressRecord> = self.get("list_addresses", "/addresses").await?;
        self.inner
            .addresses
            .insert(ADDRESS_CACHE_KEY.to_string(), addresses.clone())
            .await;
        Ok(addresses)
    }

    /// Create a new saved address and return the created record.
    ///
    /// Invalidates the saved-address cache so the next list reflects the
    /// append. Checkout only ever appends; it never mutates or deletes an
    /// existing saved address.
    ///
    /// # Errors
    ///
    /// Returns an error if creation is rejected or the request fails.
    #[instrument(skip(self, address), fields(city = %address.city, state = %address.state))]
    pub async fn create_address(&self, address: &NewAddress) -> Result<AddressRecord, ApiError> {
        let created: AddressRecord = self.post("create_address", "/addresses", address).await?;
        self.inner.addresses.invalidate(ADDRESS_CACHE_KEY).await;
        Ok(created)
    }

    /// Force-refresh the saved-address list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn refresh_addresses(&self) -> Result<Vec<AddressRecord>, ApiError> {
        self.inner.addresses.invalidate(ADDRESS_CACHE_KEY).await;
        self.list_addresses().await
    }

    /// Geocode free-text address fields. Best-effort: callers treat failure
    /// as non-fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if the geocoder cannot resolve the address or the
    /// request fails.
    #[instrument(skip(self, request))]
    pub async fn geocode(&self, request: &GeocodeRequest) -> Result<Coordinates, ApiError> {
        self.post("geocode", "/geocode", request).await
    }

    // =========================================================================
    // Shipping, coupons
    // =========================================================================

    /// Request a delivery fee for an address + item set + method.
    ///
    /// # Errors
    ///
    /// Returns an error if no quote is available or the request fails.
    #[instrument(skip(self, request), fields(address_id = %request.address_id))]
    pub async fn shipping_quote(
        &self,
        request: &ShippingQuoteRequest,
    ) -> Result<ShippingQuoteResponse, ApiError> {
        self.post("shipping_quote", "/shipping/quote", request).await
    }

    /// Validate a coupon code against an order amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. An invalid coupon is a
    /// successful response with `valid == false`, not an error.
    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn validate_coupon(
        &self,
        request: &CouponRequest,
    ) -> Result<CouponValidation, ApiError> {
        self.post("validate_coupon", "/coupons/validate", request)
            .await
    }

    // =========================================================================
    // Orders and payment
    // =========================================================================

    /// Create an order from a checkout payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is rejected (server messages preserved
    /// verbatim) or the request fails.
    #[instrument(skip(self, payload), fields(address_id = %payload.address_id))]
    pub async fn create_order(&self, payload: &OrderPayload) -> Result<OrderCreated, ApiError> {
        self.post("create_order", "/orders", payload).await
    }

    /// Initialize payment for a created order; yields the external
    /// authorization URL.
    ///
    /// # Errors
    ///
    /// Returns an error if payment cannot be started or the request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn initialize_payment(&self, order_id: OrderId) -> Result<PaymentInit, ApiError> {
        self.post(
            "initialize_payment",
            "/payments/initialize",
            &PaymentInitRequest { order_id },
        )
        .await
    }
}
