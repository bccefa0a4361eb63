//! Two-phase optimistic cart editing.
//!
//! A quantity edit is applied to the local snapshot immediately so the
//! view can render it, then confirmed against the server. The rollback
//! contract: if the remote update fails for any reason, the editor
//! restores the exact pre-edit snapshot before returning the error, so
//! the local cart never drifts from the server's.
//!
//! Local totals in the optimistic window are estimates only; once the
//! server confirms, its cart (including its authoritative total) replaces
//! the local state wholesale.

use thiserror::Error;
use tracing::instrument;
use vendora_core::CartLineId;

use crate::api::types::{CartLineUpdate, CartResponse};
use crate::api::{ApiError, CommerceClient};

/// Errors from a cart edit. In every case the local cart has already been
/// rolled back to its pre-edit state.
#[derive(Debug, Error)]
pub enum CartEditError {
    /// The line id is not in the local cart; nothing was changed.
    #[error("cart line {0} not found")]
    UnknownLine(CartLineId),

    /// A quantity of zero is a removal, which goes through a different
    /// flow; nothing was changed.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// The server rejected the update; the snapshot was restored.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Local working copy of the buyer's cart with confirmed-edit semantics.
#[derive(Clone)]
pub struct CartEditor {
    client: CommerceClient,
    cart: CartResponse,
}

impl CartEditor {
    /// Wrap a freshly loaded cart.
    #[must_use]
    pub const fn new(client: CommerceClient, cart: CartResponse) -> Self {
        Self { client, cart }
    }

    /// Load the cart from the server and wrap it.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be loaded.
    pub async fn load(client: CommerceClient) -> Result<Self, ApiError> {
        let cart = client.get_cart().await?;
        Ok(Self { client, cart })
    }

    /// The current local cart.
    #[must_use]
    pub const fn cart(&self) -> &CartResponse {
        &self.cart
    }

    /// Hand the cart out, consuming the editor (e.g. to back a session).
    #[must_use]
    pub fn into_cart(self) -> CartResponse {
        self.cart
    }

    /// Set the quantity of a cart line.
    ///
    /// Applies the edit locally, confirms it with the server, and replaces
    /// the local cart with the server's confirmed version. On any failure
    /// the pre-edit snapshot is restored before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CartEditError::UnknownLine`] or
    /// [`CartEditError::ZeroQuantity`] without touching the cart, or
    /// [`CartEditError::Api`] after rolling back.
    #[instrument(skip(self), fields(line_id = %line_id, quantity))]
    pub async fn set_quantity(
        &mut self,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<(), CartEditError> {
        if quantity == 0 {
            return Err(CartEditError::ZeroQuantity);
        }
        if !self.cart.items.iter().any(|item| item.id == line_id) {
            return Err(CartEditError::UnknownLine(line_id));
        }

        let snapshot = self.cart.clone();
        self.apply_local(line_id, quantity);

        match self
            .client
            .update_cart_line(&CartLineUpdate { line_id, quantity })
            .await
        {
            Ok(confirmed) => {
                self.cart = confirmed;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, %line_id, "cart update rejected, rolling back");
                self.cart = snapshot;
                Err(CartEditError::Api(e))
            }
        }
    }

    /// Discard local state and reload the cart from the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the reload fails; the local cart is unchanged.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        self.cart = self.client.get_cart().await?;
        Ok(())
    }

    fn apply_local(&mut self, line_id: CartLineId, quantity: u32) {
        for item in &mut self.cart.items {
            if item.id == line_id {
                item.quantity = quantity;
                // Estimate for display; the confirmed cart overwrites it.
                item.line_total = item.price.checked_mul(quantity);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::types::CartItem;
    use crate::config::CommerceConfig;
    use secrecy::SecretString;
    use vendora_core::{Money, ProductId, SellingContext};

    fn unreachable_client() -> CommerceClient {
        CommerceClient::new(&CommerceConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_token: SecretString::from("test-token-abcdef123456"),
            shipping_method: "standard".to_string(),
            address_cache_ttl_secs: 60,
        })
    }

    fn cart() -> CartResponse {
        CartResponse {
            items: vec![CartItem {
                id: CartLineId::new(1),
                product_id: ProductId::new(10),
                title: "Drum of palm oil".to_string(),
                quantity: 2,
                price: Money::from_minor(150_000),
                line_total: Some(Money::from_minor(300_000)),
                selling_context: SellingContext::B2c,
            }],
            total_amount: Money::from_minor(300_000),
        }
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_locally() {
        let mut editor = CartEditor::new(unreachable_client(), cart());
        let err = editor.set_quantity(CartLineId::new(1), 0).await.unwrap_err();
        assert!(matches!(err, CartEditError::ZeroQuantity));
        assert_eq!(editor.cart().items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_unknown_line_rejected_locally() {
        let mut editor = CartEditor::new(unreachable_client(), cart());
        let err = editor.set_quantity(CartLineId::new(99), 3).await.unwrap_err();
        assert!(matches!(err, CartEditError::UnknownLine(_)));
    }

    #[tokio::test]
    async fn test_remote_failure_restores_snapshot() {
        // The unreachable client guarantees the confirm step fails.
        let mut editor = CartEditor::new(unreachable_client(), cart());
        let err = editor.set_quantity(CartLineId::new(1), 5).await.unwrap_err();
        assert!(matches!(err, CartEditError::Api(_)));

        // Rollback contract: the pre-edit snapshot is back, estimate and all.
        assert_eq!(editor.cart().items[0].quantity, 2);
        assert_eq!(
            editor.cart().items[0].line_total,
            Some(Money::from_minor(300_000))
        );
        assert_eq!(editor.cart().total_amount, Money::from_minor(300_000));
    }
}
