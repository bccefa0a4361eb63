//! Vendora Checkout - checkout orchestration and price resolution.
//!
//! This crate turns a shopping cart or an approved B2B quote into a paid
//! order. It is a thin, strongly-typed layer over the remote Vendora
//! commerce API: all catalog, order, and payment state lives remotely, and
//! everything here is session-scoped.
//!
//! # Architecture
//!
//! - [`api`] is the only module that talks HTTP or knows the wire shapes.
//!   Every response is decoded exactly once into typed structs; nothing
//!   above it branches on response shape.
//! - [`session::CheckoutSession`] owns the wizard state: a strictly linear
//!   three-step flow (Summary, Delivery, Confirmation) whose forward
//!   transitions gate on validation.
//! - [`submit`] sequences the dependent remote calls of final submission:
//!   address resolution, shipping quote, order creation, payment
//!   initialization, external redirect hand-off.
//!
//! # Example
//!
//! ```rust,ignore
//! use vendora_checkout::api::CommerceClient;
//! use vendora_checkout::config::CommerceConfig;
//! use vendora_checkout::session::CheckoutSession;
//! use vendora_checkout::shipping::ShippingQuoteClient;
//!
//! let config = CommerceConfig::from_env()?;
//! let client = CommerceClient::new(&config);
//! let shipping = ShippingQuoteClient::new(client.clone(), config.shipping_method.clone());
//!
//! let cart = client.get_cart().await?;
//! let mut session = CheckoutSession::from_cart(cart)?;
//!
//! session.advance()?; // Summary -> Delivery
//! // ... collect contact + address, refresh shipping, apply coupon ...
//! session.advance()?; // Delivery -> Confirmation (validated)
//! let redirect = vendora_checkout::submit::submit(&mut session, &client, &shipping).await?;
//! // hand redirect.authorization_url to the browser
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod api;
pub mod cart;
pub mod config;
pub mod coupon;
pub mod error;
pub mod pricing;
pub mod session;
pub mod shipping;
pub mod submit;

pub use error::{CheckoutError, Result};
