//! Vendora Core - Shared types library.
//!
//! This crate provides common types used across all Vendora components:
//! - `checkout` - Checkout orchestration and price resolution engine
//! - the storefront and back-office views that sit on top of it
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. All
//! monetary arithmetic happens in integer minor units (kobo); formatting
//! into a human-readable amount is strictly a presentation concern and
//! lives on [`types::Money`]'s `Display` impl.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, contact fields,
//!   and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
