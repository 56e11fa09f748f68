//! tg-store Core - Shared types library.
//!
//! This crate provides common types used across all tg-store components:
//! - `storefront` - Mini-App client core (cart, catalog, orders, referrals)
//! - `integration-tests` - End-to-end tests against a fake backend
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no gateway access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, statuses, and
//!   user-facing notifications

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
