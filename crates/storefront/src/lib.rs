//! tg-store storefront client core.
//!
//! State containers behind the Telegram Mini-App: cart, catalog, checkout,
//! order history and referrals, synced against a remote document store and
//! an order-creation endpoint.
//!
//! # Architecture
//!
//! - [`state::AppState`] owns every store, the notification channel and the
//!   session; there are no global singletons
//! - Stores reach the backend only through the [`gateway::DocumentStore`]
//!   and [`gateway::OrderApi`] traits
//! - Each operation runs remote-first and reports failures through both its
//!   `Result` and the store's error flag plus a one-shot notification

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod notifications;
pub mod state;
pub mod stores;
pub mod telemetry;
