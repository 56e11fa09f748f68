//! Core types for tg-store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod notification;
pub mod price;
pub mod status;

pub use id::*;
pub use notification::{Notification, Severity};
pub use price::{CurrencyCode, Price, PriceError};
pub use status::*;
