//! Domain models for the storefront client.
//!
//! These types represent validated domain objects separate from the raw
//! documents the gateway returns (see `gateway::conversions`).

pub mod cart;
pub mod catalog;
pub mod order;
pub mod user;

pub use cart::{CartItem, CartSummary, MAX_ITEM_QUANTITY};
pub use catalog::{Category, Product, ProductListView};
pub use order::{CheckoutRequest, CreatedOrder, DeliveryDetails, Order, OrderLine, OrderPayload};
pub use user::{TelegramUser, UserProfile};
