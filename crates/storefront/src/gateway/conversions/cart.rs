//! Cart record conversions.
//!
//! A cart record carries `userId`, `productId`, `name`, `price`, `image` and
//! `quantity`. Older records copied the whole product document, so the
//! product id may live under `id` instead of `productId`.

use serde_json::{Value, json};

use tg_store_core::{ProductId, UserId};

use super::{non_empty_string, price_or_zero, string_list, string_or, u32_or};
use crate::gateway::{Document, Fields};
use crate::models::{CartItem, MAX_ITEM_QUANTITY, Product};

/// Convert a `carts` document into a cart line.
pub fn convert_cart_item(doc: &Document) -> CartItem {
    let product_id = non_empty_string(doc.field("productId"))
        .or_else(|| non_empty_string(doc.field("id")))
        .unwrap_or_default();

    CartItem {
        id: doc.id.clone(),
        product_id: ProductId::new(product_id),
        name: string_or(doc.field("name"), "Unknown Product"),
        price: price_or_zero(doc.field("price")),
        image: string_list(doc.field("image")),
        quantity: u32_or(doc.field("quantity"), 1).clamp(1, MAX_ITEM_QUANTITY),
    }
}

/// Fields of a new cart record for `product`, quantity 1.
pub fn cart_record_fields(user_id: &UserId, product: &Product) -> Fields {
    let mut fields = Fields::new();
    fields.insert("userId".into(), Value::String(user_id.to_string()));
    fields.insert("productId".into(), Value::String(product.id.to_string()));
    fields.insert("name".into(), Value::String(product.name.clone()));
    fields.insert("price".into(), json!(product.price));
    fields.insert("image".into(), json!(product.image));
    fields.insert("quantity".into(), json!(1));
    fields
}

/// Partial update setting only `quantity`.
pub fn quantity_fields(quantity: u32) -> Fields {
    let mut fields = Fields::new();
    fields.insert("quantity".into(), json!(quantity));
    fields
}
