//! Product and category conversions.

use tg_store_core::{CategoryId, ProductId};

use super::{non_empty_string, price_or_zero, string_list, string_or, u32_or};
use crate::gateway::Document;
use crate::models::{Category, Product};

/// Convert a `products` document.
pub fn convert_product(doc: &Document) -> Product {
    Product {
        id: ProductId::new(doc.id.as_str()),
        name: string_or(doc.field("name"), "Unknown Product"),
        price: price_or_zero(doc.field("price")),
        image: string_list(doc.field("image")),
        quantity: u32_or(doc.field("quantity"), 0),
        description: non_empty_string(doc.field("description")),
        category: non_empty_string(doc.field("category")).map(CategoryId::new),
    }
}

/// Convert a `categories` document.
pub fn convert_category(doc: &Document) -> Category {
    Category {
        id: CategoryId::new(doc.id.as_str()),
        name: string_or(doc.field("name"), "Uncategorized"),
    }
}
