//! Cart domain types.

use serde::{Deserialize, Serialize};

use tg_store_core::{Price, ProductId, RecordId};

/// Upper bound on a single line's quantity.
pub const MAX_ITEM_QUANTITY: u32 = 100;

/// One line in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Gateway-assigned record id for this line.
    pub id: RecordId,
    /// Catalog product this line refers to.
    pub product_id: ProductId,
    pub name: String,
    /// Unit price at the time the item was added.
    pub price: Price,
    /// Image URLs, first one is the thumbnail.
    pub image: Vec<String>,
    /// Always within `1..=MAX_ITEM_QUANTITY`.
    pub quantity: u32,
}

impl CartItem {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// First image URL, if any.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.image.first().map(String::as_str)
    }
}

/// Totals shown in the order summary and the cart badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub total_price: Price,
    pub total_quantity: u32,
    pub line_count: usize,
}

impl CartSummary {
    /// Summarize a set of cart lines.
    #[must_use]
    pub fn of(items: &[CartItem]) -> Self {
        Self {
            total_price: items.iter().map(CartItem::line_total).sum(),
            total_quantity: items.iter().map(|item| item.quantity).sum(),
            line_count: items.len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(id: &str, minor: i64, quantity: u32) -> CartItem {
        CartItem {
            id: RecordId::new(id),
            product_id: ProductId::new(format!("p-{id}")),
            name: format!("Item {id}"),
            price: Price::from_minor(minor).unwrap(),
            image: vec![],
            quantity,
        }
    }

    #[test]
    fn test_summary_totals() {
        let items = vec![item("a", 1000, 3), item("b", 250, 2)];
        let summary = CartSummary::of(&items);
        assert_eq!(summary.total_price.amount(), Decimal::new(3500, 2));
        assert_eq!(summary.total_quantity, 5);
        assert_eq!(summary.line_count, 2);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(CartSummary::of(&[]), CartSummary::default());
    }

    #[test]
    fn test_thumbnail_is_first_image() {
        let mut line = item("a", 100, 1);
        assert_eq!(line.thumbnail(), None);
        line.image = vec!["https://cdn/1.png".into(), "https://cdn/2.png".into()];
        assert_eq!(line.thumbnail(), Some("https://cdn/1.png"));
    }
}
