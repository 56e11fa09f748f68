//! Order domain types and the order-creation wire payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use tg_store_core::{OrderId, OrderStatus, PaymentMethod, Price, ProductId, UserId};

use super::cart::CartItem;

/// A line item captured at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
}

impl OrderLine {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
        }
    }
}

/// Where and how to deliver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub notes: String,
}

/// What the checkout form collects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    pub delivery: DeliveryDetails,
}

/// Body of `POST /api/create-order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub user_id: UserId,
    pub items: Vec<OrderLine>,
    pub total_price: Price,
    pub payment_method: PaymentMethod,
    pub delivery_details: DeliveryDetails,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderPayload {
    /// Snapshot `items` into a new pending order.
    #[must_use]
    pub fn build(
        user_id: UserId,
        items: &[CartItem],
        request: CheckoutRequest,
        created_at: DateTime<Utc>,
    ) -> Self {
        let items: Vec<OrderLine> = items.iter().map(OrderLine::from).collect();
        let total_price = items.iter().map(OrderLine::line_total).sum();

        Self {
            user_id,
            items,
            total_price,
            payment_method: request.payment_method,
            delivery_details: request.delivery,
            status: OrderStatus::Pending,
            created_at,
        }
    }
}

/// Whatever the order service returned on success.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatedOrder {
    #[serde(default)]
    pub id: Option<OrderId>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// A previously submitted order, as listed in the order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderLine>,
    pub total_price: Price,
    pub payment_method: PaymentMethod,
    pub delivery_details: DeliveryDetails,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use serde_json::json;

    use tg_store_core::RecordId;

    use super::*;

    fn widget() -> CartItem {
        CartItem {
            id: RecordId::new("abc"),
            product_id: ProductId::new("widget-1"),
            name: "Widget".to_string(),
            price: Price::new(Decimal::new(10, 0)).unwrap(),
            image: vec!["https://cdn/widget.png".to_string()],
            quantity: 3,
        }
    }

    #[test]
    fn test_payload_total_is_sum_of_lines() {
        let payload = OrderPayload::build(
            UserId::new("42"),
            &[widget()],
            CheckoutRequest::default(),
            Utc::now(),
        );
        assert_eq!(payload.total_price.amount(), Decimal::new(3000, 2));
        assert_eq!(payload.status, OrderStatus::Pending);
    }

    #[test]
    fn test_payload_wire_shape() {
        let created_at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let payload = OrderPayload::build(
            UserId::new("42"),
            &[widget()],
            CheckoutRequest {
                payment_method: PaymentMethod::ExternalPayment,
                delivery: DeliveryDetails {
                    address: "Bole, Addis Ababa".to_string(),
                    phone: "+251912345678".to_string(),
                    notes: String::new(),
                },
            },
            created_at,
        );

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            json!({
                "userId": "42",
                "items": [{
                    "productId": "widget-1",
                    "name": "Widget",
                    "price": 10.0,
                    "quantity": 3
                }],
                "totalPrice": 30.0,
                "paymentMethod": "chapa",
                "deliveryDetails": {
                    "address": "Bole, Addis Ababa",
                    "phone": "+251912345678",
                    "notes": ""
                },
                "status": "pending",
                "createdAt": "2025-03-01T12:00:00Z"
            })
        );
    }

    #[test]
    fn test_created_order_keeps_extra_fields() {
        let created: CreatedOrder =
            serde_json::from_value(json!({"id": "ord-1", "paymentUrl": "https://pay"})).unwrap();
        assert_eq!(created.id, Some(OrderId::new("ord-1")));
        assert_eq!(created.data.get("paymentUrl"), Some(&json!("https://pay")));
    }
}
