//! Order history conversions.

use chrono::{DateTime, Utc};
use serde_json::Value;

use tg_store_core::{OrderId, OrderStatus, PaymentMethod, ProductId, UserId};

use super::{non_empty_string, opt_string, price_or_zero, string_or, u32_or};
use crate::gateway::Document;
use crate::models::{CreatedOrder, DeliveryDetails, Order, OrderLine};

/// Convert an `orders` document.
///
/// A missing or unparseable `createdAt` falls back to `now`.
pub fn convert_order(doc: &Document, now: DateTime<Utc>) -> Order {
    let items = doc
        .field("items")
        .as_array()
        .map(|lines| lines.iter().map(convert_line).collect())
        .unwrap_or_default();

    Order {
        id: OrderId::new(doc.id.as_str()),
        user_id: UserId::new(string_or(doc.field("userId"), "")),
        items,
        total_price: price_or_zero(doc.field("totalPrice")),
        payment_method: opt_string(doc.field("paymentMethod"))
            .and_then(|s| s.parse().ok())
            .unwrap_or(PaymentMethod::CashOnDelivery),
        delivery_details: convert_delivery(doc.field("deliveryDetails")),
        status: serde_json::from_value::<OrderStatus>(doc.field("status").clone())
            .unwrap_or_default(),
        created_at: opt_string(doc.field("createdAt"))
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map_or(now, |dt| dt.with_timezone(&Utc)),
    }
}

/// Convert the body of a successful order-creation response.
///
/// The order already exists once the service answers 2xx, so an empty or
/// unexpected body yields an empty [`CreatedOrder`] rather than an error.
/// Numeric ids are accepted.
pub fn convert_created_order(body: &str) -> CreatedOrder {
    let Ok(Value::Object(mut data)) = serde_json::from_str::<Value>(body) else {
        return CreatedOrder::default();
    };
    let id = data
        .remove("id")
        .as_ref()
        .and_then(non_empty_string)
        .map(OrderId::new);
    CreatedOrder { id, data }
}

fn convert_line(value: &Value) -> OrderLine {
    let field = |name: &str| value.get(name).unwrap_or(&Value::Null);
    OrderLine {
        product_id: ProductId::new(string_or(field("productId"), "")),
        name: string_or(field("name"), "Unknown Product"),
        price: price_or_zero(field("price")),
        quantity: u32_or(field("quantity"), 1),
    }
}

fn convert_delivery(value: &Value) -> DeliveryDetails {
    let field = |name: &str| value.get(name).unwrap_or(&Value::Null);
    DeliveryDetails {
        address: string_or(field("address"), ""),
        phone: string_or(field("phone"), ""),
        notes: string_or(field("notes"), ""),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use serde_json::json;
    use tg_store_core::RecordId;

    use super::*;

    fn doc(fields: &Value) -> Document {
        Document {
            id: RecordId::new("ord-1"),
            fields: fields.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn test_created_order_tolerates_odd_bodies() {
        assert_eq!(convert_created_order(""), CreatedOrder::default());
        assert_eq!(convert_created_order("[1, 2]"), CreatedOrder::default());

        let created = convert_created_order(r#"{"id": 123, "message": "ok"}"#);
        assert_eq!(created.id, Some(OrderId::new("123")));
        assert_eq!(created.data.get("message"), Some(&json!("ok")));

        let created = convert_created_order(r#"{"id": "  "}"#);
        assert_eq!(created.id, None);
    }

    #[test]
    fn test_convert_order_round_trips_submitted_shape() {
        let now = Utc::now();
        let order = convert_order(
            &doc(&json!({
                "userId": "42",
                "items": [{"productId": "p-1", "name": "Widget", "price": 10, "quantity": 3}],
                "totalPrice": 30,
                "paymentMethod": "chapa",
                "deliveryDetails": {"address": "Bole", "phone": "+251900000000", "notes": ""},
                "status": "delivered",
                "createdAt": "2025-03-01T12:00:00.000Z"
            })),
            now,
        );

        assert_eq!(order.id, OrderId::new("ord-1"));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_price.amount(), Decimal::new(30, 0));
        assert_eq!(order.payment_method, PaymentMethod::ExternalPayment);
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.delivery_details.address, "Bole");
        assert_eq!(
            order.created_at,
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_convert_order_defaults() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let order = convert_order(&doc(&json!({"status": 7})), now);
        assert!(order.items.is_empty());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_method, PaymentMethod::CashOnDelivery);
        assert_eq!(order.created_at, now);
    }
}
