//! Document and query types shared by every document store backend.
//!
//! Queries are small: equality filters, one ordering key, a `startAfter`
//! cursor and a limit. Ties on the ordering key are broken by document id,
//! so a cursor names an exact position even when keys repeat. [`Query::apply`] is the
//! reference evaluation used by the in-memory store; remote backends are
//! expected to honor the same semantics.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use tg_store_core::RecordId;

/// Document fields as stored remotely.
pub type Fields = Map<String, Value>;

/// A stored document: gateway-assigned id plus loosely-typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: RecordId,
    #[serde(default)]
    pub fields: Fields,
}

impl Document {
    /// Read a field, treating absence as `null`.
    #[must_use]
    pub fn field(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&Value::Null)
    }
}

/// Equality filter on one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Ordering key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

/// Position after a given document in a query's ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// The document's ordering-key value.
    pub value: Value,
    pub id: RecordId,
}

impl Cursor {
    /// Cursor positioned at `doc` under an ordering on `field`.
    #[must_use]
    pub fn after(doc: &Document, field: &str) -> Self {
        Self {
            value: doc.field(field).clone(),
            id: doc.id.clone(),
        }
    }

    fn cmp_doc(&self, doc: &Document, field: &str) -> Ordering {
        compare_values(doc.field(field), &self.value).then_with(|| doc.id.cmp(&self.id))
    }
}

/// A document query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    /// Only documents that sort strictly after this position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_after: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter.
    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Order ascending by `field`.
    #[must_use]
    pub fn order_by(self, field: impl Into<String>) -> Self {
        self.order_by_direction(field, Direction::Asc)
    }

    /// Order by `field` in the given direction.
    #[must_use]
    pub fn order_by_direction(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn start_after(mut self, cursor: Cursor) -> Self {
        self.start_after = Some(cursor);
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a document satisfies every filter.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.filters
            .iter()
            .all(|filter| doc.field(&filter.field) == &filter.value)
    }

    /// Evaluate the query over a set of documents.
    #[must_use]
    pub fn apply<I>(&self, docs: I) -> Vec<Document>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut result: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();

        if let Some(order) = &self.order_by {
            result.sort_by(|a, b| {
                let ord = compare_values(a.field(&order.field), b.field(&order.field))
                    .then_with(|| a.id.cmp(&b.id));
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });

            if let Some(cursor) = &self.start_after {
                result.retain(|doc| {
                    let ord = cursor.cmp_doc(doc, &order.field);
                    match order.direction {
                        Direction::Asc => ord == Ordering::Greater,
                        Direction::Desc => ord == Ordering::Less,
                    }
                });
            }
        }

        if let Some(limit) = self.limit {
            result.truncate(limit);
        }

        result
    }
}

/// Total order over JSON values: null < bool < number < string < array < object.
#[must_use]
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.total_cmp(&y)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

const fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn doc(id: &str, fields: &Value) -> Document {
        Document {
            id: RecordId::new(id),
            fields: fields.as_object().cloned().unwrap_or_default(),
        }
    }

    fn names(docs: &[Document]) -> Vec<&str> {
        docs.iter()
            .filter_map(|d| d.field("name").as_str())
            .collect()
    }

    fn products() -> Vec<Document> {
        vec![
            doc("1", &json!({"name": "Coffee", "category": "drinks"})),
            doc("2", &json!({"name": "Apple", "category": "fruit"})),
            doc("3", &json!({"name": "Banana", "category": "fruit"})),
            doc("4", &json!({"category": "fruit"})),
        ]
    }

    #[test]
    fn test_equality_filters() {
        let query = Query::new().where_eq("category", "fruit");
        let result = query.apply(products());
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_order_limit_and_cursor() {
        let first = Query::new().order_by("name").limit(2).apply(products());
        // Missing name sorts first as null.
        assert_eq!(first.first().map(|d| d.id.as_str()), Some("4"));

        let apple = doc("2", &json!({"name": "Apple"}));
        let next = Query::new()
            .order_by("name")
            .start_after(Cursor::after(&apple, "name"))
            .limit(10)
            .apply(products());
        assert_eq!(names(&next), vec!["Banana", "Coffee"]);
    }

    #[test]
    fn test_cursor_breaks_ties_by_id() {
        let docs = vec![
            doc("t2", &json!({"name": "T-Shirt"})),
            doc("a", &json!({"name": "Apple"})),
            doc("t1", &json!({"name": "T-Shirt"})),
            doc("t3", &json!({"name": "T-Shirt"})),
        ];
        let first = Query::new().order_by("name").limit(2).apply(docs.clone());
        let ids: Vec<&str> = first.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "t1"]);

        let rest = Query::new()
            .order_by("name")
            .start_after(Cursor::after(&doc("t1", &json!({"name": "T-Shirt"})), "name"))
            .apply(docs);
        let ids: Vec<&str> = rest.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t3"]);
    }

    #[test]
    fn test_descending_numeric_order() {
        let docs = vec![
            doc("a", &json!({"balance": 5})),
            doc("b", &json!({"balance": 50.5})),
            doc("c", &json!({"balance": 12})),
        ];
        let result = Query::new()
            .order_by_direction("balance", Direction::Desc)
            .apply(docs);
        let ids: Vec<&str> = result.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_query_wire_format() {
        let query = Query::new()
            .where_eq("userId", "42")
            .order_by("name")
            .start_after(Cursor {
                value: json!("Apple"),
                id: RecordId::new("p1"),
            })
            .limit(20);
        let json = serde_json::to_value(&query).unwrap_or_default();
        assert_eq!(
            json,
            json!({
                "filters": [{"field": "userId", "value": "42"}],
                "orderBy": {"field": "name", "direction": "asc"},
                "startAfter": {"value": "Apple", "id": "p1"},
                "limit": 20
            })
        );
    }
}
