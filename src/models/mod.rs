//! Wire records exchanged with the inventory API.
//!
//! The API owns these records; the console passes them through and only
//! reads the fields it renders. Every field is optional on the wire.

/// Implements `Serialize`/`Deserialize` for a record derived with
/// `#[serde(remote = "Self")]`, reading it through [`wire::normalize`].
macro_rules! wire_record {
    ($record:ty) => {
        impl<'de> serde::Deserialize<'de> for $record {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                use serde::de::Error as _;
                let value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                <$record>::deserialize($crate::models::wire::normalize(value))
                    .map_err(D::Error::custom)
            }
        }

        impl serde::Serialize for $record {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                <$record>::serialize(self, serializer)
            }
        }
    };
}

pub mod customer;
pub mod material;
pub mod payload;
pub mod purchase_order;
pub mod reference;
pub mod supplier;

pub use customer::{Address, BusinessInfo, Contact, Customer, CustomerStatus};
pub use material::RawMaterial;
pub use payload::{
    CustomerPayload, OrderItemPayload, PricingPayload, PurchaseOrderPayload, ReceivePayload,
};
pub use purchase_order::{
    OrderItem, Pricing, PurchaseOrder, PurchaseOrderStatus, Quantity, Storage,
};
pub use reference::{Identified, Reference};
pub use supplier::{SuggestedSupplier, Supplier, SupplierAddress};

/// Lenient timestamp handling for API dates.
///
/// The API emits full RFC 3339 timestamps for stored dates but plain
/// `YYYY-MM-DD` strings for some form-entered ones.
pub(crate) mod lenient_datetime {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }
}

/// Record shapes as the API actually sends them.
///
/// Some endpoints echo the identifier as both `_id` and `id`, and unset
/// fields arrive as explicit `null`s.
pub(crate) mod wire {
    use serde_json::{Map, Value};

    /// Folds `id` into `_id` (keeping `_id` when both are present) and drops
    /// `null` members at every depth so field defaults apply.
    pub fn normalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut fields = without_nulls(map);
                if let Some(id) = fields.remove("id") {
                    fields.entry("_id").or_insert(id);
                }
                Value::Object(fields)
            }
            other => other,
        }
    }

    fn without_nulls(map: Map<String, Value>) -> Map<String, Value> {
        map.into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k, strip(v)))
            .collect()
    }

    fn strip(value: Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(without_nulls(map)),
            Value::Array(items) => Value::Array(items.into_iter().map(strip).collect()),
            other => other,
        }
    }
}

/// Shared display helpers for dates shown in tables and invoices.
pub fn display_date(value: Option<&chrono::DateTime<chrono::Utc>>) -> String {
    value
        .map(|dt| dt.format("%d %b %Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}
