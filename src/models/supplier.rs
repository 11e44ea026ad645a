use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{lenient_datetime, Address, Identified};

/// Suppliers were created with free-text addresses before structured ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SupplierAddress {
    Text(String),
    Structured(Address),
}

impl SupplierAddress {
    pub fn lines(&self) -> Vec<String> {
        match self {
            SupplierAddress::Text(text) => text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            SupplierAddress::Structured(address) => address.lines(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase", default)]
pub struct Supplier {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<SupplierAddress>,
    pub gst_number: Option<String>,
}

wire_record!(Supplier);

impl Identified for Supplier {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A supplier the API recommends for a material, with its purchase history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedSupplier {
    #[serde(flatten)]
    pub supplier: Supplier,
    #[serde(default)]
    pub last_price_per_kg: Option<f64>,
    #[serde(default, with = "lenient_datetime")]
    pub last_order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_count: Option<u32>,
}
