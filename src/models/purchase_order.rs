use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::{lenient_datetime, Identified, RawMaterial, Reference, Supplier};
use crate::services::pricing;

/// Workflow states of a purchase order.
///
/// `draft → ordered → received`, or `→ cancelled` from draft/ordered. Orders
/// keep their raw status string so values outside this set survive a round
/// trip; [`PurchaseOrder::status`] yields `None` for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PurchaseOrderStatus {
    Draft,
    Ordered,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Received | Self::Cancelled)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Quantity {
    pub weight: Option<f64>,
    pub length: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pricing {
    pub price_per_kg: Option<f64>,
    pub price_per_km: Option<f64>,
    pub total_cost: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Storage {
    pub location: Option<String>,
    pub location_details: Option<String>,
    pub container_count: Option<u32>,
}

impl Storage {
    /// `"Location - details (n containers)"`, omitting absent parts.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(location) = self.location.as_deref().filter(|s| !s.trim().is_empty()) {
            parts.push(location.trim().to_string());
        }
        if let Some(details) = self
            .location_details
            .as_deref()
            .filter(|s| !s.trim().is_empty())
        {
            parts.push(details.trim().to_string());
        }
        let mut summary = parts.join(" - ");
        if let Some(count) = self.container_count.filter(|c| *c > 0) {
            let unit = if count == 1 { "container" } else { "containers" };
            if summary.is_empty() {
                summary = format!("{count} {unit}");
            } else {
                summary = format!("{summary} ({count} {unit})");
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_id: Option<Reference<RawMaterial>>,
    pub quantity: Quantity,
    pub pricing: Pricing,
    pub storage: Storage,
    pub notes: Option<String>,
}

impl OrderItem {
    /// Line total: the stored total cost, or weight × price per kg when absent.
    pub fn line_total(&self) -> Decimal {
        match self.pricing.total_cost {
            Some(total) => pricing::to_money(total),
            None => pricing::line_total_from_numbers(
                self.quantity.weight.unwrap_or_default(),
                self.pricing.price_per_kg.unwrap_or_default(),
            ),
        }
    }

    pub fn material_name(&self) -> String {
        match &self.material_id {
            Some(Reference::Populated(material)) => material.label(),
            Some(Reference::Id(id)) => id.clone(),
            None => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase", default)]
pub struct PurchaseOrder {
    #[serde(rename = "_id")]
    pub id: String,
    pub po_number: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<Reference<Supplier>>,
    #[serde(with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub order_date: Option<DateTime<Utc>>,
    #[serde(with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub expected_delivery_date: Option<DateTime<Utc>>,
    pub invoice_number: Option<String>,
    #[serde(with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<DateTime<Utc>>,
    #[serde(with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItem>,
    pub total_amount: Option<f64>,
    pub notes: Option<String>,
    #[serde(with = "lenient_datetime", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

wire_record!(PurchaseOrder);

impl Identified for PurchaseOrder {
    fn id(&self) -> &str {
        &self.id
    }
}

impl PurchaseOrder {
    pub fn status(&self) -> Option<PurchaseOrderStatus> {
        self.status.parse().ok()
    }

    pub fn supplier(&self) -> Option<&Supplier> {
        self.supplier_id.as_ref().and_then(Reference::record)
    }

    pub fn supplier_name(&self) -> String {
        match &self.supplier_id {
            Some(Reference::Populated(supplier)) => supplier.name.clone(),
            Some(Reference::Id(id)) => id.clone(),
            None => "-".to_string(),
        }
    }

    /// Sum of the line totals.
    pub fn grand_total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    pub fn has_invoice(&self) -> bool {
        self.invoice_number
            .as_deref()
            .map_or(false, |n| !n.trim().is_empty())
    }
}
