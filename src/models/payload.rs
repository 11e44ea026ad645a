//! Request bodies sent to the inventory API.

use serde::Serialize;

use super::{Address, BusinessInfo, Contact, PurchaseOrderStatus, Quantity, Storage};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    pub company_name: String,
    pub status: String,
    pub address: Address,
    pub business_info: BusinessInfo,
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    pub material_id: String,
    pub quantity: Quantity,
    pub pricing: PricingPayload,
    pub storage: Storage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPayload {
    pub price_per_kg: f64,
    pub price_per_km: f64,
    pub total_cost: f64,
}

/// Create and update body; update sends only the fields that are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_delivery_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItemPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl PurchaseOrderPayload {
    pub fn status_only(status: PurchaseOrderStatus) -> Self {
        Self {
            status: Some(status.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivePayload {
    pub invoice_number: String,
    /// `YYYY-MM-DD`
    pub invoice_date: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_only_update_omits_other_fields() {
        let body = serde_json::to_value(PurchaseOrderPayload::status_only(
            PurchaseOrderStatus::Ordered,
        ))
        .unwrap();
        assert_eq!(body, json!({"status": "ordered"}));
    }
}
