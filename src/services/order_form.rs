use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::{ConsoleError, ConsoleResult},
    models::{
        OrderItem, OrderItemPayload, PricingPayload, PurchaseOrder, PurchaseOrderPayload,
        PurchaseOrderStatus, Quantity, ReceivePayload, Storage, SuggestedSupplier,
    },
    services::pricing,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Editable fields of a line-item row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LineItemField {
    Material,
    Weight,
    Length,
    PricePerKg,
    PricePerKm,
    Location,
    LocationDetails,
    ContainerCount,
    Notes,
}

/// One row of the inline line-item editor. Numeric fields hold raw input text.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemDraft {
    /// Client-side row key; never sent to the API.
    pub key: Uuid,
    pub material_id: String,
    pub weight: String,
    pub length: String,
    pub price_per_kg: String,
    pub price_per_km: String,
    pub location: String,
    pub location_details: String,
    pub container_count: String,
    pub notes: String,
}

impl Default for LineItemDraft {
    fn default() -> Self {
        Self {
            key: Uuid::new_v4(),
            material_id: String::new(),
            weight: String::new(),
            length: String::new(),
            price_per_kg: String::new(),
            price_per_km: String::new(),
            location: String::new(),
            location_details: String::new(),
            container_count: String::new(),
            notes: String::new(),
        }
    }
}

impl LineItemDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_item(item: &OrderItem) -> Self {
        let number = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
        Self {
            key: Uuid::new_v4(),
            material_id: item
                .material_id
                .as_ref()
                .map(|m| m.id().to_string())
                .unwrap_or_default(),
            weight: number(item.quantity.weight),
            length: number(item.quantity.length),
            price_per_kg: number(item.pricing.price_per_kg),
            price_per_km: number(item.pricing.price_per_km),
            location: item.storage.location.clone().unwrap_or_default(),
            location_details: item.storage.location_details.clone().unwrap_or_default(),
            container_count: item
                .storage
                .container_count
                .map(|c| c.to_string())
                .unwrap_or_default(),
            notes: item.notes.clone().unwrap_or_default(),
        }
    }

    /// Live total shown beside the row: weight × price per kg.
    pub fn total_cost(&self) -> Decimal {
        pricing::line_total_from_inputs(&self.weight, &self.price_per_kg)
    }

    pub fn set(&mut self, field: LineItemField, value: &str) {
        let value = value.to_string();
        match field {
            LineItemField::Material => self.material_id = value,
            LineItemField::Weight => self.weight = value,
            LineItemField::Length => self.length = value,
            LineItemField::PricePerKg => self.price_per_kg = value,
            LineItemField::PricePerKm => self.price_per_km = value,
            LineItemField::Location => self.location = value,
            LineItemField::LocationDetails => self.location_details = value,
            LineItemField::ContainerCount => self.container_count = value,
            LineItemField::Notes => self.notes = value,
        }
    }

    fn to_payload(&self, row: usize) -> ConsoleResult<OrderItemPayload> {
        let invalid = |msg: String| ConsoleError::ValidationError(format!("item {}: {}", row, msg));

        let material_id = self.material_id.trim();
        if material_id.is_empty() {
            return Err(invalid("material is required".into()));
        }

        let number = |raw: &str, label: &str| -> ConsoleResult<Option<Decimal>> {
            match pricing::try_parse_amount(raw) {
                Ok(Some(value)) if value.is_sign_negative() && !value.is_zero() => {
                    Err(invalid(format!("{} cannot be negative", label)))
                }
                Ok(value) => Ok(value),
                Err(msg) => Err(invalid(format!("{}: {}", label, msg))),
            }
        };

        let weight = number(&self.weight, "weight")?.unwrap_or(Decimal::ZERO);
        if weight <= Decimal::ZERO {
            return Err(invalid("weight must be greater than zero".into()));
        }
        let length = number(&self.length, "length")?;
        let price_per_kg = number(&self.price_per_kg, "price per kg")?.unwrap_or(Decimal::ZERO);
        let price_per_km = number(&self.price_per_km, "price per km")?.unwrap_or(Decimal::ZERO);

        let container_count = match self.container_count.trim() {
            "" => None,
            raw => Some(
                raw.parse::<u32>()
                    .map_err(|_| invalid(format!("container count '{}' is not a whole number", raw)))?,
            ),
        };

        Ok(OrderItemPayload {
            material_id: material_id.to_string(),
            quantity: Quantity {
                weight: Some(pricing::to_f64(weight)),
                length: length.map(pricing::to_f64),
            },
            pricing: PricingPayload {
                price_per_kg: pricing::to_f64(price_per_kg),
                price_per_km: pricing::to_f64(price_per_km),
                total_cost: pricing::to_f64(pricing::line_total(weight, price_per_kg)),
            },
            storage: Storage {
                location: non_blank(&self.location),
                location_details: non_blank(&self.location_details),
                container_count,
            },
            notes: non_blank(&self.notes),
        })
    }
}

/// Create/edit form of the purchase-order page.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct PurchaseOrderDraft {
    #[validate(length(min = 1, message = "Supplier is required"))]
    pub supplier_id: String,
    pub order_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    #[validate(length(max = 2000, message = "Notes are limited to 2000 characters"))]
    pub notes: String,
    items: Vec<LineItemDraft>,
}

impl PurchaseOrderDraft {
    /// Empty draft dated `order_date` with one blank line item.
    pub fn new(order_date: NaiveDate) -> Self {
        Self {
            supplier_id: String::new(),
            order_date,
            expected_delivery_date: None,
            notes: String::new(),
            items: vec![LineItemDraft::new()],
        }
    }

    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    /// Draft pre-filled from a stored order for inline editing.
    pub fn from_order(order: &PurchaseOrder) -> Self {
        let mut items: Vec<LineItemDraft> = order.items.iter().map(LineItemDraft::from_item).collect();
        if items.is_empty() {
            items.push(LineItemDraft::new());
        }
        Self {
            supplier_id: order
                .supplier_id
                .as_ref()
                .map(|s| s.id().to_string())
                .unwrap_or_default(),
            order_date: order
                .order_date
                .map(|d| d.date_naive())
                .unwrap_or_else(|| Local::now().date_naive()),
            expected_delivery_date: order.expected_delivery_date.map(|d| d.date_naive()),
            notes: order.notes.clone().unwrap_or_default(),
            items,
        }
    }

    pub fn items(&self) -> &[LineItemDraft] {
        &self.items
    }

    pub fn item(&self, key: Uuid) -> Option<&LineItemDraft> {
        self.items.iter().find(|i| i.key == key)
    }

    pub fn add_item(&mut self) -> Uuid {
        let item = LineItemDraft::new();
        let key = item.key;
        self.items.push(item);
        key
    }

    pub fn push_item(&mut self, item: LineItemDraft) -> Uuid {
        let key = item.key;
        self.items.push(item);
        key
    }

    /// Swaps the whole item list, e.g. when rows come from the command line.
    pub fn replace_items(&mut self, items: Vec<LineItemDraft>) {
        self.items = items;
    }

    pub fn remove_item(&mut self, key: Uuid) -> Option<LineItemDraft> {
        let index = self.items.iter().position(|i| i.key == key)?;
        Some(self.items.remove(index))
    }

    /// Edits one field of a row and returns the row's recomputed total.
    pub fn set_item_field(
        &mut self,
        key: Uuid,
        field: LineItemField,
        value: &str,
    ) -> ConsoleResult<Decimal> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.key == key)
            .ok_or_else(|| ConsoleError::NotFound(format!("line item {}", key)))?;
        item.set(field, value);
        Ok(item.total_cost())
    }

    /// Picks a suggested supplier for a row's material. The last paid rate
    /// fills the row's price only when it is still blank.
    pub fn apply_suggested_supplier(
        &mut self,
        key: Uuid,
        suggestion: &SuggestedSupplier,
    ) -> ConsoleResult<()> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.key == key)
            .ok_or_else(|| ConsoleError::NotFound(format!("line item {}", key)))?;
        if item.price_per_kg.trim().is_empty() {
            if let Some(rate) = suggestion.last_price_per_kg {
                item.price_per_kg = pricing::format_amount(pricing::to_decimal(rate));
            }
        }
        self.supplier_id = suggestion.supplier.id.clone();
        Ok(())
    }

    pub fn grand_total(&self) -> Decimal {
        self.items.iter().map(LineItemDraft::total_cost).sum()
    }

    fn checked_items(&self) -> ConsoleResult<Vec<OrderItemPayload>> {
        let mut trimmed = self.clone();
        trimmed.supplier_id = trimmed.supplier_id.trim().to_string();
        trimmed.validate()?;

        if self.items.is_empty() {
            return Err(ConsoleError::ValidationError(
                "Add at least one line item".into(),
            ));
        }
        if let Some(expected) = self.expected_delivery_date {
            if expected < self.order_date {
                return Err(ConsoleError::ValidationError(
                    "Expected delivery date cannot be before the order date".into(),
                ));
            }
        }

        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| item.to_payload(index + 1))
            .collect()
    }

    fn payload(&self, status: Option<PurchaseOrderStatus>) -> ConsoleResult<PurchaseOrderPayload> {
        let items = self.checked_items()?;
        let total: Decimal = items
            .iter()
            .map(|i| pricing::to_money(i.pricing.total_cost))
            .sum();

        Ok(PurchaseOrderPayload {
            supplier_id: Some(self.supplier_id.trim().to_string()),
            order_date: Some(self.order_date.format(DATE_FORMAT).to_string()),
            expected_delivery_date: self
                .expected_delivery_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
            items: Some(items),
            total_amount: Some(pricing::to_f64(total)),
            notes: non_blank(&self.notes),
            status: status.map(|s| s.to_string()),
        })
    }

    /// Body for creating a new draft order.
    pub fn submit(&self) -> ConsoleResult<PurchaseOrderPayload> {
        self.payload(Some(PurchaseOrderStatus::Draft))
    }

    /// Body for saving edits; the status is left to the API.
    pub fn submit_update(&self) -> ConsoleResult<PurchaseOrderPayload> {
        self.payload(None)
    }
}

/// Receive dialog: collects the supplier's invoice reference.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ReceiveForm {
    #[validate(length(min = 1, max = 64, message = "Invoice number is required"))]
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
}

impl ReceiveForm {
    /// Invoice dated today.
    pub fn new(invoice_number: impl Into<String>) -> Self {
        Self::dated(invoice_number, Local::now().date_naive())
    }

    pub fn dated(invoice_number: impl Into<String>, invoice_date: NaiveDate) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            invoice_date,
        }
    }

    pub fn submit(&self) -> ConsoleResult<ReceivePayload> {
        let form = Self {
            invoice_number: self.invoice_number.trim().to_string(),
            invoice_date: self.invoice_date,
        };
        form.validate()?;
        Ok(ReceivePayload {
            invoice_number: form.invoice_number,
            invoice_date: form.invoice_date.format(DATE_FORMAT).to_string(),
        })
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
