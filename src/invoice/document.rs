//! Section model of a purchase-order invoice.
//!
//! Assembly is pure: the same order and branding always give the same
//! document, with every value already formatted for print.

use rust_decimal::Decimal;

use super::theme::{self, StatusStyle};
use crate::{
    config::InvoiceBranding,
    models::{display_date, OrderItem, PurchaseOrder, Reference, Supplier},
    services::pricing,
};

const DEFAULT_FOOTER: &str =
    "This is a computer-generated purchase order and does not require a signature.";

/// Horizontal alignment of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub title: &'static str,
    /// Share of the table width.
    pub weight: f32,
    pub align: Align,
}

pub const COLUMNS: [Column; 6] = [
    Column {
        title: "#",
        weight: 0.05,
        align: Align::Left,
    },
    Column {
        title: "Material",
        weight: 0.29,
        align: Align::Left,
    },
    Column {
        title: "Weight (kg)",
        weight: 0.13,
        align: Align::Right,
    },
    Column {
        title: "Rate / kg",
        weight: 0.14,
        align: Align::Right,
    },
    Column {
        title: "Storage",
        weight: 0.22,
        align: Align::Left,
    },
    Column {
        title: "Amount",
        weight: 0.17,
        align: Align::Right,
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub company_name: String,
    pub address_lines: Vec<String>,
    pub contact_line: Option<String>,
    pub gstin: Option<String>,
    pub po_number: String,
    pub status_label: String,
    pub status_style: StatusStyle,
}

/// Shown once the supplier's invoice has been recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceBanner {
    pub invoice_number: String,
    pub invoice_date: String,
    pub received_at: Option<String>,
}

impl InvoiceBanner {
    pub fn text(&self) -> String {
        let mut text = format!(
            "Invoice No: {}    Invoice Date: {}",
            self.invoice_number, self.invoice_date
        );
        if let Some(received) = &self.received_at {
            text.push_str(&format!("    Received: {}", received));
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoBox {
    pub title: &'static str,
    pub lines: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// One entry per [`COLUMNS`] column.
    pub cells: [String; 6],
    pub shaded: bool,
    /// Extra lines printed under the row.
    pub sub_notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDocument {
    pub header: Header,
    pub banner: Option<InvoiceBanner>,
    pub supplier: InfoBox,
    pub order_info: InfoBox,
    pub rows: Vec<TableRow>,
    pub grand_total: Decimal,
    pub grand_total_text: String,
    pub notes: Option<String>,
    pub footer: String,
}

impl InvoiceDocument {
    pub fn from_order(
        order: &PurchaseOrder,
        branding: &InvoiceBranding,
        currency_symbol: &str,
    ) -> Self {
        let grand_total = order.grand_total();
        Self {
            header: header(order, branding),
            banner: banner(order),
            supplier: supplier_box(order),
            order_info: order_box(order),
            rows: order
                .items
                .iter()
                .enumerate()
                .map(|(index, item)| table_row(index, item, currency_symbol))
                .collect(),
            grand_total,
            grand_total_text: pricing::format_currency(currency_symbol, grand_total),
            notes: order
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            footer: branding
                .footer_note
                .clone()
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FOOTER.to_string()),
        }
    }
}

fn header(order: &PurchaseOrder, branding: &InvoiceBranding) -> Header {
    let contact: Vec<&str> = [branding.phone.as_deref(), branding.email.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect();
    Header {
        company_name: branding.company_name.clone(),
        address_lines: branding.address_lines.clone(),
        contact_line: (!contact.is_empty()).then(|| contact.join("  |  ")),
        gstin: branding.gstin.clone().filter(|g| !g.trim().is_empty()),
        po_number: if order.po_number.trim().is_empty() {
            "-".to_string()
        } else {
            order.po_number.clone()
        },
        status_label: theme::status_label(&order.status),
        status_style: theme::status_style(&order.status),
    }
}

fn banner(order: &PurchaseOrder) -> Option<InvoiceBanner> {
    if !order.has_invoice() {
        return None;
    }
    Some(InvoiceBanner {
        invoice_number: order.invoice_number.clone().unwrap_or_default(),
        invoice_date: display_date(order.invoice_date.as_ref()),
        received_at: order.received_at.as_ref().map(|d| display_date(Some(d))),
    })
}

fn supplier_box(order: &PurchaseOrder) -> InfoBox {
    let mut lines = Vec::new();
    match &order.supplier_id {
        Some(Reference::Populated(supplier)) => supplier_lines(supplier, &mut lines),
        Some(Reference::Id(id)) => lines.push(("Supplier ID".to_string(), id.clone())),
        None => lines.push(("Name".to_string(), "-".to_string())),
    }
    InfoBox {
        title: "Supplier",
        lines,
    }
}

fn supplier_lines(supplier: &Supplier, lines: &mut Vec<(String, String)>) {
    lines.push(("Name".to_string(), supplier.name.clone()));
    let optional = [
        ("Contact", &supplier.contact_person),
        ("Phone", &supplier.phone),
        ("Email", &supplier.email),
        ("GSTIN", &supplier.gst_number),
    ];
    for (label, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            lines.push((label.to_string(), value.to_string()));
        }
    }
    if let Some(address) = &supplier.address {
        let address = address.lines().join(", ");
        if !address.is_empty() {
            lines.push(("Address".to_string(), address));
        }
    }
}

fn order_box(order: &PurchaseOrder) -> InfoBox {
    InfoBox {
        title: "Order Details",
        lines: vec![
            ("Order Date".to_string(), display_date(order.order_date.as_ref())),
            (
                "Expected Delivery".to_string(),
                display_date(order.expected_delivery_date.as_ref()),
            ),
            ("Status".to_string(), theme::status_label(&order.status)),
            ("Items".to_string(), order.items.len().to_string()),
        ],
    }
}

fn quantity(value: Option<f64>) -> String {
    value
        .map(|v| pricing::format_amount(pricing::to_decimal(v)))
        .unwrap_or_else(|| "-".to_string())
}

fn table_row(index: usize, item: &OrderItem, currency_symbol: &str) -> TableRow {
    let rate = item
        .pricing
        .price_per_kg
        .map(|r| pricing::format_currency(currency_symbol, pricing::to_money(r)))
        .unwrap_or_else(|| "-".to_string());
    let storage = item.storage.summary();

    let mut sub_notes = Vec::new();
    let mut transport = Vec::new();
    if let Some(length) = item.quantity.length.filter(|l| *l > 0.0) {
        transport.push(format!("Length: {} km", quantity(Some(length))));
    }
    if let Some(rate_km) = item.pricing.price_per_km.filter(|r| *r > 0.0) {
        transport.push(format!(
            "Rate / km: {}",
            pricing::format_currency(currency_symbol, pricing::to_money(rate_km))
        ));
    }
    if !transport.is_empty() {
        sub_notes.push(transport.join(", "));
    }
    if let Some(notes) = item.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        sub_notes.push(format!("Note: {}", notes));
    }

    TableRow {
        cells: [
            (index + 1).to_string(),
            item.material_name(),
            quantity(item.quantity.weight),
            rate,
            if storage.is_empty() {
                "-".to_string()
            } else {
                storage
            },
            pricing::format_currency(currency_symbol, item.line_total()),
        ],
        shaded: index % 2 == 1,
        sub_notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(value: serde_json::Value) -> PurchaseOrder {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn example_order_totals() {
        let order = order(json!({
            "_id": "po1",
            "poNumber": "PO-0001",
            "status": "draft",
            "items": [{"materialId": "m1", "quantity": {"weight": 10}, "pricing": {"pricePerKg": 50}}]
        }));
        let doc = InvoiceDocument::from_order(&order, &InvoiceBranding::default(), "₹");
        assert_eq!(doc.rows[0].cells[2], "10.00");
        assert_eq!(doc.rows[0].cells[5], "₹500.00");
        assert_eq!(doc.grand_total_text, "₹500.00");
        assert!(doc.banner.is_none());
        assert!(doc.notes.is_none());
        assert_eq!(doc.footer, DEFAULT_FOOTER);
    }

    #[test]
    fn banner_only_with_invoice_number() {
        let received = order(json!({
            "poNumber": "PO-0007",
            "status": "received",
            "invoiceNumber": "INV-204",
            "invoiceDate": "2024-05-09",
            "receivedAt": "2024-05-10T08:00:00Z"
        }));
        let banner = InvoiceDocument::from_order(&received, &InvoiceBranding::default(), "₹")
            .banner
            .unwrap();
        assert_eq!(
            banner.text(),
            "Invoice No: INV-204    Invoice Date: 09 May 2024    Received: 10 May 2024"
        );

        let blank = order(json!({"status": "received", "invoiceNumber": "  "}));
        assert!(InvoiceDocument::from_order(&blank, &InvoiceBranding::default(), "₹")
            .banner
            .is_none());
    }

    #[test]
    fn rows_alternate_shading_and_carry_sub_notes() {
        let order = order(json!({
            "status": "ordered",
            "supplierId": {"_id": "s1", "name": "Alpha Alloys", "phone": "020-5550101"},
            "items": [
                {"quantity": {"weight": 1}, "pricing": {"pricePerKg": 1}},
                {"quantity": {"weight": 2, "length": 12.5}, "pricing": {"pricePerKg": 1, "pricePerKm": 40},
                 "notes": "Handle with care"},
                {"quantity": {"weight": 3}, "pricing": {"pricePerKg": 1}}
            ],
            "notes": "  Deliver to gate 2  "
        }));
        let doc = InvoiceDocument::from_order(&order, &InvoiceBranding::default(), "Rs. ");
        let shading: Vec<bool> = doc.rows.iter().map(|r| r.shaded).collect();
        assert_eq!(shading, vec![false, true, false]);
        assert_eq!(
            doc.rows[1].sub_notes,
            vec![
                "Length: 12.50 km, Rate / km: Rs. 40.00".to_string(),
                "Note: Handle with care".to_string()
            ]
        );
        assert_eq!(doc.notes.as_deref(), Some("Deliver to gate 2"));
        assert_eq!(doc.grand_total_text, "Rs. 6.00");
        assert_eq!(doc.supplier.lines[1], ("Phone".to_string(), "020-5550101".to_string()));
        assert_eq!(doc.header.status_label, "ORDERED");
    }

    #[test]
    fn unknown_status_uses_draft_style() {
        let odd = order(json!({"status": "on_hold"}));
        let draft = order(json!({"status": "draft"}));
        let branding = InvoiceBranding::default();
        assert_eq!(
            InvoiceDocument::from_order(&odd, &branding, "₹").header.status_style,
            InvoiceDocument::from_order(&draft, &branding, "₹").header.status_style
        );
    }
}
