//! End-to-end invoice rendering: order record in, loadable PDF out.

mod common;

use lopdf::{content::Content, Document, Object};
use rawstock_console::{
    invoice::{self, layout, InvoiceDocument},
    models::PurchaseOrder,
    InvoiceBranding,
};
use rust_decimal_macros::dec;
use serde_json::json;

fn branding() -> InvoiceBranding {
    InvoiceBranding {
        company_name: "Rawstock Metals Pvt. Ltd.".into(),
        address_lines: vec!["Plot 7, Bhosari MIDC".into(), "Pune 411026".into()],
        phone: Some("+91 20 2712 0000".into()),
        email: Some("accounts@rawstock.in".into()),
        gstin: Some("27AAACR5055K1Z7".into()),
        footer_note: None,
    }
}

fn shown_text(bytes: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(bytes).expect("PDF loads");
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = Content::decode(&doc.get_page_content(*page_id).expect("page content"))
                .expect("content decodes");
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(raw, _)) => Some(String::from_utf8_lossy(raw).into_owned()),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

#[test]
fn single_item_order_totals_five_hundred() {
    let order: PurchaseOrder =
        serde_json::from_value(common::order_json("po1", "PO-2024-0001", "draft")).unwrap();

    let document = InvoiceDocument::from_order(&order, &branding(), "₹");
    assert_eq!(document.grand_total, dec!(500.00));
    assert_eq!(document.grand_total_text, "₹500.00");
    assert!(document.banner.is_none());

    let rendered = invoice::render_invoice(&order, &branding(), "₹").unwrap();
    assert_eq!(rendered.file_name, "PO-2024-0001-invoice.pdf");
    assert_eq!(rendered.page_count, 1);

    let pages = shown_text(&rendered.bytes);
    assert_eq!(pages.len(), 1);
    let text = &pages[0];
    assert!(text.iter().any(|t| t == "Rs.500.00"));
    assert!(text.iter().any(|t| t.contains("PO-2024-0001")));
    assert!(text.iter().any(|t| t == "Copper wire"));
}

#[test]
fn long_order_spans_pages_with_footer_on_each() {
    let order = common::long_order(60);
    let document = InvoiceDocument::from_order(&order, &branding(), "₹");
    assert_eq!(document.grand_total, dec!(6015.00));
    assert!(document.banner.is_some());

    let layout_pages = layout::paginate(&document);
    assert!(layout_pages.len() > 1);

    let rendered = invoice::render_invoice(&order, &branding(), "₹").unwrap();
    assert_eq!(rendered.page_count, layout_pages.len());

    let pages = shown_text(&rendered.bytes);
    assert_eq!(pages.len(), layout_pages.len());
    let total = pages.len();
    for (index, text) in pages.iter().enumerate() {
        let footer = format!("Page {} of {}", index + 1, total);
        assert!(text.iter().any(|t| t == &footer), "missing '{}'", footer);
    }
    let with_total: Vec<_> = pages
        .iter()
        .filter(|text| text.iter().any(|t| t == "Rs.6015.00"))
        .collect();
    assert_eq!(with_total.len(), 1);
}

#[test]
fn unknown_status_and_bare_references_still_render() {
    let order: PurchaseOrder = serde_json::from_value(json!({
        "_id": "po9",
        "poNumber": "PO-9",
        "status": "on-hold",
        "supplierId": "64f0c0ffee",
        "items": [{ "materialId": "m7", "quantity": { "weight": 1.005 }, "pricing": { "pricePerKg": 10 } }]
    }))
    .unwrap();

    let document = InvoiceDocument::from_order(&order, &branding(), "₹");
    assert_eq!(document.header.status_label, "ON-HOLD");
    assert_eq!(document.grand_total_text, "₹10.05");

    let rendered = invoice::render_invoice(&order, &branding(), "₹").unwrap();
    let text = shown_text(&rendered.bytes).concat();
    assert!(text.iter().any(|t| t.contains("64f0c0ffee")));
}
