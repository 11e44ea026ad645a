//! Printable purchase-order invoice.
//!
//! `order → InvoiceDocument → pages → PDF bytes`. The first two steps are
//! pure; only [`pdf::render`] touches an encoder.

pub mod document;
pub mod layout;
pub mod pdf;
pub mod theme;

pub use document::InvoiceDocument;
pub use layout::{paginate, DrawOp, Page};
pub use theme::{status_style, StatusStyle};

use std::path::{Path, PathBuf};

use crate::{config::InvoiceBranding, errors::ConsoleResult, models::PurchaseOrder};

/// A rendered invoice ready to be saved or streamed.
#[derive(Debug, Clone)]
pub struct RenderedInvoice {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl RenderedInvoice {
    /// Writes the PDF into `dir` under its download name.
    pub fn save_in(&self, dir: &Path) -> ConsoleResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Download name: `<poNumber>-invoice.pdf`.
pub fn file_name(order: &PurchaseOrder) -> String {
    let number: String = order
        .po_number
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    if number.is_empty() {
        "purchase-order-invoice.pdf".to_string()
    } else {
        format!("{}-invoice.pdf", number)
    }
}

pub fn render_invoice(
    order: &PurchaseOrder,
    branding: &InvoiceBranding,
    currency_symbol: &str,
) -> ConsoleResult<RenderedInvoice> {
    let document = InvoiceDocument::from_order(order, branding, currency_symbol);
    let pages = layout::paginate(&document);
    let bytes = pdf::render(&pages)?;
    Ok(RenderedInvoice {
        file_name: file_name(order),
        bytes,
        page_count: pages.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        let mut order = PurchaseOrder {
            po_number: "PO-2024-0007".into(),
            ..Default::default()
        };
        assert_eq!(file_name(&order), "PO-2024-0007-invoice.pdf");

        order.po_number = "PO/24/7".into();
        assert_eq!(file_name(&order), "PO-24-7-invoice.pdf");

        order.po_number = "  ".into();
        assert_eq!(file_name(&order), "purchase-order-invoice.pdf");
    }

    #[test]
    fn saves_under_download_name() {
        let dir = tempfile::tempdir().unwrap();
        let order = PurchaseOrder {
            po_number: "PO-1".into(),
            ..Default::default()
        };
        let rendered = render_invoice(&order, &InvoiceBranding::default(), "₹").unwrap();
        let path = rendered.save_in(&dir.path().join("invoices")).unwrap();
        assert_eq!(path.file_name().unwrap(), "PO-1-invoice.pdf");
        assert_eq!(std::fs::read(path).unwrap(), rendered.bytes);
    }
}
