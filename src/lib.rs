//! Rawstock console library
//!
//! Typed client, page state, forms and invoice rendering for the
//! raw-material inventory admin console.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod client;
pub mod config;
pub mod errors;
pub mod invoice;
pub mod logging;
pub mod models;
pub mod services;

pub use client::{ApiClient, InventoryApi};
pub use config::{ConsoleConfig, InvoiceBranding};
pub use errors::{ConsoleError, ConsoleResult};

pub mod prelude {
    pub use crate::client::*;
    pub use crate::config::{ConsoleConfig, InvoiceBranding};
    pub use crate::errors::*;
    pub use crate::invoice::{render_invoice, RenderedInvoice};
    pub use crate::models::*;
    pub use crate::services::customer_form::{ContactForm, CustomerForm};
    pub use crate::services::customers::{CustomerPage, ViewMode};
    pub use crate::services::order_form::{
        LineItemDraft, LineItemField, PurchaseOrderDraft, ReceiveForm,
    };
    pub use crate::services::purchase_orders::{OrderAction, PurchaseOrderPage};
    pub use crate::services::{AutoConfirm, Confirm};
}
