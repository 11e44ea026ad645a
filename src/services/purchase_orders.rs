use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::{error, info, instrument, warn};

use crate::{
    client::InventoryApi,
    config::InvoiceBranding,
    errors::{ConsoleError, ConsoleResult},
    invoice::{self, RenderedInvoice},
    models::{
        PurchaseOrder, PurchaseOrderPayload, PurchaseOrderStatus, RawMaterial, Reference,
        SuggestedSupplier, Supplier,
    },
    services::{
        contains_ignore_case,
        order_form::{PurchaseOrderDraft, ReceiveForm},
        Confirm,
    },
};

/// Buttons a purchase-order row can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum OrderAction {
    Edit,
    PlaceOrder,
    Receive,
    Cancel,
    Delete,
    Invoice,
}

impl OrderAction {
    pub fn label(self) -> &'static str {
        match self {
            OrderAction::Edit => "Edit",
            OrderAction::PlaceOrder => "Place order",
            OrderAction::Receive => "Receive",
            OrderAction::Cancel => "Cancel",
            OrderAction::Delete => "Delete",
            OrderAction::Invoice => "Invoice",
        }
    }
}

/// Actions offered for a status. Unknown statuses only get the invoice.
pub fn available_actions(status: Option<PurchaseOrderStatus>) -> &'static [OrderAction] {
    use OrderAction::*;
    match status {
        Some(PurchaseOrderStatus::Draft) => &[Edit, PlaceOrder, Cancel, Delete, Invoice],
        Some(PurchaseOrderStatus::Ordered) => &[Receive, Cancel, Invoice],
        Some(PurchaseOrderStatus::Received) | Some(PurchaseOrderStatus::Cancelled) | None => {
            &[Invoice]
        }
    }
}

pub fn is_action_available(status: Option<PurchaseOrderStatus>, action: OrderAction) -> bool {
    available_actions(status).contains(&action)
}

/// State of the purchase-order page.
#[derive(Debug, Default)]
pub struct PurchaseOrderPage {
    orders: Vec<PurchaseOrder>,
    materials: Vec<RawMaterial>,
    suppliers: Vec<Supplier>,
    status_filter: Option<PurchaseOrderStatus>,
    query: String,
    last_error: Option<String>,
}

impl PurchaseOrderPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> &[PurchaseOrder] {
        &self.orders
    }

    pub fn materials(&self) -> &[RawMaterial] {
        &self.materials
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_status_filter(&mut self, status: Option<PurchaseOrderStatus>) {
        self.status_filter = status;
    }

    pub fn find(&self, id: &str) -> Option<&PurchaseOrder> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Supplier name, looked up in the supplier list when the order only has the id.
    pub fn supplier_name(&self, order: &PurchaseOrder) -> String {
        match &order.supplier_id {
            Some(reference @ Reference::Id(_)) => reference
                .resolve(&self.suppliers)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| reference.id().to_string()),
            _ => order.supplier_name(),
        }
    }

    /// Orders passing the status filter and search, newest order date first.
    pub fn visible(&self) -> Vec<&PurchaseOrder> {
        let mut visible: Vec<&PurchaseOrder> = self
            .orders
            .iter()
            .filter(|o| match self.status_filter {
                Some(status) => o.status() == Some(status),
                None => true,
            })
            .filter(|o| {
                contains_ignore_case(&o.po_number, &self.query)
                    || contains_ignore_case(&self.supplier_name(o), &self.query)
            })
            .collect();
        visible.sort_by(|a, b| {
            b.order_date
                .cmp(&a.order_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        visible
    }

    /// Counts per known status, in workflow order.
    pub fn status_counts(&self) -> Vec<(PurchaseOrderStatus, usize)> {
        use strum::IntoEnumIterator;
        PurchaseOrderStatus::iter()
            .map(|status| {
                let count = self
                    .orders
                    .iter()
                    .filter(|o| o.status() == Some(status))
                    .count();
                (status, count)
            })
            .collect()
    }

    /// Re-fetches orders, materials and suppliers. Each list is replaced only
    /// when its own fetch succeeds; the first failure is returned.
    #[instrument(skip(self, api))]
    pub async fn refresh(&mut self, api: &dyn InventoryApi) -> ConsoleResult<()> {
        let (orders, materials, suppliers) = tokio::join!(
            api.list_purchase_orders(),
            api.list_raw_materials(),
            api.list_suppliers()
        );

        let mut first_failure = None;
        match orders {
            Ok(orders) => {
                info!(count = orders.len(), "Purchase orders loaded");
                self.orders = orders;
            }
            Err(err) => {
                error!(error = %err, "Failed to fetch purchase orders");
                first_failure.get_or_insert(err);
            }
        }
        match materials {
            Ok(materials) => self.materials = materials,
            Err(err) => {
                error!(error = %err, "Failed to fetch raw materials");
                first_failure.get_or_insert(err);
            }
        }
        match suppliers {
            Ok(suppliers) => self.suppliers = suppliers,
            Err(err) => {
                error!(error = %err, "Failed to fetch suppliers");
                first_failure.get_or_insert(err);
            }
        }

        match first_failure {
            Some(err) => Err(self.record_failure(err)),
            None => {
                self.last_error = None;
                Ok(())
            }
        }
    }

    async fn refresh_after_mutation(&mut self, api: &dyn InventoryApi) {
        if self.refresh(api).await.is_err() {
            warn!("Purchase-order page left stale after a successful change");
        }
    }

    fn record_failure(&mut self, err: ConsoleError) -> ConsoleError {
        self.last_error = Some(err.alert_message());
        err
    }

    /// Looks up an order and checks that `action` is offered for its status.
    fn gate(&mut self, id: &str, action: OrderAction) -> ConsoleResult<PurchaseOrder> {
        let order = match self.find(id) {
            Some(order) => order.clone(),
            None => {
                return Err(
                    self.record_failure(ConsoleError::NotFound(format!("purchase order {}", id)))
                )
            }
        };
        if !is_action_available(order.status(), action) {
            let status = if order.status.trim().is_empty() {
                "unknown"
            } else {
                order.status.as_str()
            };
            let err = ConsoleError::InvalidOperation(format!(
                "{} is not available for purchase order {} ({})",
                action.label(),
                display_number(&order),
                status
            ));
            return Err(self.record_failure(err));
        }
        Ok(order)
    }

    #[instrument(skip(self, api, draft))]
    pub async fn create(
        &mut self,
        api: &dyn InventoryApi,
        draft: &PurchaseOrderDraft,
    ) -> ConsoleResult<Option<PurchaseOrder>> {
        let payload = draft.submit().map_err(|e| self.record_failure(e))?;
        let created = api
            .create_purchase_order(&payload)
            .await
            .map_err(|e| self.record_failure(e))?;
        info!(
            items = draft.items().len(),
            total = %draft.grand_total(),
            "Purchase order created"
        );
        self.refresh_after_mutation(api).await;
        Ok(created)
    }

    #[instrument(skip(self, api, draft))]
    pub async fn update(
        &mut self,
        api: &dyn InventoryApi,
        id: &str,
        draft: &PurchaseOrderDraft,
    ) -> ConsoleResult<()> {
        self.gate(id, OrderAction::Edit)?;
        let payload = draft.submit_update().map_err(|e| self.record_failure(e))?;
        api.update_purchase_order(id, &payload)
            .await
            .map_err(|e| self.record_failure(e))?;
        info!(order_id = %id, "Purchase order updated");
        self.refresh_after_mutation(api).await;
        Ok(())
    }

    /// Moves a draft to `ordered`.
    #[instrument(skip(self, api))]
    pub async fn place_order(&mut self, api: &dyn InventoryApi, id: &str) -> ConsoleResult<()> {
        self.gate(id, OrderAction::PlaceOrder)?;
        let payload = PurchaseOrderPayload::status_only(PurchaseOrderStatus::Ordered);
        api.update_purchase_order(id, &payload)
            .await
            .map_err(|e| self.record_failure(e))?;
        info!(order_id = %id, "Purchase order placed");
        self.refresh_after_mutation(api).await;
        Ok(())
    }

    #[instrument(skip(self, api, form))]
    pub async fn receive(
        &mut self,
        api: &dyn InventoryApi,
        id: &str,
        form: &ReceiveForm,
    ) -> ConsoleResult<()> {
        self.gate(id, OrderAction::Receive)?;
        let payload = form.submit().map_err(|e| self.record_failure(e))?;
        api.receive_purchase_order(id, &payload)
            .await
            .map_err(|e| self.record_failure(e))?;
        info!(order_id = %id, invoice = %payload.invoice_number, "Purchase order received");
        self.refresh_after_mutation(api).await;
        Ok(())
    }

    /// Cancels after confirmation. Returns `false` when declined.
    #[instrument(skip(self, api, confirm))]
    pub async fn cancel(
        &mut self,
        api: &dyn InventoryApi,
        id: &str,
        confirm: &dyn Confirm,
    ) -> ConsoleResult<bool> {
        let order = self.gate(id, OrderAction::Cancel)?;
        let prompt = format!(
            "Cancel purchase order \"{}\"? This cannot be undone.",
            display_number(&order)
        );
        if !confirm.confirm(&prompt) {
            info!(order_id = %id, "Purchase order cancellation declined");
            return Ok(false);
        }

        api.cancel_purchase_order(id)
            .await
            .map_err(|e| self.record_failure(e))?;
        info!(order_id = %id, "Purchase order cancelled");
        self.refresh_after_mutation(api).await;
        Ok(true)
    }

    /// Deletes a draft after confirmation. Returns `false` when declined.
    #[instrument(skip(self, api, confirm))]
    pub async fn delete(
        &mut self,
        api: &dyn InventoryApi,
        id: &str,
        confirm: &dyn Confirm,
    ) -> ConsoleResult<bool> {
        let order = self.gate(id, OrderAction::Delete)?;
        let prompt = format!(
            "Delete purchase order \"{}\"? This cannot be undone.",
            display_number(&order)
        );
        if !confirm.confirm(&prompt) {
            info!(order_id = %id, "Purchase order deletion declined");
            return Ok(false);
        }

        api.delete_purchase_order(id)
            .await
            .map_err(|e| self.record_failure(e))?;
        info!(order_id = %id, "Purchase order deleted");
        self.refresh_after_mutation(api).await;
        Ok(true)
    }

    /// Suppliers the API recommends for a material; no call for a blank id.
    #[instrument(skip(self, api))]
    pub async fn suggested_suppliers(
        &mut self,
        api: &dyn InventoryApi,
        material_id: &str,
    ) -> ConsoleResult<Vec<SuggestedSupplier>> {
        let material_id = material_id.trim();
        if material_id.is_empty() {
            return Ok(Vec::new());
        }
        api.suggested_suppliers(material_id)
            .await
            .map_err(|e| self.record_failure(e))
    }

    /// Copy of an order with bare supplier/material ids replaced by the
    /// records loaded on this page.
    pub fn resolved(&self, order: &PurchaseOrder) -> PurchaseOrder {
        let mut order = order.clone();
        if let Some(reference @ Reference::Id(_)) = &order.supplier_id {
            if let Some(supplier) = reference.resolve(&self.suppliers) {
                order.supplier_id = Some(Reference::Populated(supplier.clone()));
            }
        }
        for item in &mut order.items {
            if let Some(reference @ Reference::Id(_)) = &item.material_id {
                if let Some(material) = reference.resolve(&self.materials) {
                    item.material_id = Some(Reference::Populated(material.clone()));
                }
            }
        }
        order
    }

    /// Builds the PDF invoice for an order on this page.
    #[instrument(skip(self, branding))]
    pub fn invoice(
        &mut self,
        id: &str,
        branding: &InvoiceBranding,
        currency_symbol: &str,
    ) -> ConsoleResult<RenderedInvoice> {
        let order = self.gate(id, OrderAction::Invoice)?;
        let order = self.resolved(&order);
        let rendered = invoice::render_invoice(&order, branding, currency_symbol)
            .map_err(|e| self.record_failure(e))?;
        info!(
            order_id = %id,
            file = %rendered.file_name,
            pages = rendered.page_count,
            "Invoice rendered"
        );
        Ok(rendered)
    }
}

fn display_number(order: &PurchaseOrder) -> &str {
    if order.po_number.trim().is_empty() {
        &order.id
    } else {
        &order.po_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockInventoryApi;
    use crate::services::{order_form::LineItemField, AutoConfirm};
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use reqwest::StatusCode;
    use rstest::rstest;
    use serde_json::json;

    fn orders() -> Vec<PurchaseOrder> {
        serde_json::from_value(json!([
            {"_id": "po1", "poNumber": "PO-0001", "status": "draft", "supplierId": "s1",
             "orderDate": "2024-05-01",
             "items": [{"materialId": "m1", "quantity": {"weight": 10}, "pricing": {"pricePerKg": 50}}]},
            {"_id": "po2", "poNumber": "PO-0002", "status": "ordered",
             "supplierId": {"_id": "s2", "name": "Bharat Copper"}, "orderDate": "2024-05-03"},
            {"_id": "po3", "poNumber": "PO-0003", "status": "received", "supplierId": "s1",
             "orderDate": "2024-04-20", "invoiceNumber": "INV-9"},
            {"_id": "po4", "poNumber": "PO-0004", "status": "on_hold", "orderDate": "2024-04-28"}
        ]))
        .unwrap()
    }

    fn suppliers() -> Vec<Supplier> {
        serde_json::from_value(json!([
            {"_id": "s1", "name": "Alpha Alloys"},
            {"_id": "s2", "name": "Bharat Copper"}
        ]))
        .unwrap()
    }

    fn materials() -> Vec<RawMaterial> {
        serde_json::from_value(json!([{"_id": "m1", "name": "Copper rod", "code": "CU-8"}])).unwrap()
    }

    fn outage() -> ConsoleError {
        ConsoleError::Api {
            status: StatusCode::BAD_GATEWAY,
            message: "Bad gateway".into(),
        }
    }

    fn api_with_lists() -> MockInventoryApi {
        let mut api = MockInventoryApi::new();
        api.expect_list_purchase_orders().returning(|| Ok(orders()));
        api.expect_list_raw_materials().returning(|| Ok(materials()));
        api.expect_list_suppliers().returning(|| Ok(suppliers()));
        api
    }

    async fn loaded_page(api: &MockInventoryApi) -> PurchaseOrderPage {
        let mut page = PurchaseOrderPage::new();
        page.refresh(api).await.unwrap();
        page
    }

    #[rstest]
    #[case(Some(PurchaseOrderStatus::Draft), OrderAction::Edit, true)]
    #[case(Some(PurchaseOrderStatus::Draft), OrderAction::PlaceOrder, true)]
    #[case(Some(PurchaseOrderStatus::Draft), OrderAction::Delete, true)]
    #[case(Some(PurchaseOrderStatus::Draft), OrderAction::Receive, false)]
    #[case(Some(PurchaseOrderStatus::Ordered), OrderAction::Receive, true)]
    #[case(Some(PurchaseOrderStatus::Ordered), OrderAction::Cancel, true)]
    #[case(Some(PurchaseOrderStatus::Ordered), OrderAction::Edit, false)]
    #[case(Some(PurchaseOrderStatus::Ordered), OrderAction::Delete, false)]
    #[case(Some(PurchaseOrderStatus::Received), OrderAction::Cancel, false)]
    #[case(Some(PurchaseOrderStatus::Received), OrderAction::Invoice, true)]
    #[case(Some(PurchaseOrderStatus::Cancelled), OrderAction::Receive, false)]
    #[case(None, OrderAction::Invoice, true)]
    #[case(None, OrderAction::Edit, false)]
    fn action_gating(
        #[case] status: Option<PurchaseOrderStatus>,
        #[case] action: OrderAction,
        #[case] expected: bool,
    ) {
        assert_eq!(is_action_available(status, action), expected);
    }

    #[tokio::test]
    async fn visible_filters_and_sorts_newest_first() {
        let api = api_with_lists();
        let mut page = loaded_page(&api).await;

        let numbers: Vec<&str> = page.visible().iter().map(|o| o.po_number.as_str()).collect();
        assert_eq!(numbers, vec!["PO-0002", "PO-0001", "PO-0004", "PO-0003"]);

        page.set_query("alpha");
        let numbers: Vec<&str> = page.visible().iter().map(|o| o.po_number.as_str()).collect();
        assert_eq!(numbers, vec!["PO-0001", "PO-0003"]);

        page.set_query("po-0002");
        assert_eq!(page.visible().len(), 1);

        page.set_query("");
        page.set_status_filter(Some(PurchaseOrderStatus::Received));
        assert_eq!(page.visible()[0].id, "po3");

        let counts = page.status_counts();
        assert_eq!(counts[0], (PurchaseOrderStatus::Draft, 1));
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), 3);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_its_own_collection() {
        let mut api = MockInventoryApi::new();
        let mut order_calls = 0;
        api.expect_list_purchase_orders().times(2).returning(move || {
            order_calls += 1;
            if order_calls == 1 {
                Ok(orders())
            } else {
                Err(outage())
            }
        });
        let mut material_calls = 0;
        api.expect_list_raw_materials().times(2).returning(move || {
            material_calls += 1;
            if material_calls == 1 {
                Ok(materials())
            } else {
                Ok(Vec::new())
            }
        });
        api.expect_list_suppliers().times(2).returning(|| Ok(suppliers()));

        let mut page = loaded_page(&api).await;
        assert!(page.refresh(&api).await.is_err());
        assert_eq!(page.orders().len(), 4);
        assert!(page.materials().is_empty());
        assert_eq!(page.last_error(), Some("Bad gateway"));
    }

    #[tokio::test]
    async fn hidden_actions_never_reach_the_api() {
        let mut api = api_with_lists();
        api.expect_update_purchase_order().never();
        api.expect_receive_purchase_order().never();
        api.expect_cancel_purchase_order().never();
        api.expect_delete_purchase_order().never();

        let mut page = loaded_page(&api).await;
        assert_matches!(
            page.place_order(&api, "po3").await,
            Err(ConsoleError::InvalidOperation(_))
        );
        let form = ReceiveForm::dated("INV-1", NaiveDate::from_ymd_opt(2024, 5, 4).unwrap());
        assert_matches!(
            page.receive(&api, "po1", &form).await,
            Err(ConsoleError::InvalidOperation(_))
        );
        assert_matches!(
            page.cancel(&api, "po4", &AutoConfirm(true)).await,
            Err(ConsoleError::InvalidOperation(_))
        );
        assert_matches!(
            page.delete(&api, "po2", &AutoConfirm(true)).await,
            Err(ConsoleError::InvalidOperation(_))
        );
        assert_matches!(
            page.place_order(&api, "nope").await,
            Err(ConsoleError::NotFound(_))
        );
        assert!(page.last_error().is_some());
    }

    #[tokio::test]
    async fn place_order_sends_status_only_update() {
        let mut api = api_with_lists();
        api.expect_update_purchase_order()
            .withf(|id, payload| {
                id == "po1"
                    && payload.status.as_deref() == Some("ordered")
                    && payload.items.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut page = loaded_page(&api).await;
        page.place_order(&api, "po1").await.unwrap();
    }

    #[tokio::test]
    async fn receive_requires_invoice_number() {
        let mut api = api_with_lists();
        api.expect_receive_purchase_order()
            .withf(|id, payload| id == "po2" && payload.invoice_number == "INV-204")
            .times(1)
            .returning(|_, _| Ok(()));

        let mut page = loaded_page(&api).await;
        let date = NaiveDate::from_ymd_opt(2024, 5, 9).unwrap();
        assert!(page
            .receive(&api, "po2", &ReceiveForm::dated(" ", date))
            .await
            .is_err());
        page.receive(&api, "po2", &ReceiveForm::dated("INV-204", date))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn declined_cancel_sends_nothing() {
        let mut api = api_with_lists();
        api.expect_cancel_purchase_order().never();

        let mut page = loaded_page(&api).await;
        assert!(!page.cancel(&api, "po2", &AutoConfirm(false)).await.unwrap());
    }

    #[tokio::test]
    async fn confirmed_delete_removes_draft() {
        let mut api = api_with_lists();
        api.expect_delete_purchase_order()
            .withf(|id| id == "po1")
            .times(1)
            .returning(|_| Ok(()));

        let mut page = loaded_page(&api).await;
        assert!(page.delete(&api, "po1", &AutoConfirm(true)).await.unwrap());
    }

    #[tokio::test]
    async fn create_posts_validated_draft() {
        let mut api = api_with_lists();
        api.expect_create_purchase_order()
            .withf(|payload| payload.total_amount == Some(500.0))
            .times(1)
            .returning(|_| Ok(None));

        let mut page = loaded_page(&api).await;
        let mut draft = PurchaseOrderDraft::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        draft.supplier_id = "s1".into();
        let key = draft.items()[0].key;
        draft.set_item_field(key, LineItemField::Material, "m1").unwrap();
        draft.set_item_field(key, LineItemField::Weight, "10").unwrap();
        draft.set_item_field(key, LineItemField::PricePerKg, "50").unwrap();

        assert_eq!(page.create(&api, &draft).await.unwrap(), None);
    }

    #[tokio::test]
    async fn blank_material_skips_suggestion_lookup() {
        let mut api = MockInventoryApi::new();
        api.expect_suggested_suppliers().never();
        let mut page = PurchaseOrderPage::new();
        assert!(page.suggested_suppliers(&api, "  ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn invoice_uses_resolved_references() {
        let api = api_with_lists();
        let mut page = loaded_page(&api).await;

        let resolved = page.resolved(page.find("po1").unwrap());
        assert_eq!(resolved.supplier_name(), "Alpha Alloys");
        assert_eq!(resolved.items[0].material_name(), "Copper rod (CU-8)");

        let rendered = page
            .invoice("po1", &InvoiceBranding::default(), "₹")
            .unwrap();
        assert_eq!(rendered.file_name, "PO-0001-invoice.pdf");
        assert!(rendered.bytes.starts_with(b"%PDF"));
        assert_eq!(rendered.page_count, 1);
    }
}
