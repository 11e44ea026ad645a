use strum::{AsRefStr, Display, EnumString};
use tracing::{error, info, instrument, warn};

use crate::{
    client::InventoryApi,
    errors::{ConsoleError, ConsoleResult},
    models::{Address, Contact, Customer, CustomerStatus},
    services::{contains_ignore_case, customer_form::CustomerForm, Confirm},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ViewMode {
    #[default]
    List,
    Grid,
}

/// Search rule of the customer page: company name or `"{city} {state}"`.
pub fn matches_query(customer: &Customer, query: &str) -> bool {
    contains_ignore_case(&customer.company_name, query)
        || contains_ignore_case(&customer.address.location(), query)
}

/// Header counters of the customer page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CustomerStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

/// What the details modal shows.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDetails {
    pub customer: Customer,
    pub contacts: Vec<Contact>,
    pub billing_address: Option<Address>,
    /// Set when the live fetch failed and the list copy is shown instead.
    pub stale: bool,
}

impl CustomerDetails {
    fn from_customer(customer: Customer, stale: bool) -> Self {
        let contacts = customer.sorted_contacts().into_iter().cloned().collect();
        let billing_address = customer.billing_address().cloned();
        Self {
            customer,
            contacts,
            billing_address,
            stale,
        }
    }
}

/// State of the customer page.
#[derive(Debug, Default)]
pub struct CustomerPage {
    customers: Vec<Customer>,
    query: String,
    status_filter: Option<CustomerStatus>,
    view: ViewMode,
    last_error: Option<String>,
}

impl CustomerPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_status_filter(&mut self, status: Option<CustomerStatus>) {
        self.status_filter = status;
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn find(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// Customers passing the search and status filter, by company name.
    pub fn visible(&self) -> Vec<&Customer> {
        let mut visible: Vec<&Customer> = self
            .customers
            .iter()
            .filter(|c| matches_query(c, &self.query))
            .filter(|c| match self.status_filter {
                Some(status) => c.status() == Some(status),
                None => true,
            })
            .collect();
        visible.sort_by_key(|c| c.company_name.to_lowercase());
        visible
    }

    pub fn stats(&self) -> CustomerStats {
        let mut stats = CustomerStats {
            total: self.customers.len(),
            ..Default::default()
        };
        for customer in &self.customers {
            match customer.status() {
                Some(CustomerStatus::Active) => stats.active += 1,
                Some(CustomerStatus::Inactive) => stats.inactive += 1,
                None => {}
            }
        }
        stats
    }

    /// Re-fetches the list. A failure keeps the previous list on screen.
    #[instrument(skip(self, api))]
    pub async fn refresh(&mut self, api: &dyn InventoryApi) -> ConsoleResult<()> {
        match api.list_customers().await {
            Ok(customers) => {
                info!(count = customers.len(), "Customers loaded");
                self.customers = customers;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                error!(error = %err, "Failed to fetch customers");
                self.last_error = Some(err.alert_message());
                Err(err)
            }
        }
    }

    async fn refresh_after_mutation(&mut self, api: &dyn InventoryApi) {
        if self.refresh(api).await.is_err() {
            warn!("Customer list left stale after a successful change");
        }
    }

    fn record_failure(&mut self, err: ConsoleError) -> ConsoleError {
        self.last_error = Some(err.alert_message());
        err
    }

    /// Loads the details view, falling back to the list copy when the fetch fails.
    #[instrument(skip(self, api))]
    pub async fn details(&mut self, api: &dyn InventoryApi, id: &str) -> ConsoleResult<CustomerDetails> {
        match api.get_customer(id).await {
            Ok(customer) => Ok(CustomerDetails::from_customer(customer, false)),
            Err(err) => match self.find(id).cloned() {
                Some(cached) => {
                    warn!(error = %err, "Showing cached customer details");
                    Ok(CustomerDetails::from_customer(cached, true))
                }
                None => Err(self.record_failure(err)),
            },
        }
    }

    #[instrument(skip(self, api, form))]
    pub async fn create(
        &mut self,
        api: &dyn InventoryApi,
        form: &CustomerForm,
    ) -> ConsoleResult<Option<Customer>> {
        let payload = form.submit().map_err(|e| self.record_failure(e))?;
        let created = api
            .create_customer(&payload)
            .await
            .map_err(|e| self.record_failure(e))?;
        info!(company = %payload.company_name, "Customer created");
        self.refresh_after_mutation(api).await;
        Ok(created)
    }

    #[instrument(skip(self, api, form))]
    pub async fn update(
        &mut self,
        api: &dyn InventoryApi,
        id: &str,
        form: &CustomerForm,
    ) -> ConsoleResult<()> {
        let payload = form.submit().map_err(|e| self.record_failure(e))?;
        api.update_customer(id, &payload)
            .await
            .map_err(|e| self.record_failure(e))?;
        info!(customer_id = %id, "Customer updated");
        self.refresh_after_mutation(api).await;
        Ok(())
    }

    /// Deletes after explicit confirmation. Returns `false` when declined;
    /// nothing is sent in that case.
    #[instrument(skip(self, api, confirm))]
    pub async fn delete(
        &mut self,
        api: &dyn InventoryApi,
        id: &str,
        confirm: &dyn Confirm,
    ) -> ConsoleResult<bool> {
        let name = self
            .find(id)
            .map(|c| c.company_name.clone())
            .unwrap_or_else(|| id.to_string());
        let prompt = format!("Delete customer \"{}\"? This cannot be undone.", name);
        if !confirm.confirm(&prompt) {
            info!(customer_id = %id, "Customer deletion declined");
            return Ok(false);
        }

        api.delete_customer(id)
            .await
            .map_err(|e| self.record_failure(e))?;
        info!(customer_id = %id, "Customer deleted");
        self.refresh_after_mutation(api).await;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockInventoryApi;
    use crate::services::AutoConfirm;
    use reqwest::StatusCode;
    use serde_json::json;

    fn customers() -> Vec<Customer> {
        serde_json::from_value(json!([
            {"_id": "c1", "companyName": "Deccan Wires", "status": "active",
             "address": {"city": "Pune", "state": "Maharashtra"}},
            {"_id": "c2", "companyName": "Ambica Steel", "status": "inactive",
             "address": {"city": "Rajkot", "state": "Gujarat"}},
            {"_id": "c3", "companyName": "Coastal Cables", "status": "active",
             "address": {"city": "Navi Mumbai", "state": "Maharashtra"}}
        ]))
        .unwrap()
    }

    fn outage() -> ConsoleError {
        ConsoleError::Api {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "Service unavailable".into(),
        }
    }

    async fn loaded_page(api: &MockInventoryApi) -> CustomerPage {
        let mut page = CustomerPage::new();
        page.refresh(api).await.unwrap();
        page
    }

    #[test]
    fn query_matches_name_or_location_case_insensitively() {
        let list = customers();
        assert!(matches_query(&list[0], "deccan"));
        assert!(matches_query(&list[0], "PUNE"));
        assert!(matches_query(&list[0], "pune maha"));
        assert!(matches_query(&list[1], "gujarat"));
        assert!(!matches_query(&list[1], "pune"));
        assert!(matches_query(&list[1], ""));
    }

    #[tokio::test]
    async fn visible_applies_query_status_and_order() {
        let mut api = MockInventoryApi::new();
        api.expect_list_customers()
            .times(1)
            .returning(|| Ok(customers()));
        let mut page = loaded_page(&api).await;

        let names: Vec<&str> = page.visible().iter().map(|c| c.company_name.as_str()).collect();
        assert_eq!(names, vec!["Ambica Steel", "Coastal Cables", "Deccan Wires"]);

        page.set_query("maharashtra");
        let names: Vec<&str> = page.visible().iter().map(|c| c.company_name.as_str()).collect();
        assert_eq!(names, vec!["Coastal Cables", "Deccan Wires"]);

        page.set_query("");
        page.set_status_filter(Some(CustomerStatus::Inactive));
        assert_eq!(page.visible().len(), 1);

        assert_eq!(
            page.stats(),
            CustomerStats {
                total: 3,
                active: 2,
                inactive: 1
            }
        );
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let mut api = MockInventoryApi::new();
        let mut calls = 0;
        api.expect_list_customers().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(customers())
            } else {
                Err(outage())
            }
        });

        let mut page = loaded_page(&api).await;
        assert!(page.refresh(&api).await.is_err());
        assert_eq!(page.customers().len(), 3);
        assert_eq!(page.last_error(), Some("Service unavailable"));
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let mut api = MockInventoryApi::new();
        api.expect_list_customers()
            .times(1)
            .returning(|| Ok(customers()));
        api.expect_delete_customer().never();

        let mut page = loaded_page(&api).await;
        let prompts = std::sync::Mutex::new(Vec::new());
        let confirm = |prompt: &str| {
            prompts.lock().unwrap().push(prompt.to_string());
            false
        };

        let deleted = page.delete(&api, "c1", &confirm).await.unwrap();
        assert!(!deleted);
        assert_eq!(page.customers().len(), 3);
        assert!(prompts.lock().unwrap()[0].contains("Deccan Wires"));
    }

    #[tokio::test]
    async fn confirmed_delete_calls_api_and_refetches() {
        let mut api = MockInventoryApi::new();
        let mut calls = 0;
        api.expect_list_customers().times(2).returning(move || {
            calls += 1;
            let mut list = customers();
            if calls > 1 {
                list.retain(|c| c.id != "c2");
            }
            Ok(list)
        });
        api.expect_delete_customer()
            .withf(|id| id == "c2")
            .times(1)
            .returning(|_| Ok(()));

        let mut page = loaded_page(&api).await;
        assert!(page.delete(&api, "c2", &AutoConfirm(true)).await.unwrap());
        assert_eq!(page.customers().len(), 2);
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_api() {
        let mut api = MockInventoryApi::new();
        api.expect_create_customer().never();

        let mut page = CustomerPage::new();
        let form = CustomerForm::new();
        let result = page.create(&api, &form).await;
        assert!(matches!(result, Err(ConsoleError::ValidationError(_))));
        assert!(page.last_error().is_some());
    }

    #[tokio::test]
    async fn details_fall_back_to_list_copy() {
        let mut api = MockInventoryApi::new();
        api.expect_list_customers()
            .times(1)
            .returning(|| Ok(customers()));
        api.expect_get_customer().returning(|_| Err(outage()));

        let mut page = loaded_page(&api).await;
        let details = page.details(&api, "c3").await.unwrap();
        assert!(details.stale);
        assert_eq!(details.customer.company_name, "Coastal Cables");

        assert!(page.details(&api, "missing").await.is_err());
    }
}
