//! Shared HTTP client for the inventory REST API.
//!
//! Every page talks to the API through [`InventoryApi`]; [`ApiClient`] is the
//! reqwest-backed implementation. Calls are independent: no retries, no
//! caching, no cancellation of in-flight requests.

use async_trait::async_trait;
use reqwest::{header, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::{
    config::ConsoleConfig,
    errors::{ConsoleError, ConsoleResult},
    logging::RequestLog,
    models::{
        Customer, CustomerPayload, Identified, PurchaseOrder, PurchaseOrderPayload, RawMaterial,
        ReceivePayload, SuggestedSupplier, Supplier,
    },
};

/// Remote operations the console pages depend on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryApi: Send + Sync {
    async fn list_customers(&self) -> ConsoleResult<Vec<Customer>>;
    async fn get_customer(&self, id: &str) -> ConsoleResult<Customer>;
    async fn create_customer(&self, payload: &CustomerPayload) -> ConsoleResult<Option<Customer>>;
    async fn update_customer(&self, id: &str, payload: &CustomerPayload) -> ConsoleResult<()>;
    async fn delete_customer(&self, id: &str) -> ConsoleResult<()>;

    async fn list_purchase_orders(&self) -> ConsoleResult<Vec<PurchaseOrder>>;
    async fn create_purchase_order(
        &self,
        payload: &PurchaseOrderPayload,
    ) -> ConsoleResult<Option<PurchaseOrder>>;
    async fn update_purchase_order(
        &self,
        id: &str,
        payload: &PurchaseOrderPayload,
    ) -> ConsoleResult<()>;
    async fn delete_purchase_order(&self, id: &str) -> ConsoleResult<()>;
    async fn receive_purchase_order(&self, id: &str, payload: &ReceivePayload)
        -> ConsoleResult<()>;
    async fn cancel_purchase_order(&self, id: &str) -> ConsoleResult<()>;
    async fn suggested_suppliers(&self, material_id: &str)
        -> ConsoleResult<Vec<SuggestedSupplier>>;

    async fn list_raw_materials(&self) -> ConsoleResult<Vec<RawMaterial>>;
    async fn list_suppliers(&self) -> ConsoleResult<Vec<Supplier>>;
}

/// Responses come either bare or wrapped as `{"data": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> ConsoleResult<Self> {
        let base_url = Url::parse(base_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(ConsoleError::InvalidInput(format!(
                "API base URL '{}' cannot carry a path",
                base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rawstock-console/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn from_config(config: &ConsoleConfig) -> ConsoleResult<Self> {
        Self::new(
            &config.api_base_url,
            config.api_token.clone(),
            config.request_timeout(),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> ConsoleResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ConsoleError::InvalidInput("API base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> ConsoleResult<String> {
        let url = self.endpoint(segments)?;
        let log = RequestLog::start(&method, url.path());

        let mut request = self
            .http
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                log.fail(&err);
                return Err(ConsoleError::Http(err));
            }
        };

        let status = response.status();
        let text = response.text().await?;
        log.finish(status);

        if status.is_success() {
            Ok(text)
        } else {
            Err(ConsoleError::from_response(status, &text))
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, segments: &[&str]) -> ConsoleResult<T> {
        let text = self.send::<()>(Method::GET, segments, None).await?;
        decode(&text)
    }

    /// Mutation whose response body is not needed.
    async fn submit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> ConsoleResult<()> {
        self.send(method, segments, body).await.map(|_| ())
    }

    /// Mutation that usually echoes the stored record.
    async fn submit_for_record<B, T>(&self, segments: &[&str], body: &B) -> ConsoleResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned + Identified,
    {
        let text = self.send(Method::POST, segments, Some(body)).await?;
        match decode::<T>(&text) {
            Ok(record) if !record.id().is_empty() => Ok(Some(record)),
            Ok(_) => Ok(None),
            Err(err) => {
                debug!(error = %err, "Mutation response did not carry a record");
                Ok(None)
            }
        }
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> ConsoleResult<T> {
    let body = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str::<Envelope<T>>(body)
        .map(Envelope::into_inner)
        .map_err(|e| ConsoleError::Decode(e.to_string()))
}

#[async_trait]
impl InventoryApi for ApiClient {
    #[instrument(skip(self))]
    async fn list_customers(&self) -> ConsoleResult<Vec<Customer>> {
        self.fetch(&["customer", "get-all"]).await
    }

    #[instrument(skip(self))]
    async fn get_customer(&self, id: &str) -> ConsoleResult<Customer> {
        self.fetch(&["customer", "get", id]).await
    }

    #[instrument(skip(self, payload), fields(company = %payload.company_name))]
    async fn create_customer(&self, payload: &CustomerPayload) -> ConsoleResult<Option<Customer>> {
        self.submit_for_record(&["customer", "create"], payload)
            .await
    }

    #[instrument(skip(self, payload))]
    async fn update_customer(&self, id: &str, payload: &CustomerPayload) -> ConsoleResult<()> {
        self.submit(Method::PUT, &["customer", "update", id], Some(payload))
            .await
    }

    #[instrument(skip(self))]
    async fn delete_customer(&self, id: &str) -> ConsoleResult<()> {
        self.submit::<()>(Method::DELETE, &["customer", "delete", id], None)
            .await
    }

    #[instrument(skip(self))]
    async fn list_purchase_orders(&self) -> ConsoleResult<Vec<PurchaseOrder>> {
        self.fetch(&["purchase-order", "get-all"]).await
    }

    #[instrument(skip(self, payload))]
    async fn create_purchase_order(
        &self,
        payload: &PurchaseOrderPayload,
    ) -> ConsoleResult<Option<PurchaseOrder>> {
        self.submit_for_record(&["purchase-order", "create"], payload)
            .await
    }

    #[instrument(skip(self, payload))]
    async fn update_purchase_order(
        &self,
        id: &str,
        payload: &PurchaseOrderPayload,
    ) -> ConsoleResult<()> {
        self.submit(Method::PUT, &["purchase-order", "update", id], Some(payload))
            .await
    }

    #[instrument(skip(self))]
    async fn delete_purchase_order(&self, id: &str) -> ConsoleResult<()> {
        self.submit::<()>(Method::DELETE, &["purchase-order", "delete", id], None)
            .await
    }

    #[instrument(skip(self, payload), fields(invoice = %payload.invoice_number))]
    async fn receive_purchase_order(
        &self,
        id: &str,
        payload: &ReceivePayload,
    ) -> ConsoleResult<()> {
        self.submit(Method::POST, &["purchase-order", "receive", id], Some(payload))
            .await
    }

    #[instrument(skip(self))]
    async fn cancel_purchase_order(&self, id: &str) -> ConsoleResult<()> {
        let empty = serde_json::Map::new();
        self.submit(Method::POST, &["purchase-order", "cancel", id], Some(&empty))
            .await
    }

    #[instrument(skip(self))]
    async fn suggested_suppliers(&self, material_id: &str) -> ConsoleResult<Vec<SuggestedSupplier>> {
        self.fetch(&["purchase-order", "suggested-suppliers", material_id])
            .await
    }

    #[instrument(skip(self))]
    async fn list_raw_materials(&self) -> ConsoleResult<Vec<RawMaterial>> {
        self.fetch(&["raw-material", "get-all"]).await
    }

    #[instrument(skip(self))]
    async fn list_suppliers(&self) -> ConsoleResult<Vec<Supplier>> {
        self.fetch(&["supplier", "get-all"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, None, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn endpoints_extend_base_path() {
        let api = client("http://localhost:5000/api/");
        let url = api.endpoint(&["purchase-order", "receive", "64f0"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/purchase-order/receive/64f0");

        let api = client("http://localhost:5000/api");
        let url = api.endpoint(&["customer", "get-all"]).unwrap();
        assert_eq!(url.path(), "/api/customer/get-all");
    }

    #[test]
    fn ids_are_percent_encoded() {
        let api = client("http://localhost:5000");
        let url = api.endpoint(&["customer", "get", "a/b c"]).unwrap();
        assert_eq!(url.path(), "/customer/get/a%2Fb%20c");
    }

    #[test]
    fn decodes_bare_and_wrapped_lists() {
        let bare: Vec<Supplier> = decode(r#"[{"_id":"s1","name":"Alpha"}]"#).unwrap();
        assert_eq!(bare.len(), 1);

        let wrapped: Vec<Supplier> =
            decode(r#"{"success":true,"data":[{"_id":"s1"},{"_id":"s2"}]}"#).unwrap();
        assert_eq!(wrapped.len(), 2);
    }

    #[test]
    fn undecodable_body_is_reported() {
        let result: ConsoleResult<Vec<Supplier>> = decode(r#"{"items": 3}"#);
        assert!(matches!(result, Err(ConsoleError::Decode(_))));
    }

    #[test]
    fn blank_token_is_dropped() {
        let api = ApiClient::new("http://x", Some("  ".into()), Duration::from_secs(1)).unwrap();
        assert!(api.token.is_none());
    }
}
