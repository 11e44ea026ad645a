#![allow(dead_code)]

use std::time::Duration;

use chrono::NaiveDate;
use rawstock_console::{models::PurchaseOrder, ApiClient};
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Client pointed at the mock server's `/api` prefix.
pub fn client(server: &MockServer, token: Option<&str>) -> ApiClient {
    ApiClient::new(
        &format!("{}/api", server.uri()),
        token.map(str::to_string),
        Duration::from_secs(5),
    )
    .expect("mock server URI is a valid base")
}

/// Serves empty lists for every page refresh endpoint.
pub async fn mount_empty_lists(server: &MockServer) {
    for endpoint in [
        "/api/customer/get-all",
        "/api/purchase-order/get-all",
        "/api/raw-material/get-all",
        "/api/supplier/get-all",
    ] {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(server)
            .await;
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
}

pub fn customer_json(id: &str, company: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "companyName": company,
        "status": status,
        "address": {
            "street": "Plot 14, MIDC",
            "city": "Pune",
            "state": "Maharashtra",
            "pincode": "411019",
            "country": "India"
        },
        "businessInfo": { "gstNumber": "27AAPFU0939F1ZV", "sameAsShipping": true },
        "contacts": [
            { "name": "Anita Rao", "phone": "+91 98220 12345", "isPrimary": true }
        ]
    })
}

pub fn order_json(id: &str, po_number: &str, status: &str) -> Value {
    json!({
        "_id": id,
        "poNumber": po_number,
        "status": status,
        "supplierId": { "_id": "s1", "name": "Hindalco Traders" },
        "orderDate": "2024-05-01T00:00:00.000Z",
        "items": [{
            "materialId": { "_id": "m1", "name": "Copper wire" },
            "quantity": { "weight": 10 },
            "pricing": { "pricePerKg": 50, "totalCost": 500 }
        }],
        "totalAmount": 500
    })
}

/// An order with `rows` line items, each 2.5 kg at 40.10 per kg.
pub fn long_order(rows: usize) -> PurchaseOrder {
    let items: Vec<Value> = (0..rows)
        .map(|i| {
            json!({
                "materialId": { "_id": format!("m{}", i), "name": format!("Aluminium ingot grade {}", i) },
                "quantity": { "weight": 2.5 },
                "pricing": { "pricePerKg": 40.10 },
                "storage": { "location": "Yard B", "containerCount": 1 }
            })
        })
        .collect();
    serde_json::from_value(json!({
        "_id": "po-long",
        "poNumber": "PO-2024-0099",
        "status": "received",
        "supplierId": { "_id": "s1", "name": "Hindalco Traders" },
        "orderDate": "2024-05-01",
        "invoiceNumber": "INV-778",
        "invoiceDate": "2024-05-09",
        "items": items,
        "notes": "Deliver to gate 2."
    }))
    .expect("order fixture decodes")
}
