use payflow_core::{ErrorEntry, Outcome, Params};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::model::{Address, CustomerDetails};
use crate::traits::RawResponse;

pub(super) const ACCEPTED: &str = "accepted";

#[derive(Debug, Deserialize)]
pub(super) struct Customer {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Source {
    pub id: String,
    pub customer_id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct Order {
    pub id: String,
    pub state: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub charges: Vec<Charge>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OrderItem {
    pub id: String,
    pub quantity: u32,
    #[serde(default)]
    pub sku_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Charge {
    pub id: String,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Capture {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct Fulfillment {
    pub id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    message: String,
}

/// Order lines in the shape a fulfillment request expects.
pub(super) fn fulfillment_items(items: &[OrderItem]) -> Value {
    items
        .iter()
        .map(|item| {
            json!({
                "itemId": item.id,
                "quantity": item.quantity,
                "skuId": item.sku_id,
            })
        })
        .collect()
}

/// Turns a non-2xx answer into a failed outcome carrying the provider's
/// `message (code)` list. A body without decodable errors (empty, HTML from
/// a proxy) still reads as a rejection, named by its status.
pub(super) fn rejection(response: &RawResponse) -> Outcome {
    let errors: Vec<ErrorEntry> = response
        .decode::<ErrorBody>()
        .map(|body| body.errors)
        .unwrap_or_default()
        .into_iter()
        .map(|error| ErrorEntry::new(error.message, error.code))
        .collect();

    if errors.is_empty() {
        let mut params = Params::new();
        if !response.body.trim().is_empty() {
            params.insert("raw_response".to_string(), Value::String(response.body.clone()));
        }
        return Outcome::failure(
            format!("request failed with status {}", response.status),
            params,
        );
    }
    Outcome::rejected(&errors, Params::new())
}

pub(super) fn customer_body(details: &CustomerDetails) -> Value {
    let address = details.billing_address.clone().unwrap_or_default();
    json!({
        "email": details.email,
        "shipping": {
            "name": address.name,
            "organization": details.organization,
            "phone": details.phone,
            "address": address_body(&address),
        }
    })
}

fn address_body(address: &Address) -> Value {
    json!({
        "line1": address.address1,
        "line2": address.address2,
        "city": address.city,
        "state": address.state,
        "postalCode": address.zip,
        "country": address.country,
    })
}
