use payflow_core::{Outcome, Params, SUCCESS_MESSAGE};
use serde_json::{Map, Value, json};

use crate::model::{Address, Card, Money, OrderDetails, Subscription};

const APPROVED: &str = "20000";
const UNKNOWN_ERROR: &str = "Unknown error - please contact QuickPay";
const ORDER_ID_LIMIT: usize = 20;
const SUBSCRIPTION_ACQUIRER: &str = "clearhaus";

/// Appends the flag that makes Quickpay answer only after the operation has
/// been processed by the acquirer.
pub(super) fn synchronized(path: &str) -> String {
    format!("{path}?synchronized")
}

/// Reads a Quickpay answer.
///
/// A call succeeded when the HTTP status is 2xx, the body carries no
/// `errors`, and the most recent operation (if any) was approved.
pub(super) fn interpret(status_ok: bool, body: Value) -> Outcome {
    let succeeded = status_ok && successful(&body);
    let message = if succeeded {
        SUCCESS_MESSAGE.to_string()
    } else {
        message_from(&body)
    };
    let authorization = authorization_from(&body);
    let params: Params = match body {
        Value::Object(fields) => fields.into_iter().collect(),
        _ => Params::new(),
    };

    Outcome::new(succeeded, message, params, authorization)
}

fn successful(body: &Value) -> bool {
    let has_errors = body.get("errors").is_some_and(|errors| !errors.is_null());
    let rejected_operation = last_operation(body)
        .is_some_and(|operation| operation.get("qp_status_code").and_then(Value::as_str) != Some(APPROVED));

    !(has_errors || rejected_operation)
}

fn last_operation(body: &Value) -> Option<&Value> {
    body.get("operations")?.as_array()?.last()
}

fn message_from(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .or_else(|| last_operation(body)?.get("qp_status_msg")?.as_str())
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}

fn authorization_from(body: &Value) -> Option<String> {
    let handle = body
        .get("token")
        .filter(|token| !token.is_null())
        .or_else(|| body.get("id"))?;

    match handle {
        Value::String(handle) => Some(handle.clone()),
        Value::Number(handle) => Some(handle.to_string()),
        _ => None,
    }
}

pub(super) fn format_order_id(order_id: &str) -> String {
    order_id
        .chars()
        .filter(|c| *c != '#')
        .take(ORDER_ID_LIMIT)
        .collect()
}

pub(super) fn payment_body(money: &Money, order: &OrderDetails) -> Value {
    let mut body = Map::new();
    body.insert("currency".to_string(), json!(money.currency()));
    body.insert("order_id".to_string(), json!(format_order_id(&order.order_id)));
    if let Some(address) = &order.billing_address {
        body.insert("invoice_address".to_string(), address_body(address));
    }
    if let Some(address) = &order.shipping_address {
        body.insert("shipping_address".to_string(), address_body(address));
    }
    Value::Object(body)
}

fn address_body(address: &Address) -> Value {
    json!({
        "name": address.name,
        "street": address.address1,
        "city": address.city,
        "region": address.address2,
        "zip_code": address.zip,
        "country_code": address.country,
    })
}

pub(super) fn card_body(card: &Card) -> Value {
    json!({
        "number": card.number,
        "cvd": card.verification_value,
        "expiration": card.expiry(),
        "issued_to": card.name,
    })
}

pub(super) fn subscription_body(subscription: &Subscription) -> Value {
    json!({
        "currency": subscription.money.currency(),
        "order_id": format_order_id(&subscription.order_id),
        "description": format_order_id(&subscription.description),
    })
}

pub(super) fn subscription_authorize_body(subscription: &Subscription, card: &Card) -> Value {
    json!({
        "amount": subscription.money.amount(),
        "card": card_body(card),
        "acquirer": SUBSCRIPTION_ACQUIRER,
    })
}

pub(super) fn token_body(token: &str) -> Value {
    json!({ "token": token })
}
