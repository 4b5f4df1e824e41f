use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StepFault;

/// Structured data extracted from a remote response.
pub type Params = IndexMap<String, Value>;

/// Message carried by every successful outcome built with [`Outcome::success`].
pub const SUCCESS_MESSAGE: &str = "OK";

/// Leading text of the message synthesized for a faulted step.
pub const FAULT_DIAGNOSTIC: &str = "Invalid response received from the payment provider.";

/// One structured error reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub description: String,
    pub code: String,
}

impl ErrorEntry {
    #[must_use]
    pub fn new(description: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description, self.code)
    }
}

/// The result of one remote call.
///
/// Built once per call and never mutated afterwards; the `with_*` methods
/// consume the value and are meant for construction only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    succeeded: bool,
    message: String,
    #[serde(default)]
    params: Params,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    authorization: Option<String>,
}

impl Outcome {
    #[must_use]
    pub fn new(
        succeeded: bool,
        message: impl Into<String>,
        params: Params,
        authorization: Option<String>,
    ) -> Self {
        Self {
            succeeded,
            message: message.into(),
            params,
            authorization,
        }
    }

    #[must_use]
    pub fn success(params: Params) -> Self {
        Self::new(true, SUCCESS_MESSAGE, params, None)
    }

    #[must_use]
    pub fn failure(message: impl Into<String>, params: Params) -> Self {
        Self::new(false, message, params, None)
    }

    /// A provider rejection; the message joins every `description (code)`
    /// pair with a single space.
    #[must_use]
    pub fn rejected(errors: &[ErrorEntry], params: Params) -> Self {
        let message = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        Self::failure(message, params)
    }

    /// A successful outcome that stands in for a remote call that was not
    /// needed, forwarding an existing handle.
    #[must_use]
    pub fn pass_through(authorization: Option<String>) -> Self {
        Self::new(true, SUCCESS_MESSAGE, Params::new(), authorization)
    }

    /// The failed outcome recorded in place of a step that faulted.
    #[must_use]
    pub fn faulted(fault: &StepFault) -> Self {
        let mut params = Params::new();
        params.insert("fault".to_string(), Value::String(fault.to_string()));

        let message = match fault.raw_payload() {
            Some(raw) => {
                params.insert("raw_response".to_string(), Value::String(raw.to_string()));
                format!("{FAULT_DIAGNOSTIC} (The raw response returned by the API was {raw:?})")
            }
            None => format!("{FAULT_DIAGNOSTIC} ({fault})"),
        };

        Self::failure(message, params)
    }

    #[must_use]
    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// A parameter rendered as a string, accepting both JSON strings and
    /// numbers since providers are inconsistent about ids.
    #[must_use]
    pub fn param_str(&self, key: &str) -> Option<String> {
        match self.params.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    #[must_use]
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_uses_fixed_message() {
        let outcome = Outcome::success(Params::new());

        assert!(outcome.succeeded());
        assert_eq!(outcome.message(), "OK");
        assert_eq!(outcome.authorization(), None);
    }

    #[test]
    fn rejection_joins_error_entries_with_spaces() {
        let errors = [
            ErrorEntry::new("Card declined", "card_declined"),
            ErrorEntry::new("Insufficient funds", "insufficient_funds"),
        ];

        let outcome = Outcome::rejected(&errors, Params::new());

        assert!(!outcome.succeeded());
        assert_eq!(
            outcome.message(),
            "Card declined (card_declined) Insufficient funds (insufficient_funds)"
        );
    }

    #[test]
    fn faulted_outcome_carries_raw_payload() {
        let source = serde_json::from_str::<Value>("<html>").expect_err("invalid json");
        let fault = StepFault::unparseable("<html>", source);

        let outcome = Outcome::faulted(&fault);

        assert!(!outcome.succeeded());
        assert!(outcome.message().starts_with(FAULT_DIAGNOSTIC));
        assert!(outcome.message().contains("\"<html>\""));
        assert_eq!(outcome.param("raw_response"), Some(&json!("<html>")));
    }

    #[test]
    fn faulted_outcome_without_payload_names_the_fault() {
        let outcome = Outcome::faulted(&StepFault::transport("timed out"));

        assert!(outcome.message().contains("timed out"));
        assert!(outcome.param("raw_response").is_none());
    }

    #[test]
    fn param_str_accepts_numbers_and_strings() {
        let outcome = Outcome::success(Params::new())
            .with_param("id", 42)
            .with_param("token", "tok_1")
            .with_param("flag", true);

        assert_eq!(outcome.param_str("id").as_deref(), Some("42"));
        assert_eq!(outcome.param_str("token").as_deref(), Some("tok_1"));
        assert_eq!(outcome.param_str("flag"), None);
    }

    #[test]
    fn pass_through_forwards_handle() {
        let outcome = Outcome::pass_through(Some("cus_1".to_string()));

        assert!(outcome.succeeded());
        assert_eq!(outcome.authorization(), Some("cus_1"));
    }
}
