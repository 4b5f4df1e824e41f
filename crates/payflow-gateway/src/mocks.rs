use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use serde_json::{Value, json};

use crate::error::{GatewayError, Result};
use crate::traits::{Headers, Method, RawResponse, Transport};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub headers: Headers,
}

#[derive(Debug, Clone)]
enum Scripted {
    Response(RawResponse),
    ServerError { status: u16, body: String },
}

/// Transport that answers from a script and records every call.
///
/// Responses are queued per `(method, path)` and consumed in order; the last
/// one repeats once the queue is down to a single entry, so a settled poll
/// keeps answering the same way. Unscripted calls get a 404 error body.
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_json(self, method: Method, path: &str, status: u16, body: Value) -> Self {
        self.with_raw(method, path, status, &body.to_string())
    }

    #[must_use]
    pub fn with_raw(self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.push(method, path, Scripted::Response(RawResponse::new(status, body)))
    }

    #[must_use]
    pub fn with_server_error(self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.push(
            method,
            path,
            Scripted::ServerError {
                status,
                body: body.to_string(),
            },
        )
    }

    fn push(self, method: Method, path: &str, scripted: Scripted) -> Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(scripted);
        self
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn call_count(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .count()
    }

    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|call| format!("{} {}", call.method, call.path))
            .collect()
    }

    fn next(&self, method: Method, path: &str) -> Option<Scripted> {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = script.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Transport for MockTransport {
    fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: &Headers,
    ) -> Result<RawResponse> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                method,
                path: path.to_string(),
                body: body.cloned(),
                headers: headers.clone(),
            });

        match self.next(method, path) {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::ServerError { status, body }) => Err(GatewayError::ServerError {
                method,
                path: path.to_string(),
                status,
                body,
            }),
            None => {
                let body = json!({
                    "errors": [{
                        "code": "not_found",
                        "message": format!("no scripted response for {method} {path}"),
                    }]
                });
                Ok(RawResponse::new(404, body.to_string()))
            }
        }
    }
}
