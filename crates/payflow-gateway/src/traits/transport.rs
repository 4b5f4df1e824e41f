use std::fmt;

use payflow_core::StepFault;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::Headers;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider answer that reached us, successful or not.
///
/// Providers describe business failures in 4xx bodies, so a non-2xx status
/// here is still a response to be interpreted, not a transport error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`StepFault::Unparseable`] carrying the raw body if it is
    /// empty, not valid JSON, or valid JSON that is not an object.
    pub fn json_object(&self) -> std::result::Result<Map<String, Value>, StepFault> {
        self.decode()
    }

    /// # Errors
    ///
    /// Returns [`StepFault::Unparseable`] carrying the raw body if it does not
    /// decode into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> std::result::Result<T, StepFault> {
        serde_json::from_str(&self.body)
            .map_err(|source| StepFault::unparseable(self.body.clone(), source))
    }
}

/// The single seam through which flows reach a provider.
pub trait Transport: Send + Sync {
    /// Performs one remote call. `path` is relative to the provider's base
    /// URL and may carry a query string.
    ///
    /// # Errors
    ///
    /// Returns an error if the call could not be completed or the provider
    /// answered with a server error.
    fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: &Headers,
    ) -> Result<RawResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: &Headers,
    ) -> Result<RawResponse> {
        (**self).call(method, path, body, headers)
    }
}
