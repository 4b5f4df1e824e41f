use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use crate::error::{GatewayError, Result};
use crate::traits::{Auth, Headers, Method, RawResponse, Transport};

/// Blocking HTTP transport bound to one provider base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GatewayError::ClientBuild)?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    fn apply_headers(request: RequestBuilder, headers: &Headers) -> RequestBuilder {
        let request = headers
            .fields()
            .fold(request, |request, (name, value)| request.header(name, value));

        match headers.auth() {
            Some(Auth::Bearer(token)) => request.bearer_auth(token),
            Some(Auth::Basic { username, password }) => request.basic_auth(username, Some(password)),
            None => request,
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

impl Transport for HttpTransport {
    fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: &Headers,
    ) -> Result<RawResponse> {
        let url = self.build_url(path);
        let transport_error = |source| GatewayError::Transport {
            method,
            path: path.to_string(),
            source,
        };

        let mut request = Self::apply_headers(self.client.request(method.into(), &url), headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, %url, "sending provider request");
        let response = request.send().map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(transport_error)?;
        debug!(%method, %url, status, "provider answered");

        if status >= 500 {
            return Err(GatewayError::ServerError {
                method,
                path: path.to_string(),
                status,
                body,
            });
        }
        Ok(RawResponse::new(status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(base, Duration::from_secs(1)).expect("client builds")
    }

    #[test]
    fn joins_base_and_path_with_single_slash() {
        assert_eq!(
            transport("https://api.example/").build_url("/orders"),
            "https://api.example/orders"
        );
        assert_eq!(
            transport("https://api.example").build_url("orders"),
            "https://api.example/orders"
        );
    }

    #[test]
    fn keeps_query_suffix() {
        assert_eq!(
            transport("https://api.example").build_url("/payments/1/authorize?synchronized"),
            "https://api.example/payments/1/authorize?synchronized"
        );
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        let transport = transport("http://127.0.0.1:9");

        let error = transport
            .call(Method::Get, "/customers/c1", None, &Headers::new())
            .expect_err("nothing listens on the discard port");

        assert!(matches!(error, GatewayError::Transport { method: Method::Get, .. }));
    }
}
