use std::path::PathBuf;

use payflow_core::StepFault;
use thiserror::Error;

use crate::traits::Method;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Core(#[from] payflow_core::CoreError),

    #[error("failed to read gateway config '{path}'")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse gateway config '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no [{0}] section in gateway config")]
    MissingProvider(&'static str),

    #[error("failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("{method} {path} could not be completed")]
    Transport {
        method: Method,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {path} answered with server error {status}")]
    ServerError {
        method: Method,
        path: String,
        status: u16,
        body: String,
    },
}

pub type Result<T> = std::result::Result<T, GatewayError>;

impl From<GatewayError> for StepFault {
    fn from(error: GatewayError) -> Self {
        let raw = match &error {
            GatewayError::ServerError { body, .. } => Some(body.clone()),
            _ => None,
        };
        StepFault::caused_by(error, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_fault_keeps_body() {
        let error = GatewayError::ServerError {
            method: Method::Post,
            path: "/orders".to_string(),
            status: 502,
            body: "<html>bad gateway</html>".to_string(),
        };

        let fault = StepFault::from(error);

        assert_eq!(fault.raw_payload(), Some("<html>bad gateway</html>"));
        assert!(fault.to_string().contains("POST /orders"));
    }

    #[test]
    fn missing_provider_names_section() {
        let error = GatewayError::MissingProvider("quickpay");

        assert_eq!(error.to_string(), "no [quickpay] section in gateway config");
    }
}
