use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use payflow_core::BoundedPoller;
use serde::Deserialize;

use crate::error::{GatewayError, Result};
use crate::traits::{Auth, HeaderSource, Headers};

const DEFAULT_DIGITAL_RIVER_URL: &str = "https://api.digitalriver.com";
const DEFAULT_QUICKPAY_URL: &str = "https://api.quickpay.net";
const QUICKPAY_API_VERSION: &str = "v10";
const JSON: &str = "application/json";

/// Selects between a provider's test and live endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Test,
    Live,
}

/// Budget for waiting on asynchronously settled provider state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollSettings {
    pub max_attempts: u32,
    pub interval_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            interval_ms: 500,
        }
    }
}

impl PollSettings {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// # Errors
    ///
    /// Returns an error if `max_attempts` is zero.
    pub fn poller(&self) -> Result<BoundedPoller> {
        Ok(BoundedPoller::new(self.max_attempts, self.interval())?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl HttpSettings {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DigitalRiverConfig {
    token: String,
    #[serde(default = "default_digital_river_url")]
    test_url: String,
    #[serde(default = "default_digital_river_url")]
    live_url: String,
}

fn default_digital_river_url() -> String {
    DEFAULT_DIGITAL_RIVER_URL.to_string()
}

impl DigitalRiverConfig {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            test_url: default_digital_river_url(),
            live_url: default_digital_river_url(),
        }
    }

    #[must_use]
    pub fn base_url(&self, mode: Mode) -> &str {
        match mode {
            Mode::Test => &self.test_url,
            Mode::Live => &self.live_url,
        }
    }
}

impl fmt::Debug for DigitalRiverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitalRiverConfig")
            .field("token", &"[FILTERED]")
            .field("test_url", &self.test_url)
            .field("live_url", &self.live_url)
            .finish()
    }
}

impl HeaderSource for DigitalRiverConfig {
    fn headers(&self) -> Headers {
        Headers::new()
            .with("Content-Type", JSON)
            .with("Accept", JSON)
            .with_auth(Auth::Bearer(self.token.clone()))
    }
}

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuickpayConfig {
    api_key: String,
    #[serde(default = "default_quickpay_url")]
    url: String,
}

fn default_quickpay_url() -> String {
    DEFAULT_QUICKPAY_URL.to_string()
}

impl QuickpayConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            url: default_quickpay_url(),
        }
    }

    /// Quickpay serves test and live traffic from one host; the API key
    /// decides which account is charged.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for QuickpayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuickpayConfig")
            .field("api_key", &"[FILTERED]")
            .field("url", &self.url)
            .finish()
    }
}

impl HeaderSource for QuickpayConfig {
    fn headers(&self) -> Headers {
        Headers::new()
            .with("Content-Type", JSON)
            .with("Accept", JSON)
            .with("Accept-Version", QUICKPAY_API_VERSION)
            .with("User-Agent", concat!("payflow/", env!("CARGO_PKG_VERSION")))
            .with_auth(Auth::Basic {
                username: String::new(),
                password: self.api_key.clone(),
            })
    }
}

/// Everything needed to talk to the configured providers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default)]
    mode: Mode,
    #[serde(default)]
    poll: PollSettings,
    #[serde(default)]
    http: HttpSettings,
    digital_river: Option<DigitalRiverConfig>,
    quickpay: Option<QuickpayConfig>,
}

impl FromStr for GatewayConfig {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl GatewayConfig {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid config.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| GatewayError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config = content
            .parse::<Self>()
            .map_err(|source| GatewayError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            path = %path.display(),
            providers = ?config.configured_providers(),
            "loaded gateway config"
        );
        Ok(config)
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn poll(&self) -> &PollSettings {
        &self.poll
    }

    #[must_use]
    pub fn http(&self) -> &HttpSettings {
        &self.http
    }

    /// # Errors
    ///
    /// Returns [`GatewayError::MissingProvider`] if there is no
    /// `[digital_river]` section.
    pub fn digital_river(&self) -> Result<&DigitalRiverConfig> {
        self.digital_river
            .as_ref()
            .ok_or(GatewayError::MissingProvider("digital_river"))
    }

    /// # Errors
    ///
    /// Returns [`GatewayError::MissingProvider`] if there is no `[quickpay]`
    /// section.
    pub fn quickpay(&self) -> Result<&QuickpayConfig> {
        self.quickpay
            .as_ref()
            .ok_or(GatewayError::MissingProvider("quickpay"))
    }

    #[must_use]
    pub fn configured_providers(&self) -> Vec<&'static str> {
        let mut providers = Vec::new();
        if self.digital_river.is_some() {
            providers.push("digital_river");
        }
        if self.quickpay.is_some() {
            providers.push("quickpay");
        }
        providers
    }

    #[cfg(any(test, feature = "testing"))]
    #[must_use]
    pub fn with_digital_river(mut self, config: DigitalRiverConfig) -> Self {
        self.digital_river = Some(config);
        self
    }

    #[cfg(any(test, feature = "testing"))]
    #[must_use]
    pub fn with_quickpay(mut self, config: QuickpayConfig) -> Self {
        self.quickpay = Some(config);
        self
    }

    #[cfg(any(test, feature = "testing"))]
    #[must_use]
    pub fn with_poll(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }
}
