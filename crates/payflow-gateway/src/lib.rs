//! Provider transaction flows for Digital River and Quickpay.
//!
//! Each business operation is assembled from single remote calls and run
//! through [`payflow_core::StepSequencer`]. The remote side is reached only
//! through the [`traits::Transport`] seam, so every flow can be driven by
//! [`providers::HttpTransport`] in production and by a scripted transport in
//! tests.

mod config;
mod error;
pub mod model;
pub mod operations;
pub mod providers;
pub mod traits;

#[cfg(any(test, feature = "testing"))]
pub mod mocks;

pub use config::{
    DigitalRiverConfig, GatewayConfig, HttpSettings, Mode, PollSettings, QuickpayConfig,
};
pub use error::{GatewayError, Result};
