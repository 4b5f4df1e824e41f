mod check_config;
mod digital_river;
mod quickpay;

use std::path::Path;

use clap::{Args, Subcommand};
use payflow_core::CompositeOutcome;

use crate::error::Result;
use crate::output::Format;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Attach a payment source to a Digital River customer
    DrStore(DrStoreArgs),
    /// Turn a Digital River checkout into a captured order
    DrPurchase(DrPurchaseArgs),
    /// Verify a card with a Quickpay authorization that is voided afterwards
    QpVerify(QpVerifyArgs),
    /// Show which providers the config file sets up
    CheckConfig,
}

#[derive(Args)]
pub(crate) struct DrStoreArgs {
    /// Payment source to attach
    #[arg(long)]
    pub source: String,

    /// Existing customer id
    #[arg(long, conflicts_with_all = ["email", "organization"], required_unless_present = "email")]
    pub customer: Option<String>,

    /// Email of a customer to create
    #[arg(long)]
    pub email: Option<String>,

    /// Organization of a customer to create
    #[arg(long, requires = "email")]
    pub organization: Option<String>,
}

#[derive(Args)]
pub(crate) struct DrPurchaseArgs {
    /// Checkout to convert into an order
    #[arg(long)]
    pub checkout: String,
}

#[derive(Args)]
pub(crate) struct QpVerifyArgs {
    /// Card number
    #[arg(long)]
    pub number: String,

    /// Expiry month
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    pub month: u8,

    /// Expiry year, four digits
    #[arg(long, value_parser = clap::value_parser!(u16).range(2000..=2099))]
    pub year: u16,

    /// Card verification value
    #[arg(long)]
    pub cvd: String,

    /// Cardholder name
    #[arg(long)]
    pub name: String,

    /// Merchant order id
    #[arg(long)]
    pub order_id: String,

    #[arg(long, default_value = "DKK")]
    pub currency: String,
}

impl Commands {
    /// Returns whether the command's transaction succeeded.
    pub(crate) fn execute(self, config_path: &Path, format: Format) -> Result<bool> {
        match self {
            Self::DrStore(args) => digital_river::store(&args, config_path, format),
            Self::DrPurchase(args) => digital_river::purchase(&args, config_path, format),
            Self::QpVerify(args) => quickpay::verify(&args, config_path, format),
            Self::CheckConfig => check_config::run(config_path),
        }
    }
}

fn report(composite: &CompositeOutcome, format: Format) -> Result<bool> {
    print!("{}", format.formatter().format_composite(composite)?);
    Ok(composite.succeeded())
}
