use std::path::Path;

use payflow_gateway::GatewayConfig;
use payflow_gateway::model::{CustomerDetails, CustomerRef};
use payflow_gateway::operations::DigitalRiver;

use super::{DrPurchaseArgs, DrStoreArgs, report};
use crate::error::Result;
use crate::output::Format;

pub(crate) fn store(args: &DrStoreArgs, config_path: &Path, format: Format) -> Result<bool> {
    let config = GatewayConfig::load(config_path)?;
    let gateway = DigitalRiver::from_config(&config)?;

    let customer = match &args.customer {
        Some(id) => CustomerRef::Existing(id.clone()),
        None => CustomerRef::New(CustomerDetails {
            email: args.email.clone(),
            organization: args.organization.clone(),
            ..CustomerDetails::default()
        }),
    };

    report(&gateway.store(&args.source, &customer), format)
}

pub(crate) fn purchase(args: &DrPurchaseArgs, config_path: &Path, format: Format) -> Result<bool> {
    let config = GatewayConfig::load(config_path)?;
    let gateway = DigitalRiver::from_config(&config)?;

    report(&gateway.purchase(&args.checkout), format)
}
