use std::path::Path;

use payflow_gateway::GatewayConfig;
use payflow_gateway::model::{Card, OrderDetails};
use payflow_gateway::operations::Quickpay;

use super::{QpVerifyArgs, report};
use crate::error::Result;
use crate::output::Format;

pub(crate) fn verify(args: &QpVerifyArgs, config_path: &Path, format: Format) -> Result<bool> {
    let config = GatewayConfig::load(config_path)?;
    let gateway = Quickpay::from_config(&config)?;

    let card = Card {
        number: args.number.clone(),
        month: args.month,
        year: args.year,
        verification_value: args.cvd.clone(),
        name: args.name.clone(),
    };
    tracing::info!(card = ?card, order_id = %args.order_id, "verifying card");

    let composite = gateway.verify(&card, &args.currency, &OrderDetails::new(&args.order_id));
    report(&composite, format)
}
