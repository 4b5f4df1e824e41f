use std::path::Path;

use payflow_gateway::GatewayConfig;

use crate::error::Result;

const PROVIDERS: [&str; 2] = ["digital_river", "quickpay"];

pub(crate) fn run(config_path: &Path) -> Result<bool> {
    let config = GatewayConfig::load(config_path)?;
    let configured = config.configured_providers();

    println!("Config: {}", config_path.display());
    println!("Mode: {:?}", config.mode());
    println!(
        "Polling: {} attempt(s), {}ms apart",
        config.poll().max_attempts,
        config.poll().interval_ms
    );
    println!("\nProviders:");
    for provider in PROVIDERS {
        if configured.contains(&provider) {
            println!("  ✓ {provider}");
        } else {
            println!("  ✗ {provider} (not configured)");
        }
    }

    Ok(!configured.is_empty())
}
