use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("gateway error")]
    Gateway(#[from] payflow_gateway::GatewayError),

    #[error("failed to render output")]
    Render(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
