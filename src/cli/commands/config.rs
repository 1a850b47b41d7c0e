use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_success, require_config};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Validate the environment and print the resolved settings")]
    Check,
}

pub async fn handle(cmd: ConfigCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Check => {
            let config = require_config(&output_format)?;

            // Secrets are never echoed back
            let summary = json!({
                "environment": config.environment.as_str(),
                "port": config.port,
                "log_level": config.log_level.as_str(),
                "cors_origin": config.security.cors_origin,
                "user_store": format!("{:?}", config.database.store).to_lowercase(),
                "jwt_expires_in_secs": config.security.jwt_expires_in.as_secs(),
                "refresh_token_expires_in_secs": config.security.refresh_token_expires_in.as_secs(),
                "rate_limit_window_ms": config.api.rate_limit_window.as_millis() as u64,
                "rate_limit_max_requests": config.api.rate_limit_max_requests,
                "identity_provider_configured": config.identity.aurora_api_url.is_some(),
            });

            output_success(&output_format, "Environment is valid", Some(summary))
        }
    }
}
