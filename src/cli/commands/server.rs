use std::time::Duration;

use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Check server health status from the /health endpoint")]
    Health {
        #[arg(help = "Server base URL, e.g. http://localhost:3001")]
        url: String,
    },
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Health { url } => {
            let endpoint = format!("{}/health", url.trim_end_matches('/'));
            let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build()?;

            let response = match client.get(&endpoint).send().await {
                Ok(response) => response,
                Err(e) => {
                    output_error(&output_format, "Server unreachable", &[e.to_string()])?;
                    return Err(e.into());
                }
            };

            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);

            if status.is_success() && body.get("status").and_then(Value::as_str) == Some("ok") {
                output_success(
                    &output_format,
                    &format!("{} is healthy", url),
                    Some(json!({
                        "timestamp": body.get("timestamp").cloned().unwrap_or(Value::Null),
                        "uptime": body.get("uptime").cloned().unwrap_or(Value::Null),
                    })),
                )
            } else {
                output_error(&output_format, "Server is unhealthy", &[format!("HTTP {}", status)])?;
                anyhow::bail!("health check failed with HTTP {}", status)
            }
        }
    }
}
