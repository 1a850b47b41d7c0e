use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config::AppConfig;

/// Output a success message in the appropriate format.
/// `data` fields are merged into the JSON object; in text mode each is printed as `key: value`.
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(fields))) = (response.as_object_mut(), data) {
                target.extend(fields);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            if let Some(Value::Object(fields)) = data {
                for (key, value) in fields {
                    match value {
                        Value::String(s) => println!("  {}: {}", key, s),
                        other => println!("  {}: {}", key, other),
                    }
                }
            }
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, details: &[String]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let response = json!({
                "success": false,
                "error": message,
                "details": details,
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
            for detail in details {
                eprintln!("  - {}", detail);
            }
        }
    }
    Ok(())
}

/// Validate the environment for commands that need it, reporting violations the CLI way
pub fn require_config(output_format: &OutputFormat) -> anyhow::Result<AppConfig> {
    match AppConfig::from_env() {
        Ok(config) => Ok(config),
        Err(err) => {
            output_error(output_format, "Invalid environment variables", err.violations())?;
            Err(err.into())
        }
    }
}
