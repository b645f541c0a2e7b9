use anyhow::Context;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::Database;

/// Open the pool described by the environment (`.env` included)
pub async fn connect_database() -> anyhow::Result<Database> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::from_env();
    Database::connect(&config.database)
        .await
        .context("connecting to database")
}

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data) = data {
                response["data"] = data;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Per-item progress line; silent in JSON mode so the final document stays parseable
pub fn output_progress(output_format: &OutputFormat, line: &str) {
    if let OutputFormat::Text = output_format {
        println!("  {}", line);
    }
}
