use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{connect_database, output_success};
use crate::cli::OutputFormat;
use crate::database::schema::{bootstrap, SCHEMA};

#[derive(Subcommand)]
pub enum SchemaCommands {
    #[command(about = "Create missing tables and indexes")]
    Init,
}

pub async fn handle(cmd: SchemaCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        SchemaCommands::Init => {
            let db = connect_database().await?;
            bootstrap(&db).await?;
            db.close().await;

            output_success(
                &output_format,
                "Schema is up to date",
                Some(json!({ "statements": SCHEMA.len() })),
            )
        }
    }
}
