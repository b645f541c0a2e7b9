use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{connect_database, output_success};
use crate::cli::OutputFormat;
use crate::services::{AccountInput, AccountMode, AccountService};
use crate::types::Role;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an administrator account")]
    CreateAdmin {
        #[arg(long, help = "Login email")]
        email: String,

        #[arg(long, help = "Initial password")]
        password: String,

        #[arg(long, help = "Given names")]
        nombres: String,

        #[arg(long, help = "Surnames, paternal first")]
        apellidos: Option<String>,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::CreateAdmin {
            email,
            password,
            nombres,
            apellidos,
        } => {
            let input = AccountInput {
                nombres: Some(nombres),
                apellidos,
                email: Some(email),
                password: Some(password),
                rol: Some(Role::Administrador.as_str().to_string()),
                ..AccountInput::default()
            };
            let new = input.into_new_user(AccountMode::Import)?;

            let db = connect_database().await?;
            let user = AccountService::new(&db).create(&new).await?;
            db.close().await;

            output_success(
                &output_format,
                &format!("Administrator {} created with id {}", user.email, user.id),
                Some(json!({ "id": user.id, "email": user.email, "rol": user.rol })),
            )
        }
    }
}
