use clap::Subcommand;
use serde_json::json;

use crate::app::open_store;
use crate::cli::utils::{output_error, output_success, require_config};
use crate::cli::OutputFormat;
use crate::database::models::NewUser;
use crate::services::UserService;

#[derive(Subcommand)]
pub enum UsersCommands {
    #[command(about = "Create a user record")]
    Create {
        #[arg(long, help = "Email address")]
        email: String,
        #[arg(long, help = "Display name")]
        name: String,
    },

    #[command(about = "Show a user record")]
    Get {
        #[arg(help = "User id")]
        id: String,
    },

    #[command(about = "Delete a user record")]
    Delete {
        #[arg(help = "User id")]
        id: String,
    },
}

pub async fn handle(cmd: UsersCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = require_config(&output_format)?;
    let users = UserService::new(open_store(&config).await?);

    match cmd {
        UsersCommands::Create { email, name } => {
            let user = users
                .create_user(NewUser {
                    email,
                    name,
                    metadata: None,
                })
                .await?;
            output_success(&output_format, "User created", Some(serde_json::to_value(user)?))
        }
        UsersCommands::Get { id } => match users.get_user_by_id(&id).await? {
            Some(user) => output_success(&output_format, "User found", Some(serde_json::to_value(user)?)),
            None => {
                output_error(&output_format, "User not found", &[id.clone()])?;
                anyhow::bail!("user {} not found", id)
            }
        },
        UsersCommands::Delete { id } => {
            if users.delete_user(&id).await? {
                output_success(&output_format, "User deleted", Some(json!({ "id": id })))
            } else {
                output_error(&output_format, "User not found", &[id.clone()])?;
                anyhow::bail!("user {} not found", id)
            }
        }
    }
}
