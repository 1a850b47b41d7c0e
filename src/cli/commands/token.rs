use clap::Subcommand;
use serde_json::json;

use crate::auth::{TokenKind, TokenService};
use crate::cli::utils::{output_error, output_success, require_config};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue an access/refresh token pair for a user id")]
    Issue {
        #[arg(help = "User id to place in the token subject")]
        user_id: String,
    },

    #[command(about = "Verify a token and print its claims")]
    Verify {
        #[arg(help = "Token to verify")]
        token: String,
        #[arg(long, help = "Verify as a refresh token instead of an access token")]
        refresh: bool,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = require_config(&output_format)?;
    let tokens = TokenService::new(&config.security);

    match cmd {
        TokenCommands::Issue { user_id } => {
            let pair = tokens.issue_pair(&user_id)?;
            output_success(&output_format, "Token pair issued", Some(serde_json::to_value(pair)?))
        }
        TokenCommands::Verify { token, refresh } => {
            let kind = if refresh { TokenKind::Refresh } else { TokenKind::Access };
            let result = match kind {
                TokenKind::Access => tokens.verify_access(&token),
                TokenKind::Refresh => tokens.verify_refresh(&token),
            };

            match result {
                Ok(claims) => output_success(
                    &output_format,
                    "Token is valid",
                    Some(json!({
                        "user_id": claims.sub,
                        "session_id": claims.sid,
                        "kind": claims.typ,
                        "issued_at": claims.iat,
                        "expires_at": claims.exp,
                    })),
                ),
                Err(e) => {
                    output_error(&output_format, "Token is invalid", &[e.to_string()])?;
                    Err(e.into())
                }
            }
        }
    }
}
