use clap::Subcommand;

use crate::cli::{utils, OutputFormat};
use crate::client::EngineClient;
use crate::config;

#[derive(Subcommand)]
pub enum DirectoryCommands {
    #[command(about = "List database users known to the engine")]
    Users,

    #[command(about = "List the built-in roles available for grants")]
    Roles,

    #[command(about = "Show the current role of a user")]
    Role {
        #[arg(help = "Database username")]
        username: String,
    },
}

pub async fn handle(cmd: DirectoryCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = EngineClient::from_config(&config::config().engine)?;

    match cmd {
        DirectoryCommands::Users => {
            let users = client.database_users().await?;
            output_list(&output_format, "users", &users)
        }
        DirectoryCommands::Roles => {
            let roles = client.built_in_roles().await?;
            output_list(&output_format, "roles", &roles)
        }
        DirectoryCommands::Role { username } => match client.current_role(&username).await {
            Ok(role) => {
                utils::output_success(&output_format, &format!("{username}: {role}"))
            }
            Err(err) => {
                utils::output_error(&output_format, &err.to_string())?;
                std::process::exit(1);
            }
        },
    }
}

fn output_list(output_format: &OutputFormat, name: &str, items: &[String]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ name: items }))?
            );
        }
        OutputFormat::Text => {
            for item in items {
                println!("{item}");
            }
        }
    }
    Ok(())
}
