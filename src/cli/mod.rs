pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "elevate")]
#[command(about = "Elevate CLI - request temporary access through the workflow engine")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Request a temporary database role grant")]
    Jit(commands::jit::JitArgs),

    #[command(about = "Execute an emergency remediation action on a service")]
    Breakglass(commands::breakglass::BreakglassArgs),

    #[command(about = "Browse reference data from the engine directory")]
    Directory {
        #[command(subcommand)]
        cmd: commands::directory::DirectoryCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Jit(args) => commands::jit::handle(args, output_format).await,
        Commands::Breakglass(args) => commands::breakglass::handle(args, output_format).await,
        Commands::Directory { cmd } => commands::directory::handle(cmd, output_format).await,
    }
}
