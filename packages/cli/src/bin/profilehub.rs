// ABOUTME: ProfileHub command-line entry point
// ABOUTME: Parses serve/migrate subcommands, loads settings and runs the chosen command

use std::process;

use clap::{Parser, Subcommand};
use colored::*;

use profilehub_cli::{init_tracing, run_migrations, run_server};
use profilehub_config::Settings;

#[derive(Parser, Debug)]
#[command(name = "profilehub")]
#[command(about = "ProfileHub - user accounts, profiles and profile pictures")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Interface to bind (overrides PROFILEHUB_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides PROFILEHUB_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = handle_command(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let mut settings = Settings::from_env()?;

    match command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            run_server(settings).await
        }
        Commands::Migrate => {
            run_migrations(&settings).await?;
            println!("{}", "Database is up to date".green());
            Ok(())
        }
    }
}
