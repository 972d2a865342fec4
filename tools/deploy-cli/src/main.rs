//! clearcast-deploy: one-shot Render.com API calls.
//!
//! Usage:
//!   clearcast-deploy services         List all services
//!   clearcast-deploy service <ID>     Show a service's status
//!   clearcast-deploy logs <ID>        Fetch recent service logs
//!   clearcast-deploy deploys <ID>     List recent deploys for a service
//!   clearcast-deploy deploy <ID>      Show a single deploy's status
//!   clearcast-deploy trigger <ID>     Trigger a new deploy
//!   clearcast-deploy env <ID>         Show an environment
//!   clearcast-deploy whoami           Show the authenticated owner
//!
//! Deliberately minimal: each subcommand is a single bearer-authenticated
//! HTTP call that prints the raw status and body. No retries, no pagination.

use clap::{Parser, Subcommand};

mod commands;

use commands::RenderClient;

#[derive(Parser)]
#[command(
    name = "clearcast-deploy",
    about = "One-shot Render.com service checks and deploy triggers",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all services visible to the API key
    Services,

    /// Show a service's current status
    Service {
        /// Render service id (srv-...)
        id: String,
    },

    /// Fetch recent service logs
    Logs {
        /// Render service id (srv-...)
        id: String,

        /// Maximum number of log lines
        #[arg(long, default_value = "100")]
        limit: u32,
    },

    /// List recent deploys for a service
    Deploys {
        /// Render service id (srv-...)
        id: String,
    },

    /// Show a single deploy's status
    Deploy {
        /// Render deploy id (dep-...)
        id: String,
    },

    /// Trigger a new deploy
    Trigger {
        /// Render service id (srv-...)
        id: String,
    },

    /// Show an environment's details
    Env {
        /// Render environment id (evm-...)
        id: String,
    },

    /// Show the authenticated owner
    Whoami,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let api_key = std::env::var("RENDER_API_KEY")
        .map_err(|_| anyhow::anyhow!("RENDER_API_KEY environment variable is not set"))?;
    let client = RenderClient::new(api_key);

    match cli.command {
        Commands::Services => commands::services::run(&client).await,
        Commands::Service { id } => commands::service::run(&client, &id).await,
        Commands::Logs { id, limit } => commands::logs::run(&client, &id, limit).await,
        Commands::Deploys { id } => commands::deploys::run(&client, &id).await,
        Commands::Deploy { id } => commands::deploy::run(&client, &id).await,
        Commands::Trigger { id } => commands::trigger::run(&client, &id).await,
        Commands::Env { id } => commands::env::run(&client, &id).await,
        Commands::Whoami => commands::whoami::run(&client).await,
    }
}
