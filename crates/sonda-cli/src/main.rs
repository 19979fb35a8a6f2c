use anyhow::Result;
use clap::{Parser, Subcommand};
use sonda_client::{ClientConfig, HttpChatApi};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sonda")]
#[command(about = "Sonda CLI - chat with data-analysis agents", long_about = None)]
struct Cli {
    /// Backend base URL, overriding the config file and SONDA_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the agents available to you
    Agents,
    /// List an agent's chat sessions
    Sessions {
        /// Agent whose sessions to list
        #[arg(long)]
        agent: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
    /// Show a session's message history
    History {
        /// Session to show
        session: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 100)]
        per_page: u32,
    },
    /// Ask an agent a question and wait for the answer
    Ask {
        /// Agent to ask
        #[arg(long)]
        agent: i64,
        /// Existing session to continue; a new one is created when omitted
        #[arg(long)]
        session: Option<i64>,
        /// The question text
        question: String,
    },
    /// Delete a chat session
    Delete {
        /// Session to delete
        session: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::load()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url.trim_end_matches('/').to_string();
    }
    let api = Arc::new(HttpChatApi::new(config));

    match cli.command {
        Commands::Agents => commands::agents::run(api).await,
        Commands::Sessions {
            agent,
            page,
            per_page,
        } => commands::sessions::run(api, agent, page, per_page).await,
        Commands::History {
            session,
            page,
            per_page,
        } => commands::history::run(api, session, page, per_page).await,
        Commands::Ask {
            agent,
            session,
            question,
        } => commands::ask::run(api, agent, session, &question).await,
        Commands::Delete { session } => commands::sessions::delete(api, session).await,
    }
}
