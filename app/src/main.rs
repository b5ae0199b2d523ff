#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, DemoInput, DemoStrategy, InitStrategy,
    VersionStrategy,
};

#[derive(Parser)]
#[command(name = "geomentor")]
#[command(about = "GeoAI Mentor: career guidance for geoscientists moving into data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the built-in mentor questions in one session (default)
    Demo {
        /// Session identifier
        #[arg(short = 's', long)]
        session: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,

        /// Print the full session history at the end
        #[arg(long)]
        show_history: bool,
    },
    /// Chat with the mentor, interactively or with a single message
    Chat {
        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Session identifier (defaults to a new UUID)
        #[arg(short = 's', long)]
        session: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,

        /// Most recent messages to send with each request
        #[arg(long)]
        history_limit: Option<usize>,
    },
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Demo {
        session: None,
        model: None,
        show_history: false,
    }) {
        Commands::Demo {
            session,
            model,
            show_history,
        } => {
            DemoStrategy
                .execute(DemoInput {
                    session_id: session,
                    model,
                    show_history,
                })
                .await
        }
        Commands::Chat {
            message,
            session,
            model,
            history_limit,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    session_id: session,
                    message,
                    model,
                    history_limit,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
