mod analyze;
mod backends;
mod config;
mod history;
mod walkthrough;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cosmicface", about = "cosmicface CLI - face-reading analyses and guided flows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze photos and print the reading as JSON
    Analyze {
        /// daily-insight, life-map, or compatibility
        kind: String,

        /// Photo files (two for compatibility)
        #[arg(required = true)]
        photos: Vec<PathBuf>,

        /// Save the reading to this user's history
        #[arg(long)]
        user_id: Option<String>,

        /// Reuse a session id; a newer request supersedes an older one
        #[arg(long)]
        session: Option<String>,
    },

    /// List saved readings, newest first
    History {
        #[arg(long)]
        user_id: Option<String>,

        /// Print raw entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a feature flow end to end and print each screen
    Walkthrough {
        /// daily-insight, life-map, or compatibility
        feature: String,

        #[arg(required = true)]
        photos: Vec<PathBuf>,
    },

    /// Show or set configuration
    Config {
        /// Set the managed-functions base URL
        #[arg(long)]
        functions_url: Option<String>,

        /// Set the Gemini API key
        #[arg(long)]
        gemini_api_key: Option<String>,

        /// Set the user id used for history
        #[arg(long)]
        user_id: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            kind,
            photos,
            user_id,
            session,
        } => analyze::run_analyze(&kind, &photos, user_id, session).await,
        Commands::History { user_id, json } => history::run_history(user_id, json).await,
        Commands::Walkthrough { feature, photos } => {
            walkthrough::run_walkthrough(&feature, &photos).await
        }
        Commands::Config {
            functions_url,
            gemini_api_key,
            user_id,
        } => {
            if functions_url.is_none() && gemini_api_key.is_none() && user_id.is_none() {
                config::show_config()
            } else {
                config::set_config(functions_url, gemini_api_key, user_id)
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
