use anyhow::Result;
use clap::{Parser, Subcommand};
use std::env;

pub mod analyze;
pub mod auth;
pub mod serve;
pub mod sync;

#[derive(Subcommand)]
enum Command {
    /// Analyze a syllabus document and print the extracted schedule
    Analyze {
        /// Path to the syllabus text file
        #[arg(long)]
        file: String,

        /// Print the events as JSON instead of a table
        #[arg(long, action, default_value = "false")]
        json: bool,
    },
    /// Perform OAuth authentication for Google Calendar
    Auth {},
    /// Sync a reviewed event list into Google Calendar
    Sync {
        /// Path to a JSON file holding the event list
        #[arg(long)]
        file: String,

        /// Calendar name; derived from the file name when omitted
        #[arg(long)]
        label: Option<String>,
    },
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    let storage_path = env::var("SYLLASYNC_STORAGE_PATH").unwrap_or("./".to_string());
    let db_path = format!("{}/db", storage_path.trim_end_matches('/'));

    // Handle each sub command
    match args.command {
        Some(Command::Analyze { file, json }) => {
            analyze::run(&file, json).await?;
        }
        Some(Command::Auth {}) => {
            auth::run(&db_path).await?;
        }
        Some(Command::Sync { file, label }) => {
            sync::run(&file, label, &db_path).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await;
        }
        None => {}
    }

    Ok(())
}
