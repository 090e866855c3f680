//! # docqa CLI
//!
//! Upload text and code files, then ask questions answered from them.
//!
//! ## Usage
//!
//! ```bash
//! docqa --config ./config/docqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docqa init` | Create the SQLite database and tables |
//! | `docqa upload <file>` | Validate, chunk, embed and store a file |
//! | `docqa query "<question>"` | Answer a question from uploaded documents |
//! | `docqa search "<question>"` | Show the chunks a question would retrieve |
//! | `docqa documents` | List uploaded documents |
//! | `docqa history` | List past questions |
//! | `docqa delete <document_id>` | Remove a document and its vectors |
//! | `docqa status` | Print a health summary |
//! | `docqa reset` | Empty the vector collection |
//!
//! Logging goes to stderr and is controlled by `DOCQA_LOG`
//! (e.g. `DOCQA_LOG=docqa=debug`); `--verbose` is shorthand for debug output.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use docqa::{config, history, migrate, query, status, upload};

#[derive(Parser)]
#[command(
    name = "docqa",
    about = "Upload text and code files, then ask questions answered from their contents",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docqa.toml")]
    config: PathBuf,

    /// Debug logging for docqa (overridden by DOCQA_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database.
    ///
    /// Creates the SQLite file and the documents, chunks, chunk_vectors and
    /// query_history tables. Safe to run repeatedly.
    Init,

    /// Upload a file: validate, chunk, embed and store it.
    Upload {
        /// Path to a text or source-code file.
        file: PathBuf,
    },

    /// Ask a question about the uploaded documents.
    Query {
        question: String,

        /// Number of chunks to retrieve (1-10). Defaults to `retrieval.k`.
        #[arg(long)]
        k: Option<usize>,

        /// Print the answer and its sources as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the chunks most similar to a question, without generating an answer.
    Search {
        question: String,

        #[arg(long)]
        k: Option<usize>,
    },

    /// List uploaded documents, newest first.
    Documents,

    /// List past questions, newest first.
    History {
        /// Number of queries to show (at least 1).
        #[arg(
            long,
            default_value_t = history::DEFAULT_HISTORY_LIMIT,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        limit: u32,
    },

    /// Delete a document, its vectors and its stored copy.
    Delete { document_id: String },

    /// Print a health and status summary.
    Status,

    /// Delete every stored chunk and vector. Upload and query history are kept.
    Reset,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "docqa=debug,docqa_core=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("DOCQA_LOG").unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Upload { file } => {
            upload::run_upload(&cfg, &file).await?;
        }
        Commands::Query { question, k, json } => {
            query::run_query(&cfg, &question, k, json).await?;
        }
        Commands::Search { question, k } => {
            query::run_search(&cfg, &question, k).await?;
        }
        Commands::Documents => {
            history::run_documents(&cfg).await?;
        }
        Commands::History { limit } => {
            history::run_history(&cfg, limit).await?;
        }
        Commands::Delete { document_id } => {
            history::run_delete(&cfg, &document_id).await?;
        }
        Commands::Status => {
            status::run_status(&cfg).await?;
        }
        Commands::Reset => {
            status::run_reset(&cfg).await?;
        }
    }

    Ok(())
}
