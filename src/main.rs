use clap::{Parser, Subcommand};
use docvec::Result;
use docvec::commands::{delete_document, ingest_document, run_query, show_status};
use docvec::config::{run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docvec")]
#[command(about = "Document ingestion and similarity retrieval backed by a remote vector index")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the embedder and vector index connections
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Ingest a document into the vector index
    Ingest {
        /// Path to a .txt or .md document
        path: PathBuf,
        /// Identifier stored with each chunk; defaults to the file name
        #[arg(long)]
        document: Option<String>,
    },
    /// Query the index, or start an interactive query loop
    Query {
        /// Query text; omit to enter the interactive loop
        text: Option<String>,
        /// Number of results to retrieve
        #[arg(long, default_value_t = 1)]
        top_k: usize,
    },
    /// Delete all indexed entries for a document
    Delete {
        /// Document identifier used at ingestion time
        document: String,
    },
    /// Show index readiness and configuration
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Ingest { path, document } => {
            ingest_document(&path, document)?;
        }
        Commands::Query { text, top_k } => {
            run_query(text, top_k)?;
        }
        Commands::Delete { document } => {
            delete_document(&document)?;
        }
        Commands::Status => {
            show_status()?;
        }
    }

    Ok(())
}
