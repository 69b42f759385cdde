use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::extractor::load_document;
use crate::index::IndexClient;
use crate::responder::MockResponder;
use crate::retriever::Retriever;

/// Ingest a document file into the vector index
#[inline]
pub fn ingest_document(path: &Path, document: Option<String>) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    let document_id = document.unwrap_or_else(|| {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    });

    let text = load_document(path).context("Failed to load document")?;
    info!("Ingesting '{}' ({} characters)", document_id, text.len());

    let retriever =
        Retriever::new(&config).context("Failed to initialize retrieval pipeline")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").context("invalid progress template")?,
    );
    spinner.set_message(format!("Ingesting '{}'", document_id));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let stored = retriever.ingest(&document_id, &text);
    spinner.finish_and_clear();
    let stored = stored.context("Ingestion failed")?;

    println!(
        "Stored {} chunks from {}",
        style(stored).green(),
        style(&document_id).cyan()
    );
    Ok(())
}

/// Run a single query, or an interactive query loop when no text is given
#[inline]
pub fn run_query(text: Option<String>, top_k: usize) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let retriever =
        Retriever::new(&config).context("Failed to initialize retrieval pipeline")?;
    let responder = MockResponder::default();

    if let Some(query) = text {
        answer_query(&retriever, &responder, &query, top_k);
        return Ok(());
    }

    loop {
        let query: String = Input::new()
            .with_prompt("Enter your query (or 'quit' to exit)")
            .allow_empty(true)
            .interact_text()?;
        let trimmed = query.trim();

        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        answer_query(&retriever, &responder, trimmed, top_k);
    }

    Ok(())
}

fn answer_query(retriever: &Retriever, responder: &MockResponder, query: &str, top_k: usize) {
    let results = match retriever.query(query, top_k) {
        Ok(results) => results,
        Err(e) => {
            warn!("Query failed: {}", e);
            Vec::new()
        }
    };

    let Some(best) = results.first() else {
        println!("No relevant context found.");
        return;
    };

    println!();
    println!("{}", style("--- Search Context ---").bold());
    println!("Document: {}", style(&best.document).cyan());
    println!(
        "Relevance Score: {}",
        style(format!("{:.2}", best.score)).cyan()
    );

    let generated = responder.generate_response(query, best);
    println!();
    println!("{}", style("--- Generated Response ---").bold());
    println!("{}", generated.response);
}

/// Delete every indexed entry belonging to a document
#[inline]
pub fn delete_document(document: &str) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    let client = IndexClient::new(&config.index)?;
    client.ensure_ready().context("Index is not available")?;

    if client
        .delete_by_document(document)
        .context("Delete failed")?
    {
        println!("Deleted all entries for {}", style(document).cyan());
    } else {
        println!("No entries found for {}", style(document).cyan());
    }

    Ok(())
}

/// Show index readiness and configuration
#[inline]
pub fn show_status() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let client = IndexClient::new(&config.index)?;

    println!("{}", style("Index Status").bold().cyan());
    println!("  Name: {}", style(&config.index.name).cyan());

    match client.describe() {
        Ok(description) => {
            let state = if description.status.ready {
                style("ready").green()
            } else {
                style("not ready").yellow()
            };
            println!("  State: {}", state);
            println!("  Dimension: {}", style(description.dimension).cyan());
            println!("  Metric: {}", style(&description.metric).cyan());
        }
        Err(e) => {
            println!("  State: {}", style("unreachable").red());
            println!("  Error: {}", e);
        }
    }

    Ok(())
}
