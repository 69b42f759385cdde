use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};

use super::settings::{Config, EmbedderConfig, IndexConfig};
use crate::embeddings::EmbeddingClient;

const METRICS: [&str; 3] = ["cosine", "dotproduct", "euclidean"];

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("docvec configuration setup").bold().cyan());
    eprintln!();

    let mut config = Config::load().context("Failed to load existing configuration")?;

    eprintln!("{}", style("Embedder").bold().yellow());
    eprintln!("Configure the embedding service used for chunks and queries.");
    eprintln!();
    configure_embedder(&mut config.embedder)?;

    eprintln!();
    eprintln!("{}", style("Vector Index").bold().yellow());
    eprintln!("Configure the vector index service that stores the embeddings.");
    eprintln!();
    configure_index(&mut config.index)?;

    config
        .validate()
        .context("Configuration validation failed")?;

    eprintln!();
    eprintln!("{}", style("Testing embedder connection...").yellow());
    if test_embedder_connection(&config.embedder) {
        eprintln!("{}", style("Embedder connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("Warning: could not reach the embedder").yellow()
        );
        eprintln!("You can continue, but make sure it is running before ingesting.");
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    eprintln!("{}", style("Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Embedder:").bold().yellow());
    eprintln!("  Host: {}", style(&config.embedder.host).cyan());
    eprintln!("  Port: {}", style(config.embedder.port).cyan());
    eprintln!("  Model: {}", style(&config.embedder.model).cyan());

    eprintln!();
    eprintln!("{}", style("Vector Index:").bold().yellow());
    eprintln!("  Host: {}", style(&config.index.host).cyan());
    eprintln!("  Port: {}", style(config.index.port).cyan());
    eprintln!("  Index Name: {}", style(&config.index.name).cyan());
    eprintln!("  Dimension: {}", style(config.index.dimension).cyan());
    eprintln!("  Metric: {}", style(&config.index.metric).cyan());
    eprintln!(
        "  Region: {}",
        style(format!("{}/{}", config.index.cloud, config.index.region)).cyan()
    );
    eprintln!(
        "  Strict Readiness: {}",
        style(config.index.strict_readiness).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Chunking:").bold().yellow());
    eprintln!("  Window: {} words", style(config.chunking.window).cyan());
    eprintln!("  Overlap: {} words", style(config.chunking.overlap).cyan());

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn configure_embedder(embedder: &mut EmbedderConfig) -> Result<()> {
    embedder.host = Input::new()
        .with_prompt("Embedder host")
        .default(embedder.host.clone())
        .interact_text()?;

    embedder.port = Input::new()
        .with_prompt("Embedder port")
        .default(embedder.port)
        .interact_text()?;

    embedder.model = Input::new()
        .with_prompt("Embedding model")
        .default(embedder.model.clone())
        .interact_text()?;

    Ok(())
}

fn configure_index(index: &mut IndexConfig) -> Result<()> {
    index.host = Input::new()
        .with_prompt("Index service host")
        .default(index.host.clone())
        .interact_text()?;

    index.port = Input::new()
        .with_prompt("Index service port")
        .default(index.port)
        .interact_text()?;

    index.name = Input::new()
        .with_prompt("Index name")
        .default(index.name.clone())
        .interact_text()?;

    index.dimension = Input::new()
        .with_prompt("Embedding dimension")
        .default(index.dimension)
        .interact_text()?;

    let current = METRICS
        .iter()
        .position(|m| *m == index.metric)
        .unwrap_or(0);
    let selection = Select::new()
        .with_prompt("Similarity metric")
        .items(&METRICS)
        .default(current)
        .interact()?;
    index.metric = METRICS[selection].to_string();

    index.strict_readiness = Confirm::new()
        .with_prompt("Fail hard when a new index never becomes ready?")
        .default(index.strict_readiness)
        .interact()?;

    Ok(())
}

fn test_embedder_connection(embedder: &EmbedderConfig) -> bool {
    match EmbeddingClient::new(embedder) {
        Ok(client) => client.ping().is_ok(),
        Err(_) => false,
    }
}
