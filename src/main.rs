//! Palimpsest CLI
//!
//! Processes one PDF and prints the pipeline result as JSON.

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use palimpsest::{Pipeline, ProcessingSettings, RecognitionConfig};

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.parse().ok()
}

/// Settings from the environment, falling back to defaults per field
fn settings_from_env() -> ProcessingSettings {
    let defaults = ProcessingSettings::default();
    ProcessingSettings {
        max_pages: env_parse("PALIMPSEST_MAX_PAGES").unwrap_or(defaults.max_pages),
        enable_recognition: env_parse("PALIMPSEST_OCR").unwrap_or(defaults.enable_recognition),
        target_chunk_size: env_parse("PALIMPSEST_CHUNK_SIZE")
            .unwrap_or(defaults.target_chunk_size),
        overlap: env_parse("PALIMPSEST_CHUNK_OVERLAP").unwrap_or(defaults.overlap),
        extract_identifiers: env_parse("PALIMPSEST_IDENTIFIERS")
            .unwrap_or(defaults.extract_identifiers),
        max_file_size: env_parse("PALIMPSEST_MAX_FILE_SIZE").unwrap_or(defaults.max_file_size),
        warn_file_size: env_parse("PALIMPSEST_WARN_FILE_SIZE").unwrap_or(defaults.warn_file_size),
    }
}

fn recognition_from_env() -> RecognitionConfig {
    let defaults = RecognitionConfig::default();
    RecognitionConfig {
        ollama_url: std::env::var("OLLAMA_URL").unwrap_or(defaults.ollama_url),
        ollama_model: std::env::var("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
        language: std::env::var("PALIMPSEST_OCR_LANGUAGE").unwrap_or(defaults.language),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "palimpsest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => bail!("usage: palimpsest <document.pdf>"),
    };

    let settings = settings_from_env();
    let config = recognition_from_env();

    tracing::info!("Palimpsest v{}", env!("CARGO_PKG_VERSION"));

    let pipeline = Pipeline::with_recognition(config).await;
    let progress = |message: &str, percent: u8| {
        tracing::info!("[{:>3}%] {}", percent, message);
    };

    let result = pipeline
        .process(&path, &settings, &progress)
        .await
        .with_context(|| format!("processing {}", path.display()))?;

    tracing::info!(
        "{} pages, {} chunks",
        result.processed_pages,
        result.chunks.len()
    );

    serde_json::to_writer_pretty(std::io::stdout().lock(), &result)?;
    println!();
    Ok(())
}
