//! Jarvis application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Connect the language model, web search and memory backends
//! 3. Build the document index, skill registry and chat pipeline
//! 4. Start the axum REST API server

mod cli;

use std::sync::Arc;

use clap::Parser;
use jarvis_llm::{LanguageModel, OpenAiCompatClient};
use jarvis_search::{DuckDuckGoSearch, StaticSearch, WebSearch};

use jarvis_api::{start_server, AppState};

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Load problems are logged once tracing is up.
    let config_file = args.resolve_config_path();
    let (config, load_error) = args.load_config();

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting Jarvis v{}", env!("CARGO_PKG_VERSION"));
    match load_error {
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config; using defaults"
        ),
    }

    config.validate()?;

    let api_key = match config.llm.resolve_api_key() {
        Ok(key) => key,
        Err(e) => {
            tracing::error!(error = %e, "Language model credentials missing");
            return Err(e.into());
        }
    };

    // Storage.
    let data_dir = config.general.resolved_data_dir();
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        tracing::error!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        return Err(e.into());
    }
    let memory = jarvis_storage::open_store(&config.memory, &data_dir)?;

    // External services.
    let llm: Arc<dyn LanguageModel> = Arc::new(OpenAiCompatClient::new(&config.llm, api_key));
    tracing::info!(model = llm.model_name(), "Language model configured");

    let search: Arc<dyn WebSearch> = if config.search.enabled {
        Arc::new(DuckDuckGoSearch::new(&config.search))
    } else {
        tracing::info!("Web search disabled in config");
        Arc::new(StaticSearch::empty())
    };

    // === API server ===
    let port = config.general.port;
    let state = AppState::build(config, llm, search, memory)?;
    start_server(state, port).await?;

    Ok(())
}
