/*
insight - single-binary main.rs
This binary loads configuration, opens the article database and starts the
Rocket HTTP server that serves the dashboard, the feed API and the chat socket.
*/

use anyhow::{Context, Result};
use clap::Parser;
use common::{init_db_pool, Config};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use insight::llm::remote::RemoteCompleter;
use insight::llm::ChatCompleter;
use insight::{server, store};

#[derive(Parser, Debug)]
#[command(name = "insight", about = "Morning Insight news dashboard server")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve config paths
    let default_path = PathBuf::from("config.default.toml");

    let override_path = if let Some(p) = args.config {
        if !p.exists() {
            error!(path = ?p, "specified config file not found");
            return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
        }
        Some(p)
    } else {
        let p = PathBuf::from("config.toml");
        if p.exists() {
            Some(p)
        } else {
            None
        }
    };

    // Load configuration with defaults
    let config = match Config::load_with_defaults(
        if default_path.exists() {
            Some(&default_path)
        } else {
            None
        },
        override_path.as_deref(),
    )
    .await
    {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(%e, "failed to load configuration");
            return Err(e);
        }
    };
    info!(default = ?default_path, override_file = ?override_path, "configuration loaded");

    // An unreachable database is startup-fatal: the feed is the whole
    // product, so we fail fast here instead of limping along with a dead
    // handle and failing on first use.
    let db_pool = match init_db_pool(&config.database.path).await {
        Ok(p) => p,
        Err(e) => {
            error!(%e, db_path = %config.database.path, "failed to initialize database pool");
            return Err(e);
        }
    };
    let db_pool = Arc::new(db_pool);

    store::ensure_schema(&db_pool)
        .await
        .context("failed to ensure articles schema")?;

    // A missing or incomplete assistant configuration is a degraded mode,
    // not a startup failure: the feed still works, the chat pane reports
    // that the assistant is unavailable.
    let completer: Option<Arc<dyn ChatCompleter>> = match config.llm {
        Some(ref llm_config) => match create_completer(llm_config) {
            Ok(completer) => {
                info!(
                    "completion provider initialized: {}",
                    llm_config.model.as_deref().unwrap_or("gpt-4o")
                );
                Some(Arc::new(completer))
            }
            Err(e) => {
                warn!("completion provider unavailable, chat disabled: {}", e);
                None
            }
        },
        None => {
            info!("no [llm] config section, chat disabled");
            None
        }
    };

    // Launch the Rocket server (blocking until Rocket shuts down)
    info!("Launching Rocket HTTP server");
    server::launch_rocket(db_pool, Some(Arc::new(config)), completer).await?;

    info!("Shutdown complete");
    Ok(())
}

/// Create a streaming completion provider from configuration. The API key
/// is read from the environment variable named in the config, never from
/// the config file itself.
fn create_completer(llm_config: &common::LlmConfig) -> Result<RemoteCompleter> {
    let api_key_env = llm_config
        .api_key_env
        .as_deref()
        .context("missing api_key_env in [llm] config")?;

    let api_key = std::env::var(api_key_env)
        .with_context(|| format!("completion API key env var '{}' not set", api_key_env))?;

    let api_url = llm_config
        .api_url
        .clone()
        .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string());
    let model = llm_config
        .model
        .clone()
        .unwrap_or_else(|| "gpt-4o".to_string());

    Ok(
        RemoteCompleter::new(api_url, api_key, model).with_defaults(
            llm_config.timeout_seconds.unwrap_or(30),
            llm_config.max_tokens,
            llm_config.temperature.unwrap_or(0.7),
        ),
    )
}
