//! Serve the guidance chat page.
//!
//! # Usage
//!
//! ```bash
//! OPENROUTER_KEY=sk-... cargo run -p sukoon-web -- --corpus data/corpus.json
//! OPENROUTER_KEY=sk-... cargo run -p sukoon-web -- --config sukoon.json --port 8080
//! ```
//!
//! Then open the printed URL, or:
//!
//! ```bash
//! curl -X POST localhost:3001/api/guidance \
//!   -H 'Content-Type: application/json' -d '{"message": "I feel anxious"}'
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use clap::Parser;
use sukoon::guidance::{GuidanceConfig, GuidancePipeline};
use sukoon_web::{Theme, ViewState, WebConfig, spawn_web};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Bilingual guidance chat page.
#[derive(Parser)]
#[command(about = "Serve the sukoon guidance chat page")]
struct Args {
    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Passage corpus; overrides `corpus_path` from the config.
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Model identifier.
    #[arg(long)]
    model: Option<String>,

    /// Chat completions URL.
    #[arg(long)]
    endpoint: Option<String>,

    /// Port for the web server.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Start in dark mode.
    #[arg(long)]
    dark: bool,
}

fn load_config(args: &Args) -> Result<GuidanceConfig, String> {
    let mut config = match &args.config {
        Some(path) => GuidanceConfig::from_file(path).map_err(|e| e.to_string())?,
        None => GuidanceConfig::default(),
    };
    if let Some(corpus) = &args.corpus {
        config = config.with_corpus_path(corpus.clone());
    }
    if let Some(model) = &args.model {
        config = config.with_model(model.clone());
    }
    if let Some(endpoint) = &args.endpoint {
        config = config.with_endpoint(endpoint.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // 1. Corpus, model client, pipeline. Any failure here is fatal.
    let pipeline = GuidancePipeline::from_config(load_config(&args)?).map_err(|e| e.to_string())?;

    // 2. Presentation state, owned by the server.
    let mut view = ViewState::default();
    if args.dark {
        view.apply_theme(Some(Theme::Dark));
    }

    // 3. Serve until ctrl-c.
    let web_config = WebConfig {
        bind_addr: ([127, 0, 0, 1], args.port).into(),
    };
    let addr = spawn_web(Arc::new(pipeline), Arc::new(Mutex::new(view)), web_config)
        .await
        .map_err(|e| format!("failed to start server: {e}"))?;
    println!("Web UI: http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to wait for ctrl-c: {e}"))?;
    Ok(())
}
