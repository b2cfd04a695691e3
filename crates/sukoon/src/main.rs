//! Ask for bilingual guidance from the command line.
//!
//! Reads the API key from the environment variable named by the config
//! (`OPENROUTER_KEY` by default).
//!
//! # Examples
//!
//! ```sh
//! # One-shot
//! sukoon --corpus data/corpus.json --message "I feel anxious about exams"
//!
//! # Pipe text in and print the outcome as JSON
//! echo "mujhe neend nahi aati" | sukoon --corpus data/corpus.json --stdin --json
//!
//! # Interactive loop against a Groq endpoint
//! sukoon --config sukoon.json \
//!   --endpoint https://api.groq.com/openai/v1/chat/completions \
//!   --model llama-3.3-70b-versatile
//! ```

use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use sukoon::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Ask for bilingual (English/Urdu) guidance.
///
/// Without --message or --stdin, reads one message per line until EOF.
#[derive(Parser)]
#[command(name = "sukoon")]
struct Cli {
    // ── Input ──────────────────────────────────────────────────
    /// Message to respond to
    #[arg(long, short)]
    message: Option<String>,

    /// Read the message from stdin
    #[arg(long, conflicts_with = "message")]
    stdin: bool,

    // ── Configuration ──────────────────────────────────────────
    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Passage corpus (JSON array of strings or {text, source} objects)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// Chat completions URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Per-attempt model timeout in seconds
    #[arg(long)]
    timeout_secs: Option<f64>,

    /// Retries for transient model failures
    #[arg(long)]
    retries: Option<u32>,

    // ── Output ─────────────────────────────────────────────────
    /// Print each outcome as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(cli: &Cli) -> Result<GuidanceConfig, GuidanceError> {
    let mut config = match &cli.config {
        Some(path) => GuidanceConfig::from_file(path)?,
        None => GuidanceConfig::default(),
    };
    if let Some(model) = &cli.model {
        config = config.with_model(model.clone());
    }
    if let Some(endpoint) = &cli.endpoint {
        config = config.with_endpoint(endpoint.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        let timeout = Duration::try_from_secs_f64(secs).map_err(|e| {
            GuidanceError::InvalidConfig(format!("invalid --timeout-secs {secs}: {e}"))
        })?;
        config = config.with_timeout(timeout);
    }
    if let Some(retries) = cli.retries {
        config = config.with_retries(retries);
    }
    if let Some(corpus) = &cli.corpus {
        config = config.with_corpus_path(corpus.clone());
    }
    Ok(config)
}

fn build_pipeline(cli: &Cli) -> Result<GuidancePipeline, GuidanceError> {
    GuidancePipeline::from_config(load_config(cli)?)
}

const VERSE_LABEL: &str = "Quranic guidance / Hadith";
/// "Explanation in Urdu".
const EXPLANATION_LABEL: &str = "اردو میں وضاحت";

fn format_outcome(outcome: &GuidanceOutcome, json: bool) -> Option<String> {
    if json {
        return serde_json::to_string_pretty(outcome).ok();
    }
    match outcome {
        GuidanceOutcome::NoSubmission => None,
        GuidanceOutcome::Crisis { helpline } => Some(helpline.clone()),
        GuidanceOutcome::Apology { message } => Some(message.clone()),
        GuidanceOutcome::Guidance(response) => {
            let mut out = response.english_segment.clone();
            if let Some(verse) = &response.verse_segment {
                out.push_str(&format!("\n\n{VERSE_LABEL}:\n{verse}"));
            }
            if let Some(urdu) = &response.urdu_segment {
                out.push_str(&format!("\n\n{EXPLANATION_LABEL}:\n{urdu}"));
            }
            Some(out)
        }
    }
}

async fn answer(pipeline: &GuidancePipeline, text: &str, json: bool) {
    let outcome = pipeline.respond(text).await;
    if let Some(out) = format_outcome(&outcome, json) {
        println!("{out}\n");
    }
}

fn read_stdin_content() -> Result<String, String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| format!("failed to read stdin: {e}"))?;
    Ok(buf)
}

async fn run(cli: &Cli) -> Result<(), String> {
    let pipeline = build_pipeline(cli).map_err(|e| e.to_string())?;

    if let Some(message) = &cli.message {
        answer(&pipeline, message, cli.json).await;
        return Ok(());
    }
    if cli.stdin {
        let text = read_stdin_content()?;
        answer(&pipeline, &text, cli.json).await;
        return Ok(());
    }

    // ── Interactive loop ────────────────────────────────────────
    let stdin = io::stdin();
    loop {
        eprint!("> ");
        io::stderr().flush().ok();
        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        if read == 0 {
            return Ok(());
        }
        answer(&pipeline, &line, cli.json).await;
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
