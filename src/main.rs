use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use command_bot::chat::{self, CommandAnalyzer};
use command_bot::constants;
use command_bot::llm_interaction::OllamaClient;
use command_bot::log_sink::LogSink;

/// Analyze work commands with a local Ollama model.
///
/// Reads one command per line from standard input; type "exit" to quit.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {}

// Commands are handled strictly one after another, so a single-threaded runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present (for OLLAMA_URL, COMMAND_BOT_MODEL, ...)
    dotenvy::dotenv().ok();

    // Diagnostics go to stderr, filtered by RUST_LOG (e.g., RUST_LOG=command_bot=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let _cli = Cli::parse();

    let mut log = LogSink::open(constants::LOG_FILE.as_str())
        .context("Failed to initialize log sink")?;

    let analyzer = CommandAnalyzer::new(OllamaClient::from_env());
    info!(
        model = analyzer.model(),
        url = %constants::OLLAMA_URL.as_str(),
        "Command bot starting"
    );

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    chat::run_session(stdin, &mut stdout, &mut log, &analyzer)
        .await
        .context("Chat session failed")?;

    info!("Command bot finished.");
    Ok(())
}
