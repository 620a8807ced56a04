// Interactive command session: read a line, analyze it with the model,
// show the result, repeat until "exit" or end of input.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, instrument, warn};

use crate::analysis::{normalize, AnalysisResult};
use crate::error::{BotError, Result};
use crate::extract::extract_json;
use crate::llm_interaction::OllamaClient;
use crate::log_sink::LogSink;
use crate::presenter::present;
use crate::prompt::build_prompt;

/// Turns one user command into a cleaned-up analysis.
pub struct CommandAnalyzer {
    client: OllamaClient,
}

impl CommandAnalyzer {
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    #[instrument(skip(self))]
    pub async fn analyze(&self, input: &str) -> Result<AnalysisResult> {
        let prompt = build_prompt(input);
        debug!(?prompt, "Constructed analysis prompt");

        let response = self.client.complete(&prompt).await?;
        parse_analysis(&response, input)
    }
}

/// Extract, parse and normalize the model's raw text.
pub fn parse_analysis(response: &str, input: &str) -> Result<AnalysisResult> {
    let json = extract_json(response).ok_or_else(|| BotError::Extraction {
        response: response.to_string(),
    })?;

    let raw: AnalysisResult =
        serde_json::from_str(json).map_err(|source| BotError::AnalysisDecode {
            source,
            response: response.to_string(),
        })?;

    Ok(normalize(raw, input))
}

/// Run the read-analyze-print loop until "exit" or end of input.
///
/// Per-command failures are printed and logged, and the loop carries on.
/// Only I/O errors on the console itself end the session early.
pub async fn run_session<R, W, L>(
    reader: R,
    out: &mut W,
    log: &mut LogSink<L>,
    analyzer: &CommandAnalyzer,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    L: Write,
{
    log.info("Session started");
    info!("Session started");

    let result = command_loop(reader, out, log, analyzer).await;

    log.info("Session ended");
    info!("Session ended");
    result
}

async fn command_loop<R, W, L>(
    mut reader: R,
    out: &mut W,
    log: &mut LogSink<L>,
    analyzer: &CommandAnalyzer,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    L: Write,
{
    writeln!(out, "\nCommand bot")?;

    let mut buf = Vec::new();
    loop {
        write!(out, "command: ")?;
        out.flush()?;

        // Raw bytes, so a line that is not valid UTF-8 is still a command.
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            debug!("End of input");
            writeln!(out)?;
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let input = line.trim();
        if input == "exit" {
            break;
        }
        if input.is_empty() {
            continue;
        }

        match analyzer.analyze(input).await {
            Ok(analysis) => present(input, &analysis, out, log),
            Err(e) => {
                warn!("Command failed: {}", e);
                if let Some(response) = e.raw_response() {
                    debug!(?response, "Model response that could not be analyzed");
                }
                writeln!(out, "Error: {}", one_line(&e.to_string()))?;
                log.info(&format!("Command failed: {}", e));
            }
        }
    }

    Ok(())
}

fn one_line(message: &str) -> String {
    message.split_whitespace().collect::<Vec<_>>().join(" ")
}
