//! Error types for the command bot.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while handling one command, plus the
/// startup failure of the log file.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("API call failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse API response: {0}")]
    EnvelopeDecode(#[source] serde_json::Error),

    #[error("no valid JSON found in response")]
    Extraction { response: String },

    #[error("failed to parse analysis: {source}")]
    AnalysisDecode {
        #[source]
        source: serde_json::Error,
        response: String,
    },

    #[error("failed to open log file {}: {source}", path.display())]
    LogSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BotError {
    /// The model text behind an extraction or parse failure.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            BotError::Extraction { response } | BotError::AnalysisDecode { response, .. } => {
                Some(response.as_str())
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
