// Endpoint, model and log file defaults, overridable from the environment or a .env file.

use std::env;

lazy_static::lazy_static! {
    pub static ref OLLAMA_URL: String = env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string());
    pub static ref COMMAND_BOT_MODEL: String = env::var("COMMAND_BOT_MODEL").unwrap_or_else(|_| "llama3".to_string());
    pub static ref LOG_FILE: String = env::var("COMMAND_BOT_LOG_FILE").unwrap_or_else(|_| "bot.log".to_string());
}

/// Path of Ollama's single-shot completion endpoint, relative to the base URL.
pub const GENERATE_PATH: &str = "/api/generate";

/// Placeholder shown (and matched) when a department is unknown.
pub const DEPARTMENT_UNSPECIFIED: &str = "Department unspecified";
