pub mod analysis;
pub mod chat;
pub mod constants;
pub mod error;
pub mod extract;
pub mod llm_interaction;
pub mod log_sink;
pub mod presenter;
pub mod prompt;

pub use analysis::{normalize, AnalysisResult, Entity, EntityRecord};
pub use error::BotError;
pub use extract::extract_json;
