// Console rendering of an analysis, mirrored to the record log.

use std::fmt::Write as _;
use std::io::Write;

use tracing::warn;

use crate::analysis::AnalysisResult;
use crate::log_sink::LogSink;

/// Render the console block for one analysis.
pub fn render(analysis: &AnalysisResult) -> String {
    let mut out = String::from("\nChat-Bot:\nInstructions:\n");

    match analysis.instructions.first() {
        Some(instruction) => {
            let _ = writeln!(out, "- {}", instruction);
        }
        None => out.push_str("- No clear instruction found\n"),
    }

    out.push_str("\nActions:\n");
    if analysis.actions.is_empty() {
        out.push_str("- No actions identified\n");
    } else {
        for action in &analysis.actions {
            let _ = writeln!(out, "- {}", action);
        }
    }

    if !analysis.resolved_entities.is_empty() {
        out.push_str("\nContext:\n");
        for (key, entity) in &analysis.resolved_entities {
            if let Some(record) = entity.as_record() {
                let _ = writeln!(
                    out,
                    "- {}: {}",
                    record.display_name(key),
                    record.display_department()
                );
            }
        }
    }

    out.push('\n');
    out
}

/// Print the analysis to `out`, then write the input and the analysis
/// fields to the log as one record each. Never fails.
pub fn present<W: Write, L: Write>(
    input: &str,
    analysis: &AnalysisResult,
    out: &mut W,
    log: &mut LogSink<L>,
) {
    if let Err(e) = out
        .write_all(render(analysis).as_bytes())
        .and_then(|_| out.flush())
    {
        warn!("Failed to print analysis: {}", e);
    }

    log.info(&format!("User: {}", input));
    log.info(&format!("Instructions: {:?}", analysis.instructions));
    log.info(&format!("Actions: {:?}", analysis.actions));
    if !analysis.resolved_entities.is_empty() {
        let context = serde_json::to_string(&analysis.resolved_entities)
            .unwrap_or_else(|_| format!("{:?}", analysis.resolved_entities));
        log.info(&format!("Context: {}", context));
    }
}
