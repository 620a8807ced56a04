/// Pull the JSON object out of free-form model output.
///
/// Takes everything from the first `{` to the last `}`, trims it, and drops a
/// leading "```json" (or bare "```") fence marker. Returns `None` when the
/// text has no such span. Braces are not balanced-checked: stray braces in
/// surrounding commentary produce a malformed slice that fails to parse later.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }

    let candidate = text[start..=end].trim();
    let candidate = candidate
        .strip_prefix("```json")
        .or_else(|| candidate.strip_prefix("```"))
        .unwrap_or(candidate);
    Some(candidate.trim())
}
