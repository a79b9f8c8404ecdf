//! Cleanup helpers for raw model output.

/// Strip `<think>...</think>` blocks emitted by reasoning models.
///
/// Handles both complete and incomplete think blocks:
/// - `<think>reasoning</think>content` -> `content`
/// - `<think>reasoning without closing` -> `` (strips to end)
pub fn strip_think_tags(text: &str) -> String {
    let mut result = text.to_string();
    while let Some(start) = result.find("<think>") {
        if let Some(end) = result[start..].find("</think>") {
            result = format!("{}{}", &result[..start], &result[start + end + 8..]);
        } else {
            // Unclosed tag: drop everything after it
            result = result[..start].to_string();
            break;
        }
    }
    result
}

/// Normalize a raw `response` field: drop think blocks, trim whitespace.
pub fn clean_response(raw: &str) -> String {
    strip_think_tags(raw).trim().to_string()
}

/// Split a comma-separated model answer into tags.
///
/// Order is preserved. Each piece is trimmed and empty pieces are dropped;
/// no case folding or deduplication happens here.
pub fn split_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
