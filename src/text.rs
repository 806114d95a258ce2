use std::sync::LazyLock;

use regex::Regex;

static RE_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());
static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());
static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[\w.-]+@[\w.-]+\.\w{2,4}\b").unwrap());
static RE_PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{2,3}[-.\s]?\d{2,3}[-.\s]?\d{2,3}[-.\s]?\d{2,3}\b").unwrap()
});

/// Placeholder used when a ticket has no description text.
pub const NO_DESCRIPTION: &str = "No description.";

/// Sanitize a ticket description before it enters a prompt: collapse
/// newlines, squeeze whitespace runs, and redact emails and phone numbers.
pub fn clean_description(text: Option<&str>) -> String {
    let raw = match text {
        Some(t) if !t.is_empty() => t,
        _ => return NO_DESCRIPTION.to_string(),
    };
    let text = RE_NEWLINES.replace_all(raw, " ");
    let text = RE_SPACES.replace_all(&text, " ");
    let text = RE_EMAIL.replace_all(&text, "[EMAIL_REDACTED]");
    let text = RE_PHONE.replace_all(&text, "[PHONE_REDACTED]");
    text.trim().to_string()
}

/// Strip markdown code fences from LLM responses.
pub fn strip_code_fences(s: &str) -> &str {
    let s = s.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else if let Some(rest) = s.strip_prefix("```markdown") {
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else if let Some(rest) = s.strip_prefix("```") {
        rest.strip_suffix("```").unwrap_or(rest).trim()
    } else {
        s
    }
}
