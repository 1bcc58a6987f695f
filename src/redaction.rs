use std::sync::LazyLock;

use regex::Regex;

/// US-style phone numbers: 3-3-4 digit groups with optional `-` or `.` separators
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").unwrap());

/// Email addresses
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap()
});

/// Dates as MM/DD/YYYY (2- or 4-digit year)
static DATE_SLASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b").unwrap());

/// Dates as YYYY-MM-DD
static DATE_ISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{1,2}-\d{1,2}\b").unwrap());

/// Strip residual structured identifiers the de-identification stage missed.
///
/// Last line of defense after the LLM pass: phone numbers, email addresses,
/// and dates are replaced with bracketed placeholder tokens. The placeholders
/// contain no digits or `@`, so no pattern can re-match a prior replacement
/// and the whole pass is idempotent.
///
/// Personal names are deliberately out of scope here; name redaction is the
/// de-identification stage's job.
pub fn scrub(text: &str) -> String {
    let text = PHONE.replace_all(text, "[CONTACT_INFO]");
    let text = EMAIL.replace_all(&text, "[EMAIL]");
    let text = DATE_SLASH.replace_all(&text, "[DATE]");
    let text = DATE_ISO.replace_all(&text, "[DATE]");
    text.into_owned()
}
