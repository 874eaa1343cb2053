//! Language code handling.
//!
//! Artifacts are keyed by a short language code (`en`, `de`, `pt-br`), while
//! prompts are rendered with the full English name of the language so the
//! model knows which language to answer in.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Language used when an account has no preference recorded.
pub const DEFAULT_LANGUAGE: &str = "en";

static LANGUAGE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z]{2,4})?$").expect("valid regex"));

/// Base-code to display-name table.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hu", "Hungarian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sv", "Swedish"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("zh", "Chinese"),
];

/// Validate a language code such as `en` or `pt-BR`.
pub fn validate_language_code(code: &str) -> Result<(), CoreError> {
    if !LANGUAGE_CODE_RE.is_match(code) {
        return Err(CoreError::validation(format!(
            "Invalid language code '{code}'"
        )));
    }
    Ok(())
}

/// Resolve a language code to its full name.
///
/// Region suffixes are ignored (`pt-br` resolves to `Portuguese`). Codes
/// without a known name resolve to the code itself, so rendering stays
/// deterministic.
pub fn language_name(code: &str) -> String {
    let base = code
        .split('-')
        .next()
        .unwrap_or(code)
        .to_ascii_lowercase();
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == base)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| code.to_string())
}
