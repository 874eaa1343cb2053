//! Content rules shared by generation and invalidation.
//!
//! - [`strip_code_fence`] removes a markdown fence that wraps an entire model
//!   response.
//! - [`normalize_content`] and [`detect_content_change`] decide whether a
//!   session edit touched the text its artifacts were derived from.
//! - [`InvalidationOutcome`] reports what such an edit deleted.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Opening fence with an optional language tag on its own line, then the
/// body, then a closing fence at the very end.
static OUTER_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A```[A-Za-z0-9_+.#-]*[ \t]*\r?\n(.*?)(?:\r?\n)?[ \t]*```\z")
        .expect("valid regex")
});

// ---------------------------------------------------------------------------
// Code fences
// ---------------------------------------------------------------------------

/// Unwrap a response that is entirely enclosed in one fenced code block.
///
/// Only a response that both starts and ends with a fence is unwrapped, and
/// only when the body holds no further fence lines. Anything else, including
/// inline fences, is returned unchanged.
pub fn strip_code_fence(content: &str) -> String {
    let trimmed = content.trim();
    let Some(caps) = OUTER_FENCE_RE.captures(trimmed) else {
        return content.to_string();
    };
    let body = caps.get(1).map_or("", |m| m.as_str());
    if body.lines().any(|line| line.trim_start().starts_with("```")) {
        return content.to_string();
    }
    body.trim().to_string()
}

// ---------------------------------------------------------------------------
// Change detection
// ---------------------------------------------------------------------------

/// Trim a text field; empty or whitespace-only becomes `None`.
pub fn normalize_content(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Source text of a session that artifacts are derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContent {
    pub transcript: Option<String>,
    pub note: Option<String>,
}

/// Result of comparing session content before and after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentChange {
    Unchanged,
    ContentChanged,
}

impl ContentChange {
    pub fn is_changed(self) -> bool {
        matches!(self, Self::ContentChanged)
    }
}

/// Compare normalized transcript and note. Titles and other fields are not
/// part of the comparison.
pub fn detect_content_change(before: &SessionContent, after: &SessionContent) -> ContentChange {
    let transcript_changed = normalize_content(before.transcript.as_deref())
        != normalize_content(after.transcript.as_deref());
    let note_changed =
        normalize_content(before.note.as_deref()) != normalize_content(after.note.as_deref());

    if transcript_changed || note_changed {
        ContentChange::ContentChanged
    } else {
        ContentChange::Unchanged
    }
}

/// What a session update invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationOutcome {
    pub change: ContentChange,
    pub session_artifacts_deleted: u64,
    pub client_artifacts_deleted: u64,
}

impl InvalidationOutcome {
    pub fn unchanged() -> Self {
        Self {
            change: ContentChange::Unchanged,
            session_artifacts_deleted: 0,
            client_artifacts_deleted: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
