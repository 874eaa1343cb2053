//! Per-request context passed explicitly into every orchestration call.

use scribe_core::generation::RenderContext;
use scribe_core::language::{language_name, DEFAULT_LANGUAGE};
use scribe_core::repository::AccountProfile;
use scribe_core::types::DbId;
use tracing::Span;

/// Who is asking, in which language, and the span their work is logged under.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub account_id: DbId,
    pub request_id: Option<String>,
    /// Account language code, lowercased (`en`, `pt-br`).
    pub language: String,
    /// Title of the therapist's primary approach; empty when unset.
    pub primary_therapeutic_approach: String,
    pub span: Span,
}

impl RequestContext {
    /// Build a context from the account profile. A missing profile or
    /// language falls back to English.
    pub fn new(account_id: DbId, request_id: Option<String>, profile: Option<&AccountProfile>) -> Self {
        let language = profile
            .and_then(|p| p.language.as_deref())
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_ascii_lowercase();
        let primary_therapeutic_approach = profile
            .and_then(|p| p.primary_therapeutic_approach.clone())
            .unwrap_or_default();
        let span = tracing::info_span!(
            "artifact_request",
            account_id,
            request_id = request_id.as_deref().unwrap_or("-"),
        );

        Self {
            account_id,
            request_id,
            language,
            primary_therapeutic_approach,
            span,
        }
    }

    /// Trusted render values for a prompt written in `language_code`.
    pub fn render_context(&self, language_code: &str) -> RenderContext {
        RenderContext {
            language: language_name(language_code),
            primary_therapeutic_approach: self.primary_therapeutic_approach.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(language: Option<&str>, approach: Option<&str>) -> AccountProfile {
        AccountProfile {
            account_id: 1,
            language: language.map(str::to_string),
            primary_therapeutic_approach: approach.map(str::to_string),
        }
    }

    #[test]
    fn defaults_to_english_without_profile() {
        let ctx = RequestContext::new(1, None, None);
        assert_eq!(ctx.language, "en");
        assert_eq!(ctx.primary_therapeutic_approach, "");
    }

    #[test]
    fn uses_profile_language_and_approach() {
        let p = profile(Some("DE"), Some("Schema Therapy"));
        let ctx = RequestContext::new(1, Some("req-1".into()), Some(&p));
        assert_eq!(ctx.language, "de");

        let render = ctx.render_context(&ctx.language);
        assert_eq!(render.language, "German");
        assert_eq!(render.primary_therapeutic_approach, "Schema Therapy");
    }

    #[test]
    fn blank_profile_language_falls_back() {
        let p = profile(Some("  "), None);
        assert_eq!(RequestContext::new(1, None, Some(&p)).language, "en");
    }
}
