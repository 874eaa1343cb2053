//! Bearer token verification.
//!
//! Tokens are HS256 JWTs minted by the identity service. `sub` carries the
//! account id. When an issuer is configured the `iss` claim must match it.
//! This service only verifies; it never mints tokens.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use scribe_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::config::env_parse;

/// Claims the service reads from an access token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// The account id.
    pub sub: DbId,
    /// Expiry (UTC Unix seconds).
    pub exp: i64,
    /// Issued at (UTC Unix seconds).
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Token verification settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HMAC-SHA256 secret.
    pub secret: String,
    /// Required `iss` value, if any.
    pub issuer: Option<String>,
    /// Clock skew tolerated on `exp`.
    pub leeway_secs: u64,
}

const DEFAULT_LEEWAY_SECS: u64 = 30;

impl JwtConfig {
    /// Load token settings from the environment.
    ///
    /// | Env Var           | Required | Default |
    /// |-------------------|----------|---------|
    /// | `JWT_SECRET`      | **yes**  | --      |
    /// | `JWT_ISSUER`      | no       | unset   |
    /// | `JWT_LEEWAY_SECS` | no       | `30`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty, or a number fails to parse.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let issuer = std::env::var("JWT_ISSUER")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            secret,
            issuer,
            leeway_secs: env_parse("JWT_LEEWAY_SECS", DEFAULT_LEEWAY_SECS),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
            validation.required_spec_claims.insert("iss".to_string());
        }
        validation
    }
}

/// Check signature, expiry and (if configured) issuer, and return the claims.
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )
    .map(|data| data.claims)
}
