//! Artifact identity: reference types, artifact kinds and the composite key.
//!
//! An artifact is generated clinical text owned by either a session or a
//! client. Every artifact kind belongs to exactly one reference type, so a
//! `client_bio` can never be requested for a session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::language::validate_language_code;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Reference type
// ---------------------------------------------------------------------------

/// The kind of entity that owns an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Session,
    Client,
}

impl ReferenceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReferenceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session" => Ok(Self::Session),
            "client" => Ok(Self::Client),
            other => Err(CoreError::validation(format!(
                "Invalid reference type '{other}'. Must be one of: session, client"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Artifact type
// ---------------------------------------------------------------------------

/// Enumerated clinical artifact kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    SessionTherapistSummary,
    SessionClientSummary,
    SessionProgressNote,
    ClientBio,
    ClientConceptualization,
    ClientPrepNote,
}

impl ArtifactType {
    /// Every artifact kind, in declaration order.
    pub const ALL: [ArtifactType; 6] = [
        Self::SessionTherapistSummary,
        Self::SessionClientSummary,
        Self::SessionProgressNote,
        Self::ClientBio,
        Self::ClientConceptualization,
        Self::ClientPrepNote,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SessionTherapistSummary => "session_therapist_summary",
            Self::SessionClientSummary => "session_client_summary",
            Self::SessionProgressNote => "session_progress_note",
            Self::ClientBio => "client_bio",
            Self::ClientConceptualization => "client_conceptualization",
            Self::ClientPrepNote => "client_prep_note",
        }
    }

    /// The reference type that owns artifacts of this kind.
    pub fn reference_type(self) -> ReferenceType {
        match self {
            Self::SessionTherapistSummary | Self::SessionClientSummary | Self::SessionProgressNote => {
                ReferenceType::Session
            }
            Self::ClientBio | Self::ClientConceptualization | Self::ClientPrepNote => {
                ReferenceType::Client
            }
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::validation(format!("Invalid artifact type '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Composite key
// ---------------------------------------------------------------------------

/// Composite identity of an artifact row. At most one row exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub reference_id: DbId,
    pub reference_type: ReferenceType,
    pub artifact_type: ArtifactType,
    pub language: String,
}

impl ArtifactKey {
    /// Build a key, rejecting an artifact kind requested against the wrong
    /// reference type and malformed language codes.
    pub fn new(
        reference_id: DbId,
        reference_type: ReferenceType,
        artifact_type: ArtifactType,
        language: &str,
    ) -> Result<Self, CoreError> {
        if artifact_type.reference_type() != reference_type {
            return Err(CoreError::validation(format!(
                "Artifact type '{artifact_type}' cannot be generated for a {reference_type}"
            )));
        }
        validate_language_code(language)?;
        Ok(Self {
            reference_id,
            reference_type,
            artifact_type,
            language: language.to_ascii_lowercase(),
        })
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.reference_type, self.reference_id, self.artifact_type, self.language
        )
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A persisted artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub key: ArtifactKey,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
