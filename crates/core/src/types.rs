//! Primitive aliases shared by every crate in the workspace.

/// Primary key of every table (`BIGSERIAL`).
pub type DbId = i64;

/// A `TIMESTAMPTZ` value, always UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
