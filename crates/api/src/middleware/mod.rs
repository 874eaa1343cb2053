//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated account from a JWT Bearer token.
//! - [`context::AccountContext`] -- Builds the per-request pipeline context.

pub mod auth;
pub mod context;
