//! Access token handling. Tokens are verified here and minted only for
//! tooling and tests.

pub mod jwt;
