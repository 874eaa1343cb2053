pub mod account;
pub mod artifact;
pub mod client;
pub mod prompt;
pub mod session;
