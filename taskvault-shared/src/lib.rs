//! # TaskVault Shared Library
//!
//! This crate contains the models, authentication primitives, and store
//! plumbing shared by the TaskVault API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their store operations
//! - `auth`: Password hashing, session tokens, and session verification
//! - `db`: Connection pool and migration runner
//! - `email`: Fire-and-forget account notifications

pub mod auth;
pub mod db;
pub mod email;
pub mod models;

/// Current version of the TaskVault shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
