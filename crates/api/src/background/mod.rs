//! Long-running background tasks spawned alongside the HTTP server.
//!
//! - [`tag_janitor`] -- deletes orphaned tags after note mutations commit.
//! - [`token_cleanup`] -- periodically drops expired or revoked refresh tokens.

pub mod tag_janitor;
pub mod token_cleanup;
