//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT access-token generation and validation.
//! - [`cookies`] -- `AUTH-TOKEN` / `REFRESH-TOKEN` cookies and bearer resolution.

pub mod cookies;
pub mod jwt;
pub mod password;
