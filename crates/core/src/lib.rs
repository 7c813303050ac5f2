//! Domain rules for the notekeep service.
//!
//! Everything in this crate is free of I/O so the rules can be unit tested
//! without a database. The `db` crate persists what these modules decide and
//! the `api` crate wires them to HTTP.

pub mod access;
pub mod error;
pub mod lifecycle;
pub mod note_filter;
pub mod paging;
pub mod roles;
pub mod share;
pub mod tags;
pub mod tokens;
pub mod types;
pub mod validation;
