//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Insert/update DTOs used by the repositories
//! - Request payloads (`Deserialize` + `Validate`) and response views

pub mod note;
pub mod refresh_token;
pub mod revision;
pub mod role;
pub mod share_token;
pub mod tag;
pub mod user;
