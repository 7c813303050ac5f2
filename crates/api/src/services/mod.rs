//! Business rules for notes, sharing and accounts.
//!
//! Services take the caller's [`Principal`](notekeep_core::access::Principal)
//! explicitly. Mutating services run inside a
//! [`UnitOfWork`](crate::uow::UnitOfWork) owned by the handler; read-only
//! services take a plain connection.

pub mod auth;
pub mod note_access;
pub mod note_command;
pub mod note_query;
pub mod note_revision;
pub mod note_share;
pub mod tag_resolver;
pub mod users;
