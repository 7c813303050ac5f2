pub mod admin;
pub mod auth;
pub mod notes;
pub mod revisions;
pub mod share;
pub mod tags;
