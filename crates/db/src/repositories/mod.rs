//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! `&mut PgConnection` as the first argument.

pub mod note_repo;
pub mod refresh_token_repo;
pub mod revision_repo;
pub mod role_repo;
pub mod share_token_repo;
pub mod tag_repo;
pub mod user_repo;

pub use note_repo::NoteRepo;
pub use refresh_token_repo::RefreshTokenRepo;
pub use revision_repo::RevisionRepo;
pub use role_repo::RoleRepo;
pub use share_token_repo::ShareTokenRepo;
pub use tag_repo::TagRepo;
pub use user_repo::UserRepo;
