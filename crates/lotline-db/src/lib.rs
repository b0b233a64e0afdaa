//! # Lotline DB
//!
//! Campaign persistence for lotline.
//!
//! A campaign is one row per inventory item, keyed by stock number. Its
//! per-platform proposed posts live in a single JSONB column and are
//! mutated as a unit: read the whole document, modify the posts in
//! memory, write the column back guarded by an optimistic `version`
//! counter. Concurrent writers lose with [`DbError::VersionConflict`]
//! instead of silently interleaving scheduler state.

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;

pub use error::DbError;
pub use migrations::run_migrations;
pub use models::campaign::{self, Campaign};
pub use models::proposed_post::ProposedPost;
pub use pool::connect_pool;
