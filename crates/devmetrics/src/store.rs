//! Persistence for owners, repositories and raw commits.
//!
//! The free functions in the submodules are thin SeaORM operations over a
//! `DatabaseConnection`. The sync engine only sees them through the
//! [`PersistenceGateway`] trait, which `DatabaseConnection` implements.

mod commit;
mod errors;
mod gateway;
mod owner;
mod repo;

pub use commit::{CommitRecord, append as append_commit};
pub use errors::{Result, StoreError};
pub use gateway::PersistenceGateway;
pub use owner::{create as create_owner, find as find_owner, touch as touch_owner};
pub use repo::{
    create as create_repo, find as find_repo, new_active_model as new_repo_active_model,
    refresh_active_model as refresh_repo_active_model, update as update_repo,
};
