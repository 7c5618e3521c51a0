//! SeaORM entity definitions for the devmetrics database schema.

pub mod git_owner;
pub mod git_repo;
pub mod prelude;
pub mod raw_commit;
