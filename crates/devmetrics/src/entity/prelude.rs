//! Common re-exports for convenient entity usage.

pub use super::git_owner::{
    ActiveModel as GitOwnerActiveModel, Column as GitOwnerColumn, Entity as GitOwner,
    Model as GitOwnerModel,
};
pub use super::git_repo::{
    ActiveModel as GitRepoActiveModel, Column as GitRepoColumn, Entity as GitRepo,
    Model as GitRepoModel,
};
pub use super::raw_commit::{
    ActiveModel as RawCommitActiveModel, Column as RawCommitColumn, Entity as RawCommit,
    Model as RawCommitModel,
};
