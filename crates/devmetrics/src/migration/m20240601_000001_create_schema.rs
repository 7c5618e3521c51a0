//! Initial migration to create the devmetrics database schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_git_owners(manager).await?;
        self.create_git_repos(manager).await?;
        self.create_raw_commits(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RawCommits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GitRepos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GitOwners::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_git_owners(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GitOwners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GitOwners::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GitOwners::IsOrg)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GitOwners::LastUpdateTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GitOwners::LinkedProjects)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(
                        ColumnDef::new(GitOwners::Ecosystem)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_git_repos(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GitRepos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GitRepos::FullName)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    // Identity
                    .col(ColumnDef::new(GitRepos::Id).big_integer().not_null())
                    .col(ColumnDef::new(GitRepos::NodeId).string().not_null())
                    .col(ColumnDef::new(GitRepos::Owner).string().not_null())
                    .col(
                        ColumnDef::new(GitRepos::CreatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // Content
                    .col(ColumnDef::new(GitRepos::Name).string().not_null())
                    .col(ColumnDef::new(GitRepos::Description).text().null())
                    .col(ColumnDef::new(GitRepos::Language).string().null())
                    .col(ColumnDef::new(GitRepos::DefaultBranch).string().null())
                    .col(ColumnDef::new(GitRepos::Homepage).text().null())
                    .col(ColumnDef::new(GitRepos::License).json().null())
                    .col(
                        ColumnDef::new(GitRepos::Topics)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(
                        ColumnDef::new(GitRepos::Tags)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(
                        ColumnDef::new(GitRepos::Ecosystem)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    // URLs
                    .col(ColumnDef::new(GitRepos::HtmlUrl).string().null())
                    .col(ColumnDef::new(GitRepos::SshUrl).string().null())
                    .col(ColumnDef::new(GitRepos::CloneUrl).string().null())
                    // Flags
                    .col(
                        ColumnDef::new(GitRepos::Fork)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GitRepos::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GitRepos::Disabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(GitRepos::IsTemplate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(GitRepos::HasIssues).boolean().null())
                    .col(ColumnDef::new(GitRepos::HasProjects).boolean().null())
                    .col(ColumnDef::new(GitRepos::HasWiki).boolean().null())
                    .col(ColumnDef::new(GitRepos::HasPages).boolean().null())
                    .col(ColumnDef::new(GitRepos::HasDownloads).boolean().null())
                    .col(ColumnDef::new(GitRepos::HasDiscussions).boolean().null())
                    // Statistics
                    .col(
                        ColumnDef::new(GitRepos::Size)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(GitRepos::ForksCount).big_integer().null())
                    .col(
                        ColumnDef::new(GitRepos::StargazersCount)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(GitRepos::WatchersCount).big_integer().null())
                    .col(
                        ColumnDef::new(GitRepos::OpenIssuesCount)
                            .big_integer()
                            .null(),
                    )
                    // Timestamps
                    .col(
                        ColumnDef::new(GitRepos::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GitRepos::PushedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GitRepos::SyncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_git_repos_owner")
                    .table(GitRepos::Table)
                    .col(GitRepos::Owner)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_raw_commits(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        // No foreign key to git_repos: commits are written before their
        // repository row exists.
        manager
            .create_table(
                Table::create()
                    .table(RawCommits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RawCommits::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RawCommits::Repo).string().not_null())
                    .col(ColumnDef::new(RawCommits::Hash).string().not_null())
                    .col(ColumnDef::new(RawCommits::AuthorName).string().not_null())
                    .col(ColumnDef::new(RawCommits::AuthorEmail).string().not_null())
                    .col(
                        ColumnDef::new(RawCommits::CommitterName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RawCommits::CommitterEmail)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RawCommits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RawCommits::Message).text().not_null())
                    .to_owned(),
            )
            .await?;

        // Idempotency key for backfill reruns
        manager
            .create_index(
                Index::create()
                    .name("idx_raw_commits_repo_hash")
                    .table(RawCommits::Table)
                    .col(RawCommits::Repo)
                    .col(RawCommits::Hash)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum GitOwners {
    Table,
    Name,
    IsOrg,
    LastUpdateTime,
    LinkedProjects,
    Ecosystem,
}

#[derive(DeriveIden)]
enum GitRepos {
    Table,
    FullName,
    Id,
    NodeId,
    Owner,
    CreatedAt,
    Name,
    Description,
    Language,
    DefaultBranch,
    Homepage,
    License,
    Topics,
    Tags,
    Ecosystem,
    HtmlUrl,
    SshUrl,
    CloneUrl,
    Fork,
    Archived,
    Disabled,
    IsTemplate,
    HasIssues,
    HasProjects,
    HasWiki,
    HasPages,
    HasDownloads,
    HasDiscussions,
    Size,
    ForksCount,
    StargazersCount,
    WatchersCount,
    OpenIssuesCount,
    UpdatedAt,
    PushedAt,
    SyncedAt,
}

#[derive(DeriveIden)]
enum RawCommits {
    Table,
    Id,
    Repo,
    Hash,
    AuthorName,
    AuthorEmail,
    CommitterName,
    CommitterEmail,
    CreatedAt,
    Message,
}
