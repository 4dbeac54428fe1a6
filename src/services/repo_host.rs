//! Trait and types for the source-control host holding the graded project.

use anyhow::Result;
use chrono::{DateTime, Utc};

/// Read-only snapshot of the repository facts the rubric scores.
#[derive(Debug, Clone)]
pub struct RepositoryMetadata {
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Commit counts per week since project start, oldest week first.
    pub weekly_commits: Vec<u64>,
    /// Character count of the README, 0 when the file is absent.
    pub readme_chars: u64,
}

/// Abstraction over a repository hosting API (e.g. GitHub).
#[async_trait::async_trait]
pub trait RepoHost {
    /// Fetches the metadata snapshot for the configured repository.
    async fn repository_metadata(&self) -> Result<RepositoryMetadata>;
}
