use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use weather_grader::config::GradingConfig;
use weather_grader::fetch::auth::ApiKey;
use weather_grader::fetch::{BasicClient, HttpClient, fetch_bytes, fetch_json};
use weather_grader::services::repo_host::{RepoHost, RepositoryMetadata};

const USER_AGENT: &str = "weather_grader";

/// Repository metadata client for the GitHub REST API.
///
/// Works unauthenticated for public repositories; a personal access token
/// raises the rate limit and unlocks private ones.
pub struct GithubClient {
    base_url: String,
    owner: String,
    repo: String,
    http: Box<dyn HttpClient>,
    project_start: DateTime<Utc>,
    tracked_weeks: usize,
}

impl GithubClient {
    pub fn new(
        owner: String,
        repo: String,
        token: Option<String>,
        config: &GradingConfig,
    ) -> Result<Self> {
        // GitHub rejects requests without a User-Agent header.
        let http: Box<dyn HttpClient> = match token {
            Some(token) => Box::new(ApiKey {
                inner: ApiKey::bearer(BasicClient::with_timeouts()?, token),
                header_name: "User-Agent".to_string(),
                key: USER_AGENT.to_string(),
            }),
            None => Box::new(ApiKey {
                inner: BasicClient::with_timeouts()?,
                header_name: "User-Agent".to_string(),
                key: USER_AGENT.to_string(),
            }),
        };

        Ok(Self {
            base_url: "https://api.github.com".to_string(),
            owner,
            repo,
            http,
            project_start: config.project_start,
            tracked_weeks: config.tracked_weeks,
        })
    }

    async fn repo_info(&self) -> Result<(String, DateTime<Utc>)> {
        let url = format!("{}/repos/{}/{}", self.base_url, self.owner, self.repo);
        let json = fetch_json(self.http.as_ref(), &url).await?;

        let name = json["name"].as_str().unwrap_or(&self.repo).to_string();
        let created_at = json["created_at"]
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| anyhow!("repository response missing created_at"))?;

        Ok((name, created_at))
    }

    /// Commits since project start, bucketed into per-week counts over the
    /// tracked weeks. Commits outside the window are ignored.
    async fn weekly_commits(&self) -> Result<Vec<u64>> {
        let since = self.project_start.format("%Y-%m-%dT%H:%M:%SZ");
        let url = format!(
            "{}/repos/{}/{}/commits?since={}&per_page=100",
            self.base_url, self.owner, self.repo, since
        );
        let json = fetch_json(self.http.as_ref(), &url).await?;

        let mut weekly = vec![0u64; self.tracked_weeks];
        if let Some(commits) = json.as_array() {
            for commit in commits {
                let Some(date) = commit["commit"]["author"]["date"]
                    .as_str()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                else {
                    continue;
                };
                let days = (date.with_timezone(&Utc) - self.project_start).num_days();
                if days >= 0 {
                    let week = (days / 7) as usize;
                    if week < self.tracked_weeks {
                        weekly[week] += 1;
                    }
                }
            }
        }

        Ok(weekly)
    }

    /// README character count; a missing README is 0, not an error.
    async fn readme_chars(&self) -> Result<u64> {
        let url = format!("{}/repos/{}/{}/readme", self.base_url, self.owner, self.repo);
        let json = match fetch_json(self.http.as_ref(), &url).await {
            Ok(json) => json,
            Err(_) => return Ok(0),
        };

        let Some(download_url) = json["download_url"].as_str() else {
            return Ok(0);
        };

        let bytes = fetch_bytes(self.http.as_ref(), download_url).await?;
        Ok(String::from_utf8_lossy(&bytes).chars().count() as u64)
    }
}

#[async_trait]
impl RepoHost for GithubClient {
    async fn repository_metadata(&self) -> Result<RepositoryMetadata> {
        let (name, created_at) = self.repo_info().await?;
        let weekly_commits = self.weekly_commits().await?;
        let readme_chars = self.readme_chars().await?;

        Ok(RepositoryMetadata {
            name,
            created_at,
            weekly_commits,
            readme_chars,
        })
    }
}
