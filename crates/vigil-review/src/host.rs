use async_trait::async_trait;

use vigil_core::{PullRequestContext, ReviewComment, VigilError};

/// Source-control host seen by the pipeline.
///
/// The three operations are the whole surface the orchestrator needs:
/// PR metadata, the raw unified diff (absence is a normal "nothing to
/// review" outcome, not an error), and an all-or-nothing review submission.
/// Tests substitute in-memory fakes.
#[async_trait]
pub trait PullRequestHost: Send + Sync {
    /// Fetch the pull request's identity and metadata.
    async fn fetch_pull_request(&self) -> Result<PullRequestContext, VigilError>;

    /// Fetch the unified diff, or `None` when the host has none to offer.
    async fn fetch_diff(&self, ctx: &PullRequestContext) -> Result<Option<String>, VigilError>;

    /// Submit one review carrying the full comment set.
    ///
    /// Called at most once per pipeline run, never with an empty set.
    async fn submit_review(
        &self,
        ctx: &PullRequestContext,
        comments: &[ReviewComment],
    ) -> Result<(), VigilError>;
}

/// GitHub pull request client.
///
/// Uses octocrab for the JSON routes and a plain HTTP client for the raw
/// diff media type.
pub struct GitHubHost {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    token: String,
    owner: String,
    repo: String,
    number: u64,
}

impl GitHubHost {
    /// Create a client from an explicit token or the `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Config`] if no token is available, or
    /// [`VigilError::Host`] if the client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vigil_review::host::GitHubHost;
    ///
    /// let host = GitHubHost::new(Some("ghp_xxxx"), "octocat", "hello-world", 42).unwrap();
    /// ```
    pub fn new(
        token: Option<&str>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        number: u64,
    ) -> Result<Self, VigilError> {
        let token = match token {
            Some(t) => t.to_string(),
            None => std::env::var("GITHUB_TOKEN").map_err(|_| {
                VigilError::Config(
                    "GITHUB_TOKEN not set. Pass --github-token or set GITHUB_TOKEN env var".into(),
                )
            })?,
        };

        let octocrab = octocrab::Octocrab::builder()
            .personal_token(token.clone())
            .build()
            .map_err(|e| VigilError::Host(format!("failed to create GitHub client: {e}")))?;

        let http = reqwest::Client::new();

        Ok(Self {
            octocrab,
            http,
            token,
            owner: owner.into(),
            repo: repo.into(),
            number,
        })
    }
}

#[async_trait]
impl PullRequestHost for GitHubHost {
    async fn fetch_pull_request(&self) -> Result<PullRequestContext, VigilError> {
        let pr = self
            .octocrab
            .pulls(&self.owner, &self.repo)
            .get(self.number)
            .await
            .map_err(|e| VigilError::Host(format!("failed to fetch pull request: {e}")))?;

        Ok(PullRequestContext {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            number: self.number,
            title: pr.title.unwrap_or_default(),
            description: pr.body.unwrap_or_default(),
        })
    }

    async fn fetch_diff(&self, ctx: &PullRequestContext) -> Result<Option<String>, VigilError> {
        let url = format!(
            "https://api.github.com/repos/{}/{}/pulls/{}",
            ctx.owner, ctx.repo, ctx.number
        );

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github.v3.diff")
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", "vigil")
            .send()
            .await
            .map_err(|e| VigilError::Host(format!("failed to fetch PR diff: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VigilError::Host(format!("GitHub API error {status}: {body}")));
        }

        let diff = response
            .text()
            .await
            .map_err(|e| VigilError::Host(format!("failed to read diff response: {e}")))?;

        if diff.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(diff))
    }

    async fn submit_review(
        &self,
        ctx: &PullRequestContext,
        comments: &[ReviewComment],
    ) -> Result<(), VigilError> {
        let review_comments: Vec<serde_json::Value> = comments
            .iter()
            .map(|c| {
                serde_json::json!({
                    "path": c.path.to_string_lossy(),
                    "line": c.line,
                    "side": "RIGHT",
                    "body": c.body,
                })
            })
            .collect();

        let route = format!(
            "/repos/{}/{}/pulls/{}/reviews",
            ctx.owner, ctx.repo, ctx.number
        );
        let body = serde_json::json!({
            "event": "COMMENT",
            "body": "Automated review.",
            "comments": review_comments,
        });

        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&body))
            .await
            .map_err(|e| VigilError::Host(format!("failed to post review: {e}")))?;

        Ok(())
    }
}

/// Parse a repository slug (`owner/name`) into its components.
///
/// CI environments deliver the repository this way (`GITHUB_REPOSITORY`).
///
/// # Errors
///
/// Returns [`VigilError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use vigil_review::host::parse_repo_slug;
///
/// let (owner, repo) = parse_repo_slug("octocat/hello-world").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// ```
pub fn parse_repo_slug(slug: &str) -> Result<(String, String), VigilError> {
    let Some((owner, repo)) = slug.split_once('/') else {
        return Err(VigilError::Config(format!(
            "invalid repository '{slug}', expected owner/name"
        )));
    };
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(VigilError::Config(format!(
            "invalid repository '{slug}', expected owner/name"
        )));
    }
    Ok((owner.to_string(), repo.to_string()))
}
