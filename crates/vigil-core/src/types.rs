use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identity and metadata of the pull request under review.
///
/// Built once from host metadata at pipeline start and read-only afterwards.
///
/// # Examples
///
/// ```
/// use vigil_core::PullRequestContext;
///
/// let ctx = PullRequestContext {
///     owner: "octocat".into(),
///     repo: "hello-world".into(),
///     number: 42,
///     title: "Fix login flow".into(),
///     description: String::new(),
/// };
/// assert_eq!(ctx.number, 42);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestContext {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Pull request number.
    pub number: u64,
    /// Pull request title.
    pub title: String,
    /// Pull request description, possibly empty.
    pub description: String,
}

/// A single inline review comment ready for submission.
///
/// The line number is always a new-file line number drawn from the diff's
/// added-line set for that path.
///
/// # Examples
///
/// ```
/// use vigil_core::ReviewComment;
/// use std::path::PathBuf;
///
/// let comment = ReviewComment {
///     path: PathBuf::from("src/auth.rs"),
///     line: 42,
///     body: "This unwrap can panic on empty input.".into(),
/// };
/// assert_eq!(comment.line, 42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewComment {
    /// Path to the file being commented on.
    pub path: PathBuf,
    /// Line number in the new version of the file.
    pub line: u32,
    /// Markdown comment body.
    pub body: String,
}
