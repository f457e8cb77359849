use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use vigil_core::{PullRequestContext, ReviewComment, VigilError};
use vigil_diff::filter::DiffFilter;
use vigil_diff::parser::{parse_unified_diff, Hunk};

use crate::anchor;
use crate::host::PullRequestHost;
use crate::llm::ReviewClient;
use crate::prompt;

/// Result of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    /// Comments in file/hunk appearance order.
    pub comments: Vec<ReviewComment>,
    /// Whether a review was submitted to the host.
    pub submitted: bool,
    /// Statistics about the run.
    pub stats: ReviewStats,
}

/// Statistics about a pipeline run.
#[derive(Debug, Clone)]
pub struct ReviewStats {
    /// Files present in the parsed diff.
    pub files_changed: usize,
    /// Files removed by the exclusion globs.
    pub files_excluded: usize,
    /// (file, hunk) pairs sent for analysis.
    pub hunks_analyzed: usize,
    /// Model identifier used for the run.
    pub model_used: String,
}

impl ReviewOutcome {
    fn empty(model: &str) -> Self {
        Self {
            comments: Vec::new(),
            submitted: false,
            stats: ReviewStats {
                files_changed: 0,
                files_excluded: 0,
                hunks_analyzed: 0,
                model_used: model.to_string(),
            },
        }
    }
}

impl fmt::Display for ReviewOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Model: {} | Files: {} (excluded: {}) | Hunks: {} | Comments: {}{}",
            self.stats.model_used,
            self.stats.files_changed,
            self.stats.files_excluded,
            self.stats.hunks_analyzed,
            self.comments.len(),
            if self.submitted { " (submitted)" } else { "" },
        )?;

        for c in &self.comments {
            writeln!(f, "\n{}:{}", c.path.display(), c.line)?;
            writeln!(f, "  {}", c.body)?;
        }

        Ok(())
    }
}

/// One (file, hunk) pair queued for analysis, tagged with its appearance
/// index so output order can be restored after concurrent completion calls.
struct AnalysisUnit {
    index: usize,
    path: PathBuf,
    hunk: Hunk,
    prompt: String,
}

/// Drives the full review pipeline.
///
/// Fetches PR metadata and diff from the host, parses and filters the diff,
/// fans the (file, hunk) pairs out to the completion service under a
/// concurrency cap, anchors the critiques, and submits a single review when
/// at least one comment was produced.
///
/// Failures of individual completion calls and unanchorable critiques
/// degrade to zero comments for that pair; metadata/diff fetch and review
/// submission failures abort the run.
pub struct ReviewPipeline {
    host: Arc<dyn PullRequestHost>,
    client: ReviewClient,
    filter: DiffFilter,
    max_concurrency: usize,
}

impl ReviewPipeline {
    /// Assemble a pipeline from its collaborators.
    pub fn new(
        host: Arc<dyn PullRequestHost>,
        client: ReviewClient,
        filter: DiffFilter,
        max_concurrency: usize,
    ) -> Self {
        Self {
            host,
            client,
            filter,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Run the pipeline once.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Host`] when PR metadata or the diff cannot be
    /// fetched, or when review submission fails. Everything else degrades to
    /// fewer comments.
    pub async fn run(&self) -> Result<ReviewOutcome, VigilError> {
        let ctx = self.host.fetch_pull_request().await?;
        info!(
            "reviewing {}/{}#{}: {}",
            ctx.owner, ctx.repo, ctx.number, ctx.title
        );

        let Some(diff_text) = self.host.fetch_diff(&ctx).await? else {
            info!("no diff found, nothing to review");
            return Ok(ReviewOutcome::empty(self.client.model()));
        };

        let files = parse_unified_diff(&diff_text);
        let files_changed = files.len();
        let filtered = self.filter.filter(files);
        for skipped in &filtered.skipped {
            debug!(
                "excluded {} (pattern '{}')",
                skipped.path.display(),
                skipped.pattern
            );
        }
        let files_excluded = filtered.skipped.len();

        let units = build_units(filtered.kept, &ctx);
        let hunks_analyzed = units.len();
        debug!("analyzing {hunks_analyzed} hunks across {files_changed} changed files");

        let comments = self.analyze(units).await;

        let submitted = if comments.is_empty() {
            info!("no comments produced, skipping review submission");
            false
        } else {
            self.host.submit_review(&ctx, &comments).await?;
            info!("submitted review with {} comments", comments.len());
            true
        };

        Ok(ReviewOutcome {
            comments,
            submitted,
            stats: ReviewStats {
                files_changed,
                files_excluded,
                hunks_analyzed,
                model_used: self.client.model().to_string(),
            },
        })
    }

    /// Fan units out to the completion service under the concurrency cap,
    /// then restore appearance order.
    async fn analyze(&self, units: Vec<AnalysisUnit>) -> Vec<ReviewComment> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();

        for unit in units {
            let client = self.client.clone();
            let sem = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let Ok(_permit) = sem.acquire_owned().await else {
                    return (unit.index, None);
                };
                let critique = client.review(&unit.prompt).await;
                let had_critique = critique.is_some();
                let comment = anchor::map_comment(&unit.path, &unit.hunk, critique);
                if had_critique && comment.is_none() {
                    debug!(
                        "critique for {} dropped: hunk has no added lines",
                        unit.path.display()
                    );
                }
                (unit.index, comment)
            });
        }

        let mut slots: Vec<(usize, Option<ReviewComment>)> = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(slot) => slots.push(slot),
                Err(e) => warn!("analysis task failed: {e}"),
            }
        }

        slots.sort_by_key(|(index, _)| *index);
        slots.into_iter().filter_map(|(_, comment)| comment).collect()
    }
}

fn build_units(files: Vec<vigil_diff::parser::FileDiff>, ctx: &PullRequestContext) -> Vec<AnalysisUnit> {
    let mut units = Vec::new();
    for file in files {
        let Some(path) = file.new_path else {
            // Deletions have no destination to anchor a comment to.
            debug!(
                "skipping deleted file {}",
                file.old_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            );
            continue;
        };
        for hunk in file.hunks {
            let prompt = prompt::build_review_prompt(&path, &hunk, ctx);
            units.push(AnalysisUnit {
                index: units.len(),
                path: path.clone(),
                hunk,
                prompt,
            });
        }
    }
    units
}
