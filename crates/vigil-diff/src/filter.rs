//! Pre-analysis file filtering.
//!
//! Drops changed files matching the configured exclusion globs before any
//! prompt is built, so excluded paths never reach the completion service.

use std::path::{Path, PathBuf};

use vigil_core::VigilError;

use crate::parser::FileDiff;

/// Compiled exclusion patterns applied to changed-file paths.
///
/// Matching is case-sensitive and anchored to the full destination path,
/// with the usual glob forms (`*`, `**`, `?`, character classes).
///
/// # Examples
///
/// ```
/// use vigil_diff::filter::DiffFilter;
///
/// let filter = DiffFilter::new(&["*.lock".into()]).unwrap();
/// assert!(filter.is_excluded("Cargo.lock".as_ref()).is_some());
/// assert!(filter.is_excluded("src/main.rs".as_ref()).is_none());
/// ```
#[derive(Debug)]
pub struct DiffFilter {
    patterns: Vec<glob::Pattern>,
}

impl DiffFilter {
    /// Compile a filter from glob pattern strings.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::Config`] naming the first invalid pattern, so a
    /// typo in the exclusion list surfaces at startup rather than silently
    /// excluding nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use vigil_diff::filter::DiffFilter;
    ///
    /// assert!(DiffFilter::new(&["docs/**".into()]).is_ok());
    /// assert!(DiffFilter::new(&["[unclosed".into()]).is_err());
    /// ```
    pub fn new(patterns: &[String]) -> Result<Self, VigilError> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for raw in patterns {
            let pattern = glob::Pattern::new(raw).map_err(|e| {
                VigilError::Config(format!("invalid exclusion pattern '{raw}': {e}"))
            })?;
            compiled.push(pattern);
        }
        Ok(Self { patterns: compiled })
    }

    /// The pattern excluding `path`, if any.
    pub fn is_excluded(&self, path: &Path) -> Option<&glob::Pattern> {
        self.patterns.iter().find(|p| p.matches_path(path))
    }

    /// Split parsed file diffs into kept and skipped sets.
    ///
    /// A file is skipped when its destination path matches any pattern.
    /// Deleted files carry no destination path and always pass through.
    /// Appearance order is preserved and surviving records are untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use vigil_diff::filter::DiffFilter;
    /// use vigil_diff::parser::parse_unified_diff;
    ///
    /// let diff = "diff --git a/src/main.rs b/src/main.rs\n\
    ///             --- a/src/main.rs\n\
    ///             +++ b/src/main.rs\n\
    ///             @@ -1,2 +1,3 @@\n\
    ///              line\n\
    ///             +new\n";
    /// let filter = DiffFilter::new(&[]).unwrap();
    /// let outcome = filter.filter(parse_unified_diff(diff));
    /// assert_eq!(outcome.kept.len(), 1);
    /// assert!(outcome.skipped.is_empty());
    /// ```
    pub fn filter(&self, files: Vec<FileDiff>) -> FilterOutcome {
        let mut kept = Vec::new();
        let mut skipped = Vec::new();

        for file in files {
            let matched = file
                .new_path
                .as_deref()
                .and_then(|path| self.is_excluded(path));
            match matched {
                Some(pattern) => skipped.push(SkippedFile {
                    path: file.new_path.clone().unwrap_or_default(),
                    pattern: pattern.to_string(),
                }),
                None => kept.push(file),
            }
        }

        FilterOutcome { kept, skipped }
    }
}

/// Result of filtering parsed diffs.
pub struct FilterOutcome {
    /// Files that passed the filter, in appearance order.
    pub kept: Vec<FileDiff>,
    /// Files excluded by a pattern, with the pattern that matched.
    pub skipped: Vec<SkippedFile>,
}

/// A file excluded during filtering.
#[derive(Debug, Clone)]
pub struct SkippedFile {
    /// Destination path of the excluded file.
    pub path: PathBuf,
    /// The pattern that matched it.
    pub pattern: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_unified_diff;

    fn make_diff(path: &str) -> Vec<FileDiff> {
        let diff = format!(
            "diff --git a/{path} b/{path}\n\
             --- a/{path}\n\
             +++ b/{path}\n\
             @@ -1,1 +1,2 @@\n\
              line\n\
             +new line\n"
        );
        parse_unified_diff(&diff)
    }

    fn deletion_diff(path: &str) -> Vec<FileDiff> {
        let diff = format!(
            "diff --git a/{path} b/{path}\n\
             deleted file mode 100644\n\
             --- a/{path}\n\
             +++ /dev/null\n\
             @@ -1,1 +0,0 @@\n\
             -gone\n"
        );
        parse_unified_diff(&diff)
    }

    #[test]
    fn empty_pattern_set_keeps_everything() {
        let filter = DiffFilter::new(&[]).unwrap();
        let outcome = filter.filter(make_diff("src/main.rs"));
        assert_eq!(outcome.kept.len(), 1);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn star_pattern_crosses_directories() {
        let filter = DiffFilter::new(&["*.md".into()]).unwrap();

        let outcome = filter.filter(make_diff("docs/readme.md"));
        assert!(outcome.kept.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].pattern, "*.md");

        let outcome = filter.filter(make_diff("src/readme.md.ts"));
        assert_eq!(outcome.kept.len(), 1);
    }

    #[test]
    fn double_star_pattern_matches_any_depth() {
        let filter = DiffFilter::new(&["**/*.md".into()]).unwrap();
        assert!(filter.filter(make_diff("docs/readme.md")).kept.is_empty());
        assert!(filter
            .filter(make_diff("a/b/c/notes.md"))
            .kept
            .is_empty());
        assert_eq!(filter.filter(make_diff("src/readme.md.ts")).kept.len(), 1);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let filter = DiffFilter::new(&["*.MD".into()]).unwrap();
        assert_eq!(filter.filter(make_diff("docs/readme.md")).kept.len(), 1);
        assert!(filter.filter(make_diff("docs/README.MD")).kept.is_empty());
    }

    #[test]
    fn any_matching_pattern_excludes() {
        let filter = DiffFilter::new(&["*.lock".into(), "dist/**".into()]).unwrap();
        assert!(filter.filter(make_diff("yarn.lock")).kept.is_empty());
        assert!(filter.filter(make_diff("dist/bundle.js")).kept.is_empty());
        assert_eq!(filter.filter(make_diff("src/app.js")).kept.len(), 1);
    }

    #[test]
    fn deleted_files_pass_through() {
        let filter = DiffFilter::new(&["**/*".into()]).unwrap();
        let outcome = filter.filter(deletion_diff("src/gone.rs"));
        assert_eq!(outcome.kept.len(), 1);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let filter = DiffFilter::new(&["*.md".into()]).unwrap();
        let mut files = make_diff("docs/readme.md");
        files.extend(make_diff("src/lib.rs"));
        files.extend(make_diff("notes.md"));

        let once = filter.filter(files);
        let kept_once = once.kept.clone();
        let twice = filter.filter(once.kept);
        assert_eq!(twice.kept, kept_once);
        assert!(twice.skipped.is_empty());
    }

    #[test]
    fn order_and_contents_preserved() {
        let mut files = make_diff("a.rs");
        files.extend(make_diff("skip.md"));
        files.extend(make_diff("b.rs"));
        let expected_a = files[0].clone();
        let expected_b = files[2].clone();

        let filter = DiffFilter::new(&["*.md".into()]).unwrap();
        let outcome = filter.filter(files);
        assert_eq!(outcome.kept, vec![expected_a, expected_b]);
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let err = DiffFilter::new(&["[unclosed".into()]).unwrap_err();
        assert!(err.to_string().contains("[unclosed"));
    }
}
