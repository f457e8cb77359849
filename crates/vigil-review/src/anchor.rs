//! Maps a critique onto the (path, line) anchor it should be posted at.

use std::path::Path;

use vigil_core::ReviewComment;
use vigil_diff::parser::{Hunk, LineKind};

/// Attach a critique to the hunk's anchor line.
///
/// The anchor is the *last* added line in physical order, so feedback sits
/// adjacent to the most recently introduced code. A hunk with no added
/// lines cannot host an inline comment and the critique is dropped; an
/// absent critique short-circuits without touching the hunk.
///
/// The returned line number is always drawn from the hunk's added-line set.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use vigil_diff::parser::parse_unified_diff;
/// use vigil_review::anchor::map_comment;
///
/// let files = parse_unified_diff(
///     "--- a/x.rs\n+++ b/x.rs\n@@ -1 +1,2 @@\n line\n+new\n",
/// );
/// let comment = map_comment(
///     Path::new("x.rs"),
///     &files[0].hunks[0],
///     Some("prefer a named constant".into()),
/// )
/// .unwrap();
/// assert_eq!(comment.line, 2);
/// ```
pub fn map_comment(path: &Path, hunk: &Hunk, critique: Option<String>) -> Option<ReviewComment> {
    let body = critique?;
    let line = hunk
        .lines
        .iter()
        .rev()
        .find(|l| l.kind == LineKind::Added)?
        .new_line?;
    Some(ReviewComment {
        path: path.to_path_buf(),
        line,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_diff::parser::parse_unified_diff;

    fn hunk_from(diff: &str) -> Hunk {
        parse_unified_diff(diff)[0].hunks[0].clone()
    }

    #[test]
    fn anchors_to_last_added_line() {
        let hunk = hunk_from(
            "--- a/f.rs\n\
             +++ b/f.rs\n\
             @@ -1,2 +1,3 @@\n \
             context1\n\
             +addedA\n\
             -removed1\n\
             +addedB\n",
        );
        let comment = map_comment(Path::new("f.rs"), &hunk, Some("tighten this".into())).unwrap();
        // addedB is physically last among additions: context1 is new line 1,
        // addedA line 2, addedB line 3.
        assert_eq!(comment.line, 3);
        assert_eq!(comment.path, Path::new("f.rs"));
        assert_eq!(comment.body, "tighten this");
    }

    #[test]
    fn returned_line_is_from_the_added_set() {
        let hunk = hunk_from(
            "--- a/f.rs\n\
             +++ b/f.rs\n\
             @@ -10,2 +10,4 @@\n \
             keep\n\
             +one\n \
             keep2\n\
             +two\n",
        );
        let added: Vec<u32> = hunk
            .lines
            .iter()
            .filter(|l| l.kind == LineKind::Added)
            .filter_map(|l| l.new_line)
            .collect();
        let comment = map_comment(Path::new("f.rs"), &hunk, Some("note".into())).unwrap();
        assert!(added.contains(&comment.line));
    }

    #[test]
    fn removal_only_hunk_drops_the_critique() {
        let hunk = hunk_from(
            "--- a/f.rs\n\
             +++ b/f.rs\n\
             @@ -1,2 +1,1 @@\n \
             kept\n\
             -gone\n",
        );
        let result = map_comment(Path::new("f.rs"), &hunk, Some("well-formed critique".into()));
        assert!(result.is_none());
    }

    #[test]
    fn absent_critique_short_circuits() {
        let hunk = hunk_from(
            "--- a/f.rs\n\
             +++ b/f.rs\n\
             @@ -1 +1,2 @@\n \
             line\n\
             +new\n",
        );
        assert!(map_comment(Path::new("f.rs"), &hunk, None).is_none());
    }
}
