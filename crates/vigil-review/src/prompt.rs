use std::fmt::Write;
use std::path::Path;

use vigil_core::PullRequestContext;
use vigil_diff::parser::{Hunk, LineKind};

const REVIEW_INSTRUCTIONS: &str = "\
You are an expert code reviewer examining one change from a pull request.

Rules:
- Only raise problems you are confident about: bugs, security issues, \
logic errors, race conditions, resource leaks
- Be terse: one short paragraph at most
- Do not describe the change or restate the diff
- If the change needs no improvement, respond with no output at all: \
no acknowledgement, no \"looks good\", not a single character";

/// Build the review request for one hunk of one file.
///
/// The prompt carries the target path, the PR title and description
/// verbatim, the instruction to stay silent when nothing is wrong (blank
/// output is how "no comment" is detected downstream), and the hunk in
/// standard diff notation with its changed lines listed `+`/`-` marked.
///
/// Pure function of its inputs: the same file, hunk, and context always
/// produce the same string.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use vigil_core::PullRequestContext;
/// use vigil_diff::parser::parse_unified_diff;
/// use vigil_review::prompt::build_review_prompt;
///
/// let files = parse_unified_diff(
///     "--- a/x.rs\n+++ b/x.rs\n@@ -1 +1,2 @@\n line\n+new\n",
/// );
/// let ctx = PullRequestContext {
///     owner: "o".into(),
///     repo: "r".into(),
///     number: 1,
///     title: "Add a line".into(),
///     description: String::new(),
/// };
/// let prompt = build_review_prompt(Path::new("x.rs"), &files[0].hunks[0], &ctx);
/// assert!(prompt.contains("x.rs"));
/// assert!(prompt.contains("+new"));
/// ```
pub fn build_review_prompt(path: &Path, hunk: &Hunk, ctx: &PullRequestContext) -> String {
    let mut prompt = String::new();
    prompt.push_str(REVIEW_INSTRUCTIONS);

    let _ = write!(prompt, "\n\nPull request: {}\n", ctx.title);
    if !ctx.description.is_empty() {
        let _ = write!(prompt, "\n{}\n", ctx.description);
    }

    let _ = write!(prompt, "\nFile: {}\n", path.display());
    let _ = write!(prompt, "\nChange:\n{hunk}");

    prompt.push_str("\nChanged lines:\n");
    for line in &hunk.lines {
        match line.kind {
            LineKind::Added | LineKind::Removed => {
                let _ = writeln!(prompt, "{}{}", line.marker(), line.content);
            }
            LineKind::Context => {}
        }
    }

    prompt
}
