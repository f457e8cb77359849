use std::fmt;
use std::path::PathBuf;

/// Classification of a single line within a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Line added in the new version (`+`).
    Added,
    /// Line removed from the old version (`-`).
    Removed,
    /// Unchanged line present in both versions.
    Context,
}

/// A single line of a hunk, in physical diff order.
///
/// Added and context lines carry their 1-based line number in the new file
/// version; removed and context lines carry one in the old version.
///
/// # Examples
///
/// ```
/// use vigil_diff::parser::{LineChange, LineKind};
///
/// let line = LineChange {
///     kind: LineKind::Added,
///     content: "let x = 1;".into(),
///     old_line: None,
///     new_line: Some(12),
/// };
/// assert_eq!(line.marker(), '+');
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    /// How this line changed.
    pub kind: LineKind,
    /// Line content without the leading diff marker.
    pub content: String,
    /// 1-based line number in the old file version, if the line exists there.
    pub old_line: Option<u32>,
    /// 1-based line number in the new file version, if the line exists there.
    pub new_line: Option<u32>,
}

impl LineChange {
    /// The unified-diff marker character for this line.
    pub fn marker(&self) -> char {
        match self.kind {
            LineKind::Added => '+',
            LineKind::Removed => '-',
            LineKind::Context => ' ',
        }
    }
}

/// One contiguous change region within a file.
///
/// The line sequence matches the diff's physical order; the anchor logic and
/// line-number inference both depend on that order being preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Starting line in the old version.
    pub old_start: u32,
    /// Number of lines in the old version.
    pub old_lines: u32,
    /// Starting line in the new version.
    pub new_start: u32,
    /// Number of lines in the new version.
    pub new_lines: u32,
    /// Lines of the hunk in physical diff order.
    pub lines: Vec<LineChange>,
}

impl Hunk {
    /// The `@@`-style range header for this hunk.
    ///
    /// # Examples
    ///
    /// ```
    /// use vigil_diff::parser::Hunk;
    ///
    /// let hunk = Hunk {
    ///     old_start: 1,
    ///     old_lines: 3,
    ///     new_start: 1,
    ///     new_lines: 4,
    ///     lines: vec![],
    /// };
    /// assert_eq!(hunk.header(), "@@ -1,3 +1,4 @@");
    /// ```
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_lines, self.new_start, self.new_lines
        )
    }
}

impl fmt::Display for Hunk {
    /// Renders the hunk in unified notation: header, then marked lines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        for line in &self.lines {
            writeln!(f, "{}{}", line.marker(), line.content)?;
        }
        Ok(())
    }
}

/// A complete diff for a single file, containing one or more hunks.
///
/// `new_path` is `None` for deleted files; `old_path` is `None` for new
/// files. Zero-hunk records (renames without edits, binary files) are never
/// produced; [`parse_unified_diff`] drops them.
///
/// # Examples
///
/// ```
/// use vigil_diff::parser::parse_unified_diff;
///
/// let diff = "diff --git a/hello.rs b/hello.rs\n\
///             --- a/hello.rs\n\
///             +++ b/hello.rs\n\
///             @@ -1,3 +1,4 @@\n\
///              fn main() {\n\
///             +    println!(\"hello\");\n\
///              }\n";
/// let files = parse_unified_diff(diff);
/// assert_eq!(files.len(), 1);
/// assert_eq!(files[0].hunks.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Path in the old version, absent for newly created files.
    pub old_path: Option<PathBuf>,
    /// Path in the new version, absent for deleted files.
    pub new_path: Option<PathBuf>,
    /// Parsed hunks for this file, in appearance order.
    pub hunks: Vec<Hunk>,
}

impl FileDiff {
    fn empty() -> Self {
        Self {
            old_path: None,
            new_path: None,
            hunks: Vec::new(),
        }
    }
}

impl fmt::Display for FileDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self
            .new_path
            .as_ref()
            .or(self.old_path.as_ref())
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".into());
        write!(f, "{} ({} hunks)", path, self.hunks.len())
    }
}

/// Parse a unified diff string (as produced by `git diff`) into structured
/// [`FileDiff`] entries.
///
/// Handles standard unified diff format including new files, deleted files,
/// renamed files, and binary files. Parsing is total: a malformed hunk header
/// drops that hunk, unrecognized text is ignored, and files that end up with
/// zero hunks are dropped, so one broken section never discards the rest of
/// the diff. The same input always yields the same sequence, in file and
/// hunk appearance order.
///
/// Line numbers in the new file version are computed from a running counter
/// seeded by each hunk header's new-start value; added and context lines
/// consume it, removed lines do not.
///
/// # Examples
///
/// ```
/// use vigil_diff::parser::parse_unified_diff;
///
/// let files = parse_unified_diff("");
/// assert!(files.is_empty());
/// ```
pub fn parse_unified_diff(input: &str) -> Vec<FileDiff> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut current: Option<FileDiff> = None;
    let mut current_hunk: Option<Hunk> = None;
    // Running line counters for the hunk being filled.
    let mut old_no: u32 = 0;
    let mut new_no: u32 = 0;

    for line in input.lines() {
        if line.starts_with("diff --git ") {
            flush_hunk(&mut current, &mut current_hunk);
            flush_file(&mut files, &mut current);
            current = Some(FileDiff::empty());
            continue;
        }

        // Implicitly start a file if we see a header but have no current file
        // This handles standard patches that lack the "diff --git" command line
        if line.starts_with("--- ") && current.is_none() {
            current = Some(FileDiff::empty());
        }

        let Some(file) = current.as_mut() else {
            continue;
        };

        if line.starts_with("Binary files ") && line.ends_with(" differ") {
            // No textual hunks follow; the file flushes empty and is dropped.
            continue;
        }

        if line.starts_with("old mode")
            || line.starts_with("new mode")
            || line.starts_with("new file mode")
            || line.starts_with("deleted file mode")
            || line.starts_with("rename from ")
            || line.starts_with("rename to ")
            || line.starts_with("index ")
            || line.starts_with("similarity index")
        {
            continue;
        }

        if current_hunk.is_none() {
            if let Some(path) = line.strip_prefix("--- ") {
                file.old_path = parse_path(path);
                continue;
            }

            if let Some(path) = line.strip_prefix("+++ ") {
                file.new_path = parse_path(path);
                continue;
            }
        }

        if line.starts_with("@@ ") {
            flush_hunk(&mut current, &mut current_hunk);
            match parse_hunk_header(line) {
                Some((old_start, old_lines, new_start, new_lines)) => {
                    old_no = old_start;
                    new_no = new_start;
                    current_hunk = Some(Hunk {
                        old_start,
                        old_lines,
                        new_start,
                        new_lines,
                        lines: Vec::new(),
                    });
                }
                // Malformed header: skip this hunk's body entirely.
                None => current_hunk = None,
            }
            continue;
        }

        if line == "\\ No newline at end of file" {
            continue;
        }

        if let Some(hunk) = current_hunk.as_mut() {
            if let Some(content) = line.strip_prefix('+') {
                hunk.lines.push(LineChange {
                    kind: LineKind::Added,
                    content: content.to_string(),
                    old_line: None,
                    new_line: Some(new_no),
                });
                new_no += 1;
            } else if let Some(content) = line.strip_prefix('-') {
                hunk.lines.push(LineChange {
                    kind: LineKind::Removed,
                    content: content.to_string(),
                    old_line: Some(old_no),
                    new_line: None,
                });
                old_no += 1;
            } else if let Some(content) = line.strip_prefix(' ') {
                hunk.lines.push(LineChange {
                    kind: LineKind::Context,
                    content: content.to_string(),
                    old_line: Some(old_no),
                    new_line: Some(new_no),
                });
                old_no += 1;
                new_no += 1;
            } else if line.is_empty() && hunk_expects_more(hunk) {
                // Some producers emit blank context lines without the
                // leading space.
                hunk.lines.push(LineChange {
                    kind: LineKind::Context,
                    content: String::new(),
                    old_line: Some(old_no),
                    new_line: Some(new_no),
                });
                old_no += 1;
                new_no += 1;
            }
        }
    }

    flush_hunk(&mut current, &mut current_hunk);
    flush_file(&mut files, &mut current);

    files
}

fn hunk_expects_more(hunk: &Hunk) -> bool {
    let old_seen = hunk
        .lines
        .iter()
        .filter(|l| l.old_line.is_some())
        .count() as u32;
    let new_seen = hunk
        .lines
        .iter()
        .filter(|l| l.new_line.is_some())
        .count() as u32;
    old_seen < hunk.old_lines || new_seen < hunk.new_lines
}

fn flush_hunk(current: &mut Option<FileDiff>, hunk: &mut Option<Hunk>) {
    if let Some(h) = hunk.take() {
        if let Some(file) = current.as_mut() {
            file.hunks.push(h);
        }
    }
}

fn flush_file(files: &mut Vec<FileDiff>, current: &mut Option<FileDiff>) {
    if let Some(file) = current.take() {
        if !file.hunks.is_empty() {
            files.push(file);
        }
    }
}

fn parse_path(raw: &str) -> Option<PathBuf> {
    let normalized = raw.trim_matches('"');

    if normalized == "/dev/null" {
        return None;
    }

    let stripped = normalized
        .strip_prefix("a/")
        .or_else(|| normalized.strip_prefix("b/"))
        .unwrap_or(normalized);

    Some(PathBuf::from(stripped))
}

fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32)> {
    let inner = line.strip_prefix("@@ ").and_then(|s| {
        let end = s.find(" @@")?;
        Some(&s[..end])
    })?;

    let (old, new) = inner.split_once(' ')?;
    let old = old.strip_prefix('-')?;
    let new = new.strip_prefix('+')?;

    let (old_start, old_lines) = parse_range(old)?;
    let (new_start, new_lines) = parse_range(new)?;

    Some((old_start, old_lines, new_start, new_lines))
}

fn parse_range(range: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = range.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        Some((range.parse().ok()?, 1))
    }
}
