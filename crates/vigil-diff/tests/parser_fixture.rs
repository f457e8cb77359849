use std::path::PathBuf;

use vigil_diff::parser::{parse_unified_diff, LineKind};

#[test]
fn parse_patch_without_git_header() {
    let diff = "\
--- /dev/null
+++ b/src/bad_code.rs
@@ -0,0 +1,3 @@
+fn main() {
+    println!(\"hello\");
+}
";
    let files = parse_unified_diff(diff);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].new_path, Some(PathBuf::from("src/bad_code.rs")));
    assert!(files[0]
        .hunks[0]
        .lines
        .iter()
        .all(|l| l.kind == LineKind::Added));
}

#[test]
fn realistic_multi_file_diff() {
    let diff = include_str!("fixtures/simple.diff");
    let files = parse_unified_diff(diff);

    // Binary file dropped; source, readme, and deletion survive.
    assert_eq!(files.len(), 3);

    let server = &files[0];
    assert_eq!(server.new_path, Some(PathBuf::from("src/server.rs")));
    assert_eq!(server.hunks.len(), 2);
    let last_added = server.hunks[1]
        .lines
        .iter()
        .rev()
        .find(|l| l.kind == LineKind::Added)
        .unwrap();
    assert_eq!(last_added.new_line, Some(45));

    let readme = &files[1];
    assert_eq!(readme.new_path, Some(PathBuf::from("README.md")));
    assert_eq!(readme.hunks[0].lines.len(), 4);

    let deleted = &files[2];
    assert_eq!(deleted.new_path, None);
    assert_eq!(deleted.old_path, Some(PathBuf::from("src/old_api.rs")));
}

#[test]
fn fixture_line_numbers_increase_within_every_hunk() {
    let diff = include_str!("fixtures/simple.diff");
    for file in parse_unified_diff(diff) {
        for hunk in &file.hunks {
            let numbers: Vec<u32> = hunk.lines.iter().filter_map(|l| l.new_line).collect();
            for pair in numbers.windows(2) {
                assert!(pair[0] < pair[1]);
            }
        }
    }
}
