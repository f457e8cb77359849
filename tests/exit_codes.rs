use std::process::Command;

fn vigil_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_vigil"));
    cmd.current_dir(dir)
        .env_remove("OPENAI_API_KEY")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("VIGIL_PR_NUMBER")
        .env_remove("VIGIL_EXCLUDE");
    cmd
}

#[test]
fn help_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let output = vigil_cmd(dir.path()).arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--exclude"));
}

#[test]
fn missing_api_key_fails_with_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let output = vigil_cmd(dir.path()).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("API key"), "stderr was: {stderr}");
}

#[test]
fn missing_repository_fails_with_diagnostic() {
    let dir = tempfile::tempdir().unwrap();
    let output = vigil_cmd(dir.path())
        .env("OPENAI_API_KEY", "sk-test")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("repository"), "stderr was: {stderr}");
}

#[test]
fn malformed_pr_number_flag_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = vigil_cmd(dir.path())
        .args(["--repo", "octocat/hello-world", "--pr", "not-a-number"])
        .env("OPENAI_API_KEY", "sk-test")
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn invalid_exclusion_pattern_fails_before_any_review() {
    let dir = tempfile::tempdir().unwrap();
    let output = vigil_cmd(dir.path())
        .args(["--repo", "octocat/hello-world", "--pr", "1"])
        .args(["--exclude", "[unclosed"])
        .env("OPENAI_API_KEY", "sk-test")
        .env("GITHUB_TOKEN", "ghp_test")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[unclosed"), "stderr was: {stderr}");
}
