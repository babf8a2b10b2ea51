use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from any user or working-directory configuration
fn ytscribe(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ytscribe").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env_remove("YTSCRIBE_BACKEND")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    ytscribe(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download YouTube video transcripts in Markdown format."))
        .stdout(predicate::str::contains("--list-languages"));
}

#[test]
fn test_invalid_url_is_a_handled_error() {
    let dir = TempDir::new().unwrap();
    ytscribe(&dir)
        .args(["https://example.com/watch", "-q"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "Error: Could not extract video ID from the provided URL.",
        ));

    assert!(!dir.path().join("transcript.md").exists());
}

#[test]
fn test_list_languages_with_invalid_url() {
    let dir = TempDir::new().unwrap();
    ytscribe(&dir)
        .args(["--list-languages", "-q", "nope"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Error: Could not extract video ID"));
}

#[test]
fn test_prompts_for_missing_url() {
    let dir = TempDir::new().unwrap();
    ytscribe(&dir)
        .arg("-q")
        .write_stdin("definitely not a url\n")
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("Please enter the YouTube video URL: "))
        .stdout(predicate::str::contains("Error: Could not extract video ID"));
}

#[test]
fn test_show_config_reflects_overrides() {
    let dir = TempDir::new().unwrap();
    ytscribe(&dir)
        .args(["--show-config", "--backend", "yt-dlp", "--mode", "condensed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current Configuration:"))
        .stdout(predicate::str::contains("Backend: yt-dlp"))
        .stdout(predicate::str::contains("Render Mode: condensed"))
        .stdout(predicate::str::contains("Default Output: transcript.md"));
}

#[test]
fn test_local_config_file_is_used() {
    let dir = TempDir::new().unwrap();
    fs_err::write(
        dir.path().join("config.yaml"),
        "output:\n  default_file: notes.md\n  mode: condensed\n",
    )
    .unwrap();

    ytscribe(&dir)
        .arg("--show-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Default Output: notes.md"))
        .stdout(predicate::str::contains("Render Mode: condensed"));
}

#[test]
fn test_broken_config_is_unexpected() {
    let dir = TempDir::new().unwrap();
    fs_err::write(dir.path().join("config.yaml"), "http:\n  timeout_secs: 0\n").unwrap();

    ytscribe(&dir)
        .args(["https://youtu.be/dQw4w9WgXcQ", "-q"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "An unexpected error occurred: http.timeout_secs must be greater than zero",
        ));
}

#[test]
fn test_unknown_mode_is_rejected() {
    let dir = TempDir::new().unwrap();
    ytscribe(&dir)
        .args(["https://youtu.be/dQw4w9WgXcQ", "--mode", "fancy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'fancy'"));
}
