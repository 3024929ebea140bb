//! Binary smoke tests
//!
//! Every run gets its own data, config and working directory so nothing
//! touches the real user profile.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ww(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ww").expect("binary");
    cmd.current_dir(home)
        .env("HOME", home)
        .env("XDG_DATA_HOME", home.join("data"))
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env_remove("GEMINI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn store_dir(home: &Path) -> PathBuf {
    home.join("data").join("whisperwall")
}

fn seed_wall(home: &Path) {
    let dir = store_dir(home);
    fs::create_dir_all(&dir).expect("store dir");
    let posts = r#"[
        {"id":"p2","content":"This class is too much.","intent":"VENT","timestamp":1700000100000,"originalContent":"I hate this class"},
        {"id":"p1","content":"Thank you for the notes!","intent":"APPRECIATION","timestamp":1700000000000}
    ]"#;
    fs::write(dir.join("whisperwall_posts.json"), posts).expect("posts");
    fs::write(dir.join("whisperwall_my_ids.json"), r#"["p2"]"#).expect("ids");
}

#[test]
fn test_help_lists_subcommands() {
    let home = TempDir::new().expect("Failed to create temp dir");
    ww(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("wall"))
        .stdout(predicate::str::contains("intents"))
        .stdout(predicate::str::contains("Logs are written to"));
}

#[test]
fn test_intents_lists_catalogue() {
    let home = TempDir::new().expect("Failed to create temp dir");
    ww(home.path())
        .arg("intents")
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFESS"))
        .stdout(predicate::str::contains("VENT"))
        .stdout(predicate::str::contains("OTHERS"));
}

#[test]
fn test_empty_wall() {
    let home = TempDir::new().expect("Failed to create temp dir");
    ww(home.path())
        .args(["wall", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No whispers yet."));

    ww(home.path())
        .args(["wall", "list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_wall_list_filters_and_hides_originals() {
    let home = TempDir::new().expect("Failed to create temp dir");
    seed_wall(home.path());

    ww(home.path())
        .args(["wall", "list", "--vent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("This class is too much."))
        .stdout(predicate::str::contains("Thank you").not())
        .stdout(predicate::str::contains("I hate this class").not());

    ww(home.path())
        .args(["wall", "list", "--vent", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("I hate this class"));

    ww(home.path())
        .args(["wall", "list", "--mine", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"p2\""))
        .stdout(predicate::str::contains("\"p1\"").not());
}

#[test]
fn test_wall_delete_is_owner_only() {
    let home = TempDir::new().expect("Failed to create temp dir");
    seed_wall(home.path());

    ww(home.path())
        .args(["wall", "delete", "p1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not written on this device"));

    ww(home.path())
        .args(["wall", "delete", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No post with id missing"));

    ww(home.path()).args(["wall", "delete", "p2"]).assert().success();

    ww(home.path())
        .args(["wall", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("This class is too much.").not())
        .stdout(predicate::str::contains("Thank you for the notes!"));
}

#[test]
fn test_draft_show_and_clear() {
    let home = TempDir::new().expect("Failed to create temp dir");
    ww(home.path())
        .args(["draft", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved draft."));

    let dir = store_dir(home.path());
    fs::create_dir_all(&dir).expect("store dir");
    fs::write(
        dir.join("whisperwall_draft.json"),
        r#"{"version":1,"savedAt":0,"data":{"intent":"REPAIR","recipient":"Sam","context":"the mug"}}"#,
    )
    .expect("draft");

    ww(home.path())
        .args(["draft", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sam"))
        .stdout(predicate::str::contains("the mug"));

    ww(home.path()).args(["draft", "clear"]).assert().success();
    ww(home.path())
        .args(["draft", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved draft."));
}

#[test]
fn test_format_without_api_key_fails_fast() {
    let home = TempDir::new().expect("Failed to create temp dir");
    ww(home.path())
        .args(["format", "sms", "see you soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not configured"));
}
