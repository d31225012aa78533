// Runs the compiled `adt` binary against temporary profiles and projects.
//
// These cover behavior that only shows up at the process boundary: the
// real environment, exit status and panics.
#![cfg(unix)]

mod common;

use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::process::{Command, Output};

use common::ProfileRepoBuilder;

/// `adt` with its home and config directories pointed at `home`.
fn adt(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_adt"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG");
    cmd
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn non_utf8_environment_variable_is_ignored() {
    let repo = ProfileRepoBuilder::new()
        .profile("custom", "[variables]\nname = \"demo\"\n")
        .template("custom", "README.md.j2", "# {{ name }}\n")
        .build();
    let home = tempfile::tempdir().expect("create home dir");

    let output = adt(home.path())
        .arg("seed")
        .arg("--dry-run")
        .arg("--source")
        .arg(repo.profiles_dir().join("custom"))
        .arg("--project-dir")
        .arg(repo.project_dir())
        .env("ADT_TEST_BAD", OsStr::from_bytes(b"\xff\xfe"))
        .env(OsStr::from_bytes(b"ADT_\xffKEY"), "value")
        .output()
        .expect("run adt");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(!stderr(&output).contains("panicked"));
    assert!(repo.snapshot().is_empty());
}

#[test]
fn seeding_without_any_profile_uses_builtin_templates() {
    let repo = ProfileRepoBuilder::new().build();
    let home = tempfile::tempdir().expect("create home dir");

    let output = adt(home.path())
        .arg("seed")
        .arg("--project-dir")
        .arg(repo.project_dir())
        .output()
        .expect("run adt");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(repo.read(".editorconfig").contains("root = true"));
    assert!(repo.project_file(".gitignore").is_file());
}

#[test]
fn missing_source_directory_exits_non_zero() {
    let repo = ProfileRepoBuilder::new().build();
    let home = tempfile::tempdir().expect("create home dir");

    let output = adt(home.path())
        .arg("seed")
        .arg("--source")
        .arg(repo.profiles_dir().join("nope"))
        .arg("--project-dir")
        .arg(repo.project_dir())
        .output()
        .expect("run adt");

    assert!(!output.status.success());
    assert!(!stderr(&output).contains("panicked"));
    assert!(repo.snapshot().is_empty());
}
