//! End-to-end CLI tests driving the built binary against a throwaway
//! policy include tree.

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

fn policy_tree() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("kernel")).unwrap();
    fs::create_dir_all(dir.path().join("support")).unwrap();
    fs::write(
        dir.path().join("kernel/corenetwork.if"),
        "interface(`grant_read',`\n  allow $1 $2:file { read open getattr }; \n')\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("support/obj_perm_sets.spt"),
        "define(`read_file_perms',`{ getattr open read }')\n",
    )
    .unwrap();
    dir
}

#[test]
fn show_prints_the_definition() {
    let dir = policy_tree();
    Command::cargo_bin("semacro")
        .unwrap()
        .arg("--include-path")
        .arg(dir.path())
        .arg("--no-color")
        .arg("show")
        .arg("grant_read")
        .assert()
        .success()
        .stdout(contains("grant_read"))
        .stdout(contains("allow $1 $2:file"));
}

#[test]
fn expand_prints_the_canonical_rule() {
    let dir = policy_tree();
    Command::cargo_bin("semacro")
        .unwrap()
        .arg("--include-path")
        .arg(dir.path())
        .arg("--no-color")
        .arg("expand")
        .arg("grant_read")
        .arg("A")
        .arg("B")
        .assert()
        .success()
        .stdout(contains("allow A B:file { read open getattr };"));
}

#[test]
fn expand_tree_renders_box_drawing() {
    let dir = policy_tree();
    Command::cargo_bin("semacro")
        .unwrap()
        .arg("--include-path")
        .arg(dir.path())
        .arg("--no-color")
        .arg("expand")
        .arg("grant_read")
        .arg("A")
        .arg("B")
        .arg("--tree")
        .assert()
        .success()
        .stdout(contains("grant_read(A, B)"))
        .stdout(contains("└── "));
}

#[test]
fn unknown_macro_fails_with_exit_code_one() {
    let dir = policy_tree();
    Command::cargo_bin("semacro")
        .unwrap()
        .arg("--include-path")
        .arg(dir.path())
        .arg("show")
        .arg("does_not_exist")
        .assert()
        .failure()
        .code(1)
        .stderr(contains("not found"));
}

#[test]
fn which_finds_a_matching_macro() {
    let dir = policy_tree();
    Command::cargo_bin("semacro")
        .unwrap()
        .arg("--include-path")
        .arg(dir.path())
        .arg("--no-color")
        .arg("which")
        .arg("--source")
        .arg("A")
        .arg("--target")
        .arg("B")
        .arg("--perms")
        .arg("read")
        .assert()
        .success()
        .stdout(contains("grant_read(A, B)"));
}

#[test]
fn which_with_no_match_fails() {
    let dir = policy_tree();
    Command::cargo_bin("semacro")
        .unwrap()
        .arg("--include-path")
        .arg(dir.path())
        .arg("which")
        .arg("--source")
        .arg("A")
        .arg("--target")
        .arg("B")
        .arg("--perms")
        .arg("write")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn missing_include_path_fails_with_a_helpful_message() {
    Command::cargo_bin("semacro")
        .unwrap()
        .env_remove("SEMACRO_INCLUDE_PATH")
        .arg("--include-path")
        .arg("/does/not/exist")
        .arg("show")
        .arg("x")
        .assert()
        .failure()
        .stderr(contains("does not exist"));
}

#[test]
fn find_matches_names_case_insensitively() {
    let dir = policy_tree();
    Command::cargo_bin("semacro")
        .unwrap()
        .arg("--include-path")
        .arg(dir.path())
        .arg("--no-color")
        .arg("find")
        .arg("GRANT")
        .assert()
        .success()
        .stdout(contains("grant_read"));
}

#[test]
fn list_filters_by_category() {
    let dir = policy_tree();
    Command::cargo_bin("semacro")
        .unwrap()
        .arg("--include-path")
        .arg(dir.path())
        .arg("--no-color")
        .arg("list")
        .arg("--category")
        .arg("kernel")
        .assert()
        .success()
        .stdout(contains("grant_read"));
}
