//! CLI-level tests for the krug binary.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn list_names_every_scenario() {
    Command::cargo_bin("krug")
        .unwrap()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("create-lifecycle"))
        .stdout(predicate::str::contains("rootfs-readonly"))
        .stdout(predicate::str::contains("sysctls"));
}

#[test]
fn help_documents_the_runtime_override() {
    Command::cargo_bin("krug")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--runtime"));
}

#[test]
fn unmatched_filter_is_an_error() {
    Command::cargo_bin("krug")
        .unwrap()
        .args(["validate", "no-such-scenario"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no scenario matches"));
}

#[test]
fn create_lifecycle_scenario_passes_against_the_stub_runtime() {
    let stub = common::StubRuntime::install();

    let scratch = tempfile::tempdir().unwrap();
    let archive = scratch.path().join("rootfs.tar.gz");
    common::write_rootfs_archive(&archive);

    Command::cargo_bin("krug")
        .unwrap()
        .env("KRUG_ROOTFS", &archive)
        .args(["--runtime"])
        .arg(&stub.bin)
        .args(["validate", "create-lifecycle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/1 scenarios passed"));
}

#[test]
fn validate_fails_when_the_runtime_is_missing() {
    let scratch = tempfile::tempdir().unwrap();
    let archive = scratch.path().join("rootfs.tar.gz");
    common::write_rootfs_archive(&archive);

    Command::cargo_bin("krug")
        .unwrap()
        .env("KRUG_ROOTFS", &archive)
        .args([
            "--runtime",
            "no-such-runtime-binary",
            "validate",
            "create-lifecycle",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("0/1 scenarios passed"));
}
