use assert_cmd::cargo::{self};
use predicates::str::contains;

#[test]
fn prints_help() {
    let mut cmd = cargo::cargo_bin_cmd!("rpcform");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("rpcform"))
        .stdout(contains("--catalog"));
}

#[test]
fn missing_catalog_file_fails_before_the_ui_starts() {
    let mut cmd = cargo::cargo_bin_cmd!("rpcform");
    cmd.args(["--catalog", "does/not/exist.json"])
        .assert()
        .failure()
        .stderr(contains("failed to read does/not/exist.json"));
}

#[test]
fn unknown_method_is_reported() {
    let mut cmd = cargo::cargo_bin_cmd!("rpcform");
    cmd.args(["--catalog", "-", "--method", "demo.Echo.Missing"])
        .write_stdin(r#"{"services": [{"name": "demo.Echo", "methods": []}]}"#)
        .assert()
        .failure()
        .stderr(contains("cannot open procedure 'demo.Echo.Missing'"));
}
