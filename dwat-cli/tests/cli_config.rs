//! Binary-level tests: argument parsing, `.env` loading and exit status.
//!
//! Every command runs with a cleared environment in a scratch directory so a
//! developer's own `.env` or tokens never leak in.

use std::fs;
use std::net::TcpListener;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn dwat_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("dwat").expect("dwat binary");
    cmd.env_clear().current_dir(dir).env("RUST_LOG", "off");
    cmd
}

/// An address nothing listens on, so every request fails fast.
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

#[test]
fn help_lists_subcommands() {
    let dir = TempDir::new().expect("tempdir");
    dwat_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("sync"))
        .stdout(contains("diff"));
}

#[test]
fn sync_without_configuration_names_missing_settings() {
    let dir = TempDir::new().expect("tempdir");
    dwat_cmd(dir.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("--grafana-url"));
}

#[test]
fn tokens_are_not_echoed_in_help() {
    let dir = TempDir::new().expect("tempdir");
    dwat_cmd(dir.path())
        .env("GRAFANA_API_TOKEN", "very-secret-token")
        .args(["sync", "--help"])
        .assert()
        .success()
        .stdout(contains("GRAFANA_API_TOKEN"))
        .stdout(contains("very-secret-token").not());
}

#[test]
fn unreadable_repository_aborts_with_error() {
    let dir = TempDir::new().expect("tempdir");
    let url = closed_port_url();
    dwat_cmd(dir.path())
        .env("GRAFANA_API_URL", &url)
        .env("GRAFANA_API_TOKEN", "g")
        .env("GITHUB_TOKEN", "gh")
        .env("GITHUB_REPO_NAME", "acme/charts")
        .env("GITHUB_API_URL", &url)
        .env("TIMEOUT", "2")
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("acme/charts"))
        .stderr(contains("dashboards"));
}

#[test]
fn dotenv_file_supplies_configuration() {
    let dir = TempDir::new().expect("tempdir");
    let url = closed_port_url();
    fs::write(
        dir.path().join(".env"),
        format!(
            "GRAFANA_API_URL={url}\nGRAFANA_API_TOKEN=g\nGITHUB_TOKEN=gh\nGITHUB_REPO_NAME=acme/from-dotenv\nGITHUB_API_URL={url}\nTIMEOUT=2\n"
        ),
    )
    .expect("write .env");

    dwat_cmd(dir.path())
        .args(["diff", "--json"])
        .assert()
        .failure()
        .stderr(contains("acme/from-dotenv"));
}

#[test]
fn malformed_dotenv_file_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join(".env"), "GRAFANA_API_URL=\"unterminated\n").expect("write .env");

    dwat_cmd(dir.path())
        .args(["diff", "--json"])
        .assert()
        .failure()
        .stderr(contains("failed to load .env"));
}
