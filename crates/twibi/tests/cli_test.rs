//! Integration tests for the `twibi` CLI binary.
//!
//! Argument parsing, help output, shell completions and error handling run
//! without a router; the data commands run against a wiremock router.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `twibi` binary with env isolation.
///
/// Clears all `TWIBI_*` env vars and points home, config and data
/// directories into `home` so tests never touch the user's real setup.
fn twibi_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("twibi");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_DATA_HOME", home.join(".local/share"))
        .env("TWIBI_CONFIG", home.join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("TWIBI_PROFILE")
        .env_remove("TWIBI_HOST")
        .env_remove("TWIBI_OUTPUT")
        .env_remove("TWIBI_TIMEOUT")
        .env_remove("TWIBI_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn write_config(home: &Path, body: &str) {
    std::fs::write(home.join("config.toml"), body).unwrap();
}

fn router_body() -> Value {
    json!({
        "node_info": [
            { "sn": "SWSI100347178", "role": "1", "led": "1", "Uptime": "7200", "dut_name": "Living room" },
            { "sn": "SWSI29157827Q", "role": "0", "led": "0", "Uptime": "3600" }
        ],
        "online_list": [
            { "dev_mac": "AA-BB-CC-DD-EE-FF", "dev_name": "Phone", "wifi_mode": "AC", "sn": "SWSI100347178" },
            { "dev_mac": "11:22:33:44:55:66", "dev_name": "NAS", "wifi_mode": "--", "sn": "SWSI100347178" }
        ],
        "wan_statistic": [
            { "id": "1", "up_speed": "10", "down_speed": "20", "ttotal_up": "100", "ttotal_down": "200" }
        ]
    })
}

async fn fake_router() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/goform/set"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errcode": "0" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/goform/get"))
        .and(query_param("module_id", "node_info,online_list,wan_statistic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(router_body()))
        .mount(&server)
        .await;
    server
}

/// Run a prepared command off the async runtime that serves the mock.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = twibi_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    twibi_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("Twibi")
            .and(predicate::str::contains("nodes"))
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    twibi_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("twibi"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    twibi_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    twibi_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    let output = twibi_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_invalid_toggle_value() {
    let home = TempDir::new().unwrap();
    let output = twibi_cmd(home.path()).args(["upnp", "maybe"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_nodes_without_config() {
    let home = TempDir::new().unwrap();
    let output = twibi_cmd(home.path()).args(["nodes", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("No router configured"), "got:\n{text}");
}

#[test]
fn test_unknown_profile() {
    let home = TempDir::new().unwrap();
    write_config(
        home.path(),
        "[profiles.home]\nhost = \"192.168.5.1\"\npassword = \"x\"\n",
    );
    let output = twibi_cmd(home.path())
        .args(["--profile", "office", "nodes", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    let text = combined_output(&output);
    assert!(text.contains("office") && text.contains("home"), "got:\n{text}");
}

#[test]
fn test_host_without_password() {
    let home = TempDir::new().unwrap();
    let output = twibi_cmd(home.path())
        .args(["--host", "192.0.2.1", "--profile", "ci-no-password", "nodes", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("No password configured"));
}

#[test]
fn test_restart_requires_confirmation_when_not_interactive() {
    let home = TempDir::new().unwrap();
    let output = twibi_cmd(home.path())
        .args(["--host", "192.0.2.1", "restart"])
        .env("TWIBI_PASSWORD", "secret")
        .write_stdin("")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

// ── Config commands ─────────────────────────────────────────────────

#[test]
fn test_config_show_masks_passwords() {
    let home = TempDir::new().unwrap();
    write_config(
        home.path(),
        "default_profile = \"home\"\n\n[profiles.home]\nhost = \"192.168.5.1\"\npassword = \"hunter2\"\n",
    );
    twibi_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.home]")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("hunter2").not()),
        );

    twibi_cmd(home.path())
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_config_profiles_and_use() {
    let home = TempDir::new().unwrap();
    write_config(
        home.path(),
        "default_profile = \"home\"\n\n[profiles.home]\nhost = \"192.168.5.1\"\n\n[profiles.beach]\nhost = \"10.0.0.1\"\n",
    );
    twibi_cmd(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* home").and(predicate::str::contains("  beach")));

    twibi_cmd(home.path())
        .args(["config", "use", "beach"])
        .assert()
        .success();
    twibi_cmd(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* beach"));

    let output = twibi_cmd(home.path())
        .args(["config", "use", "office"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

// ── Against a fake router ───────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_nodes_list_json() {
    let server = fake_router().await;
    let home = TempDir::new().unwrap();
    let mut cmd = twibi_cmd(home.path());
    cmd.args(["--host", &server.uri(), "-o", "json", "nodes", "list"])
        .env("TWIBI_PASSWORD", "secret");

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let nodes: Value = serde_json::from_slice(&output.stdout).unwrap();
    let nodes = nodes.as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["serial"], "SWSI100347178");
    assert_eq!(nodes[0]["role"], "primary");
    assert_eq!(nodes[0]["uptime_secs"], 7200);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_list_excludes_wired_by_default() {
    let server = fake_router().await;
    let home = TempDir::new().unwrap();

    let mut cmd = twibi_cmd(home.path());
    cmd.args(["--host", &server.uri(), "-o", "plain", "devices", "list"])
        .env("TWIBI_PASSWORD", "secret");
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "aa:bb:cc:dd:ee:ff");

    let mut cmd = twibi_cmd(home.path());
    cmd.args(["--host", &server.uri(), "-o", "plain", "devices", "list", "--include-wired"])
        .env("TWIBI_PASSWORD", "secret");
    let output = run(cmd).await;
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    assert!(stdout.contains("aa:bb:cc:dd:ee:ff") && stdout.contains("11:22:33:44:55:66"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_known_devices_persist_between_runs() {
    let server = fake_router().await;
    let home = TempDir::new().unwrap();

    for _ in 0..2 {
        let mut cmd = twibi_cmd(home.path());
        cmd.args(["--host", &server.uri(), "-o", "plain", "devices", "known"])
            .env("TWIBI_PASSWORD", "secret");
        let output = run(cmd).await;
        assert!(output.status.success(), "{}", combined_output(&output));
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "aa:bb:cc:dd:ee:ff");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_node_is_not_found() {
    let server = fake_router().await;
    let home = TempDir::new().unwrap();
    let mut cmd = twibi_cmd(home.path());
    cmd.args(["--host", &server.uri(), "nodes", "get", "NOPE"])
        .env("TWIBI_PASSWORD", "secret");
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("twibi nodes list"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upnp_command() {
    let server = fake_router().await;
    let home = TempDir::new().unwrap();
    let mut cmd = twibi_cmd(home.path());
    cmd.args(["--host", &server.uri(), "upnp", "on"])
        .env("TWIBI_PASSWORD", "secret");
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("UPnP enabled"));

    let requests = server.received_requests().await.unwrap();
    let upnp = requests
        .iter()
        .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
        .find(|body| body.get("upnp_info").is_some())
        .unwrap();
    assert_eq!(upnp["upnp_info"]["upnp_en"], "1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_guest_toggle_keeps_current_settings() {
    let server = fake_router().await;
    Mock::given(method("GET"))
        .and(path("/goform/get"))
        .and(query_param("module_id", "guest_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "guest_info": {
                "guest_en": "0",
                "guest_ssid": "Visitante",
                "guest_pass": "hunter22",
                "guest_time": "2h",
                "limit": "5"
            }
        })))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let mut cmd = twibi_cmd(home.path());
    cmd.args(["--host", &server.uri(), "guest", "on"])
        .env("TWIBI_PASSWORD", "secret");
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let requests = server.received_requests().await.unwrap();
    let guest = requests
        .iter()
        .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
        .find(|body| body.get("guest_info").is_some())
        .unwrap();
    assert_eq!(guest["guest_info"]["guest_en"], "1");
    assert_eq!(guest["guest_info"]["guest_ssid"], "Visitante");
    assert_eq!(guest["guest_info"]["guest_pass"], "hunter22");
    assert_eq!(guest["guest_info"]["guest_time"], "2h");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_guest_toggle_refuses_without_current_settings() {
    let server = fake_router().await;
    let home = TempDir::new().unwrap();
    let mut cmd = twibi_cmd(home.path());
    cmd.args(["--host", &server.uri(), "guest", "on"])
        .env("TWIBI_PASSWORD", "secret");
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(1), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("--set-password"));

    let requests = server.received_requests().await.unwrap();
    assert!(
        !requests
            .iter()
            .filter_map(|r| serde_json::from_slice::<Value>(&r.body).ok())
            .any(|body| body.get("guest_info").is_some())
    );
}
