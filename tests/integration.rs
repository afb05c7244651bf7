use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const IOS_CONFIG: &str = "!
! Cisco IOS Software, C2960 Software
!
version 15.2
hostname core-1
!
enable secret 5 $1$mERr$hx5rVt7rPNoS4wqbXKX7m0
username admin password 7 08314E1B
!
interface GigabitEthernet0/1
 description uplink
 ip address 10.0.0.1 255.255.255.0
!
router ospf 1
 network 10.0.0.0 0.0.0.255 area 0
!
snmp-server community s3cr3t RO
";

const JUNOS_CONFIG: &str = "## Last commit: 2024-03-01 10:00:00 UTC by admin
## JUNOS 21.4R3
set system host-name mx1
set system root-authentication encrypted-password \"$6$salt$deadbeef\"
set interfaces ge-0/0/0 unit 0 family inet address 10.0.0.1/24
set protocols bgp group EBGP neighbor 10.0.0.2
set interfaces ge-0/0/0 description uplink
";

fn ncx_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("ncx");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::create_dir_all(root.join("data")).unwrap();

    let configs_dir = root.join("configs");
    fs::create_dir_all(&configs_dir).unwrap();
    fs::write(configs_dir.join("core-1.conf"), IOS_CONFIG).unwrap();
    fs::write(configs_dir.join("mx1.conf"), JUNOS_CONFIG).unwrap();
    fs::write(
        configs_dir.join("mystery.conf"),
        "some appliance\nwith its own syntax\n",
    )
    .unwrap();
    fs::write(configs_dir.join("blank.conf"), "\n   \n").unwrap();
    fs::write(configs_dir.join("README.md"), "not a config").unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/ncx.sqlite"

[connectors.filesystem]
root = "{}/configs"
include_globs = ["**/*.conf"]
exclude_globs = []
follow_symlinks = false

[logging]
level = "warn"
"#,
        root.display(),
        root.display()
    );

    let config_path = config_dir.join("ncx.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_ncx(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = ncx_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run ncx binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_ncx(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/ncx.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_ncx(&config_path, &["init"]);
    assert!(success1, "First init failed");
    let (_, _, success2) = run_ncx(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_ingest_filesystem() {
    let (_tmp, config_path) = setup_test_env();

    run_ncx(&config_path, &["init"]);
    let (stdout, stderr, success) = run_ncx(&config_path, &["ingest"]);
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("files: 4"), "stdout={}", stdout);
    assert!(stdout.contains("devices stored: 3"), "stdout={}", stdout);
    assert!(stdout.contains("empty: 1"), "stdout={}", stdout);
    assert!(stdout.contains("failed: 0"), "stdout={}", stdout);
}

#[test]
fn test_ingest_without_init_creates_schema() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_ncx(&config_path, &["ingest"]);
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("devices stored: 3"));
}

#[test]
fn test_ingest_twice_replaces_sections() {
    let (_tmp, config_path) = setup_test_env();

    run_ncx(&config_path, &["ingest"]);
    let (stdout1, _, _) = run_ncx(&config_path, &["ingest"]);
    assert!(stdout1.contains("sections written: "));

    let (stdout, stderr, success) =
        run_ncx(&config_path, &["get", "core-1:interfaces:GigabitEthernet0/1:1"]);
    assert!(success, "get failed after re-ingest: {}", stderr);
    assert!(stdout.contains("description uplink"));
}

#[test]
fn test_ingest_dry_run() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_ncx(&config_path, &["ingest", "--dry-run"]);
    assert!(success, "dry run failed: {}", stderr);
    assert!(stdout.contains("ingest (dry-run)"));
    assert!(stdout.contains("files found: 4"));
    assert!(!tmp.path().join("data/ncx.sqlite").exists());
}

#[test]
fn test_ingest_with_limit() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_ncx(&config_path, &["ingest", "--limit", "1"]);
    assert!(success);
    assert!(stdout.contains("files: 1"), "stdout={}", stdout);
}

#[test]
fn test_get_section_is_masked() {
    let (_tmp, config_path) = setup_test_env();
    run_ncx(&config_path, &["ingest"]);

    let (stdout, stderr, success) = run_ncx(&config_path, &["get", "core-1:global:version:0"]);
    assert!(success, "get failed: {}", stderr);
    assert!(stdout.contains("vendor:       cisco_ios"));
    assert!(stdout.contains("username admin password 7 ***MASKED***"));
    assert!(!stdout.contains("08314E1B"));
    assert!(!stdout.contains("hx5rVt7rPNoS4wqbXKX7m0"));
}

#[test]
fn test_get_junos_section() {
    let (_tmp, config_path) = setup_test_env();
    run_ncx(&config_path, &["ingest"]);

    let (stdout, stderr, success) = run_ncx(&config_path, &["get", "mx1:interfaces:ge-0/0/0:0"]);
    assert!(success, "get failed: {}", stderr);
    assert!(stdout.contains("family inet address 10.0.0.1/24"));
    assert!(stdout.contains("description uplink"));
}

#[test]
fn test_get_missing_section() {
    let (_tmp, config_path) = setup_test_env();
    run_ncx(&config_path, &["init"]);

    let (_, stderr, success) = run_ncx(&config_path, &["get", "nope:global:x:0"]);
    assert!(!success);
    assert!(stderr.contains("section not found"));
}

#[test]
fn test_mask_needs_no_config() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("r1.conf");
    fs::write(&file, IOS_CONFIG).unwrap();

    let (stdout, stderr, success) = run_ncx(
        &tmp.path().join("missing.toml"),
        &["mask", file.to_str().unwrap()],
    );
    assert!(success, "mask failed: {}", stderr);
    assert!(stdout.contains("enable secret 5 ***MASKED***"));
    assert!(!stdout.contains("08314E1B"));
    assert!(!stdout.contains("\n\n"));
}

#[test]
fn test_inspect_json() {
    let (tmp, config_path) = setup_test_env();
    let file = tmp.path().join("configs/core-1.conf");

    let (stdout, stderr, success) =
        run_ncx(&config_path, &["inspect", file.to_str().unwrap(), "--json"]);
    assert!(success, "inspect failed: {}", stderr);

    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["device_name"], "core-1");
    assert_eq!(report["vendor"], "cisco_ios");
    assert_eq!(report["dialect"], "cli_block");
    let sections = report["sections"].as_array().unwrap();
    let ids: Vec<_> = sections
        .iter()
        .map(|s| s["section_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["version", "GigabitEthernet0/1", "ospf 1"]);
}

#[test]
fn test_inspect_rejects_unknown_vendor_name() {
    let (tmp, config_path) = setup_test_env();
    let file = tmp.path().join("configs/core-1.conf");

    let (_, stderr, success) = run_ncx(
        &config_path,
        &["inspect", file.to_str().unwrap(), "--vendor", "mikrotik"],
    );
    assert!(!success);
    assert!(stderr.contains("unknown vendor"));
}

#[test]
fn test_search_errors_when_embeddings_disabled() {
    let (_tmp, config_path) = setup_test_env();
    run_ncx(&config_path, &["ingest"]);

    let (_, stderr, success) = run_ncx(&config_path, &["search", "bgp neighbors"]);
    assert!(!success);
    assert!(stderr.contains("embedding provider"));
}

#[test]
fn test_embed_pending_errors_when_disabled() {
    let (_tmp, config_path) = setup_test_env();
    run_ncx(&config_path, &["init"]);

    let (_, stderr, success) = run_ncx(&config_path, &["embed", "pending"]);
    assert!(!success);
    assert!(stderr.contains("disabled"));
}

#[test]
fn test_missing_config_file() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_ncx(&tmp.path().join("nope.toml"), &["init"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
