//! End-to-end runs of the `keycred` binary that need no network.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const PASSPHRASE: &str = "cli-test-passphrase";

fn keycred(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("keycred").unwrap();
    cmd.env("KEYCRED_CONFIG", dir.path().join("config.toml"))
        .env("KEYCRED_PFX_PASSWORD", PASSPHRASE)
        .env_remove("KEYCRED_GRAPH_TOKEN")
        .env_remove("RUST_LOG")
        .arg("--no-color");
    cmd
}

fn generate(dir: &TempDir, extra: &[&str]) -> (String, String) {
    let pfx = dir.path().join("signing.pfx").display().to_string();
    let cer = dir.path().join("signing.cer").display().to_string();
    keycred(dir)
        .args(["generate", "--subject", "CN=cli-test", "--algorithm", "ecdsa-p256"])
        .args(["--pfx", &pfx, "--cer", &cer])
        .args(extra)
        .assert()
        .success();
    (pfx, cer)
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    keycred(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("discovery"));
}

#[test]
fn generate_then_build_redacts_secret() {
    let dir = TempDir::new().unwrap();
    let (pfx, cer) = generate(&dir, &[]);
    assert!(Path::new(&pfx).exists());
    assert!(Path::new(&cer).exists());

    let output = keycred(&dir)
        .args(["-o", "json", "build", "--pfx", &pfx, "--cer", &cer])
        .args(["--display-name", "cli rotation"])
        .assert()
        .success()
        .stdout(predicate::str::contains(PASSPHRASE).not())
        .get_output()
        .stdout
        .clone();

    let payload: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let keys = payload["keyCredentials"].as_array().unwrap();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0]["usage"], "Sign");
    assert_eq!(keys[1]["usage"], "Verify");
    assert_eq!(keys[0]["displayName"], "cli rotation");
    assert_eq!(payload["passwordCredentials"][0]["secretText"], "<redacted>");
}

#[test]
fn build_out_file_carries_secret() {
    let dir = TempDir::new().unwrap();
    let (pfx, cer) = generate(&dir, &[]);
    let out = dir.path().join("payload.json");

    keycred(&dir)
        .args(["-o", "json", "build", "--pfx", &pfx, "--cer", &cer, "--out"])
        .arg(&out)
        .assert()
        .success();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["passwordCredentials"][0]["secretText"], PASSPHRASE);
    assert_eq!(
        written["passwordCredentials"][0]["keyId"],
        written["keyCredentials"][0]["keyId"]
    );
}

#[test]
fn generate_refuses_overwrite_without_force() {
    let dir = TempDir::new().unwrap();
    let (pfx, cer) = generate(&dir, &[]);

    keycred(&dir)
        .args(["generate", "--subject", "CN=again", "--algorithm", "ecdsa-p256"])
        .args(["--pfx", &pfx, "--cer", &cer])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    generate(&dir, &["--force"]);
}

#[test]
fn wrong_passphrase_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let (pfx, cer) = generate(&dir, &[]);

    keycred(&dir)
        .env("KEYCRED_PFX_PASSWORD", "not-the-passphrase")
        .args(["build", "--pfx", &pfx, "--cer", &cer])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load certificate"));
}

#[test]
fn upload_requires_token() {
    let dir = TempDir::new().unwrap();
    let (pfx, cer) = generate(&dir, &[]);

    keycred(&dir)
        .args(["upload", "6b9f3a1e-0000-4000-8000-000000000001", "--pfx", &pfx, "--cer", &cer])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEYCRED_GRAPH_TOKEN"));
}

#[test]
fn dry_run_needs_no_token() {
    let dir = TempDir::new().unwrap();
    let (pfx, cer) = generate(&dir, &[]);

    keycred(&dir)
        .args(["-o", "json", "upload", "sp-object-id", "--pfx", &pfx, "--cer", &cer, "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"dryRun\": true"))
        .stdout(predicate::str::contains(PASSPHRASE).not());
}

#[test]
fn expired_certificate_needs_allow_expired() {
    let dir = TempDir::new().unwrap();
    let (pfx, cer) = generate(
        &dir,
        &["--not-before", "2024-01-01T00:00:00Z", "--not-after", "2025-01-01T00:00:00Z"],
    );

    keycred(&dir)
        .args(["upload", "sp-object-id", "--pfx", &pfx, "--cer", &cer, "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("certificate has expired"));

    keycred(&dir)
        .args(["upload", "sp-object-id", "--pfx", &pfx, "--cer", &cer, "--dry-run", "--allow-expired"])
        .assert()
        .success();
}

#[test]
fn discovery_prints_app_scoped_urls() {
    let dir = TempDir::new().unwrap();
    keycred(&dir)
        .args(["discovery", "--app-id", "app-123", "--tenant", "contoso.onmicrosoft.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://login.microsoftonline.com/contoso.onmicrosoft.com/discovery/v2.0/keys?appid=app-123",
        ));
}

#[test]
fn config_set_and_show() {
    let dir = TempDir::new().unwrap();
    keycred(&dir)
        .args(["config", "set", "tenant", "contoso.onmicrosoft.com"])
        .assert()
        .success();

    keycred(&dir)
        .args(["config", "set", "token", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not stored"));

    keycred(&dir)
        .args(["-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("contoso.onmicrosoft.com"));

    keycred(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn default_algorithm_generates_rsa_pair() {
    let dir = TempDir::new().unwrap();
    let pfx = dir.path().join("rsa.pfx").display().to_string();
    let cer = dir.path().join("rsa.cer").display().to_string();

    keycred(&dir)
        .args(["-o", "json", "generate", "--subject", "CN=rsa-cli", "--pfx", &pfx, "--cer", &cer])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"algorithm\": \"rsa2048\""));

    keycred(&dir)
        .args(["build", "--pfx", &pfx, "--cer", &cer])
        .assert()
        .success()
        .stdout(predicate::str::contains("CN=rsa-cli"));
}

#[test]
fn huge_days_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let pfx = dir.path().join("far.pfx");
    let cer = dir.path().join("far.cer");

    keycred(&dir)
        .args(["generate", "--subject", "CN=far", "--algorithm", "ecdsa-p256"])
        .args(["--days", "999999999999", "--pfx"])
        .arg(&pfx)
        .arg("--cer")
        .arg(&cer)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("out of range"))
        .stderr(predicate::str::contains("panicked").not());

    assert!(!pfx.exists());
    assert!(!cer.exists());
}

#[test]
fn invalid_thumbprint_rejected_before_fetching() {
    let dir = TempDir::new().unwrap();
    // Nothing listens here; reaching the network would fail with a connection error instead.
    std::fs::write(
        dir.path().join("config.toml"),
        "login_base_url = \"http://127.0.0.1:9\"\ntimeout_secs = 2\n",
    )
    .unwrap();

    keycred(&dir)
        .args(["discovery", "--app-id", "app-123", "--thumbprint", "not-hex"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--thumbprint must be a hex SHA-1 thumbprint"))
        .stderr(predicate::str::contains("connection failed").not());
}

#[cfg(unix)]
#[test]
fn build_out_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let (pfx, cer) = generate(&dir, &[]);
    let out = dir.path().join("secret-payload.json");
    std::fs::write(&out, "stale").unwrap();
    std::fs::set_permissions(&out, std::fs::Permissions::from_mode(0o644)).unwrap();

    keycred(&dir)
        .args(["-o", "json", "build", "--pfx", &pfx, "--cer", &cer, "--out"])
        .arg(&out)
        .assert()
        .success();

    let mode = std::fs::metadata(&out).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
