use std::fs;

use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

macro_rules! payflow {
    () => {
        assert_cmd::cargo::cargo_bin_cmd!("payflow")
    };
}

fn project_with_config(content: &str) -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    fs::write(dir.path().join("payflow.toml"), content).expect("failed to write payflow.toml");
    dir
}

const UNREACHABLE_QUICKPAY: &str = r#"
[http]
timeout_secs = 5

[quickpay]
api_key = "test-key"
url = "http://127.0.0.1:9"
"#;

const VERIFY_ARGS: [&str; 13] = [
    "qp-verify",
    "--number",
    "1000000000000008",
    "--month",
    "9",
    "--year",
    "2030",
    "--cvd",
    "123",
    "--name",
    "Longbob Longsen",
    "--order-id",
    "1001",
];

#[test]
fn help_lists_commands() {
    payflow!()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("dr-store"))
        .stdout(contains("dr-purchase"))
        .stdout(contains("qp-verify"))
        .stdout(contains("check-config"));
}

#[test]
fn missing_config_reports_cause_chain() {
    let dir = TempDir::new().expect("failed to create temp dir");

    payflow!()
        .arg("check-config")
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(contains("error: gateway error"))
        .stderr(contains("caused by: failed to read gateway config 'payflow.toml'"));
}

#[test]
fn check_config_lists_configured_providers() {
    let dir = project_with_config("mode = \"live\"\n\n[quickpay]\napi_key = \"qp\"\n");

    payflow!()
        .arg("check-config")
        .current_dir(dir.path())
        .assert()
        .success()
        .stdout(contains("Mode: Live"))
        .stdout(contains("Polling: 2 attempt(s), 500ms apart"))
        .stdout(contains("✓ quickpay"))
        .stdout(contains("✗ digital_river (not configured)"));
}

#[test]
fn check_config_reads_explicit_path() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("gateways.toml");
    fs::write(&path, "[digital_river]\ntoken = \"t\"\n").expect("failed to write config");

    payflow!()
        .arg("check-config")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("✓ digital_river"));
}

#[test]
fn check_config_without_providers_fails() {
    let dir = project_with_config("mode = \"test\"\n");

    payflow!()
        .arg("check-config")
        .current_dir(dir.path())
        .assert()
        .failure()
        .stdout(contains("✗ quickpay (not configured)"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = project_with_config("[poll]\nmax_attempts = \"many\"\n");

    payflow!()
        .arg("check-config")
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(contains("caused by: failed to parse gateway config"));
}

#[test]
fn dr_store_without_provider_section_fails() {
    let dir = project_with_config(UNREACHABLE_QUICKPAY);

    payflow!()
        .args(["dr-store", "--source", "src_1", "--customer", "cus_9"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(contains("caused by: no [digital_river] section in gateway config"));
}

#[test]
fn dr_store_rejects_customer_with_email() {
    payflow!()
        .args([
            "dr-store",
            "--source",
            "src_1",
            "--customer",
            "cus_9",
            "--email",
            "a@example.com",
        ])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

#[test]
fn dr_store_needs_customer_or_email() {
    payflow!()
        .args(["dr-store", "--source", "src_1"])
        .assert()
        .failure()
        .stderr(contains("--customer"));
}

#[test]
fn qp_verify_rejects_invalid_month() {
    let mut args = VERIFY_ARGS;
    args[4] = "13";

    payflow!()
        .args(args)
        .assert()
        .failure()
        .stderr(contains("13"));
}

#[test]
fn qp_verify_against_unreachable_provider_reports_fault() {
    let dir = project_with_config(UNREACHABLE_QUICKPAY);

    payflow!()
        .args(VERIFY_ARGS)
        .current_dir(dir.path())
        .assert()
        .failure()
        .stdout(contains("✗ authorize: "))
        .stdout(contains("POST /payments could not be completed"))
        .stdout(contains("✗ Transaction failed").and(contains("void_payment").not()));
}

#[test]
fn qp_verify_json_report_carries_transport_failure() -> anyhow::Result<()> {
    let dir = project_with_config(UNREACHABLE_QUICKPAY);

    let output = payflow!()
        .arg("--json")
        .args(VERIFY_ARGS)
        .current_dir(dir.path())
        .output()?;

    assert!(!output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["succeeded"], false);
    assert_eq!(report["steps"][0]["name"], "authorize");
    assert_eq!(report["steps"].as_array().map(Vec::len), Some(1));
    let message = report["message"].as_str().unwrap_or_default();
    assert!(message.contains("POST /payments could not be completed"));
    Ok(())
}
