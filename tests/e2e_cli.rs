
use assert_cmd::prelude::*;
use cli_helpers::{base_cmd, project_json, run_cmd_json, setup_temp_home, write_config};
use predicates::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

fn decimal_at(value: &serde_json::Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal serialized as string"))
        .expect("invalid decimal")
}

#[test]
fn project_with_fixed_rate_prints_full_report_without_color() {
    let home = setup_temp_home();

    let mut cmd = base_cmd(&home);
    cmd.args([
        "project",
        "1000",
        "2024-01-01",
        "2024-01-05",
        "110",
        "100",
        "--rate",
        "0.04",
        "--calendar",
        "weekend-only",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("R$ 1.002,00"))
        .stdout(predicate::str::contains("after 5 business days"))
        .stdout(predicate::str::contains("R$ 892,00"))
        .stdout(predicate::str::contains("R$ 901,80"))
        .stdout(predicate::str::contains("42,00%"))
        .stdout(predicate::str::contains("(fixed)"))
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn national_calendar_skips_new_year() {
    let home = setup_temp_home();

    let json = project_json(
        &home,
        &["1000", "2024-01-01", "2024-01-05", "110", "100", "--rate", "0.04"],
    )
    .expect("projection failed");

    assert_eq!(json["result"]["business_days"], 4);
    assert_eq!(json["result"]["total_days"], 5);
    // 0.1 / 4 * 21
    assert_eq!(decimal_at(&json["result"]["implied_monthly_rate"]), dec!(0.525));
}

#[test]
fn fixed_rate_json_has_no_publication_date() {
    let home = setup_temp_home();

    let json = project_json(
        &home,
        &["1000", "2024-01-01", "2024-01-05", "110", "100", "--rate", "0.04"],
    )
    .expect("projection failed");

    assert!(json["result"]["rate_date"].is_null());
    assert_eq!(json["result"]["used_fallback"], false);
    assert_eq!(decimal_at(&json["result"]["daily_rate"]), dec!(0.0004));
}

#[test]
fn overflowing_amounts_are_invalid_input() {
    let home = setup_temp_home();

    let mut huge_payments = base_cmd(&home);
    huge_payments.args([
        "project",
        "1000",
        "2024-01-01",
        "2024-01-05",
        "79228162514264337593543950335",
        "-79228162514264337593543950335",
        "--rate",
        "0.04",
    ]);
    huge_payments
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("[invalid_input]"));

    // implied rate fits, but not once shown as a percentage
    let mut tiny_base = base_cmd(&home);
    tiny_base.args([
        "project",
        "1000",
        "2024-01-01",
        "2024-01-05",
        "1",
        "0.0000000000000000000000000001",
        "--rate",
        "0.04",
        "--calendar",
        "weekend-only",
    ]);
    tiny_base
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("[invalid_input]"));
}

#[test]
fn brazilian_amount_format_is_accepted() {
    let home = setup_temp_home();

    let json = project_json(
        &home,
        &[
            "1.000,00",
            "2024-01-01",
            "2024-01-05",
            "100,00",
            "100",
            "--rate",
            "0,04",
            "--calendar",
            "weekend-only",
        ],
    )
    .expect("projection failed");

    assert_eq!(decimal_at(&json["input"]["principal"]), dec!(1000));
    assert_eq!(decimal_at(&json["result"]["implied_monthly_rate"]), Decimal::ZERO);
}

#[test]
fn weekend_only_range_reports_division_by_zero() {
    let home = setup_temp_home();

    let mut cmd = base_cmd(&home);
    cmd.args([
        "project",
        "1000",
        "2024-01-06",
        "2024-01-07",
        "110",
        "100",
        "--rate",
        "0.04",
    ]);

    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("[division_by_zero]"));
}

#[test]
fn offline_without_rate_is_rate_unavailable() {
    let home = setup_temp_home();

    let mut cmd = base_cmd(&home);
    cmd.args(["--json", "project", "1000", "2024-01-01", "2024-01-05", "110", "100"]);

    let output = cmd.output().expect("failed to run");
    assert!(!output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("error should be JSON");
    assert_eq!(json["kind"], "rate_unavailable");
}

#[test]
fn invalid_input_is_reported() {
    let home = setup_temp_home();

    let mut bad_date = base_cmd(&home);
    bad_date.args(["project", "1000", "01/01/2024", "2024-01-05", "110", "100", "--rate", "0.04"]);
    bad_date
        .assert()
        .failure()
        .stderr(predicate::str::contains("[invalid_input]"));

    let mut reversed = base_cmd(&home);
    reversed.args(["project", "1000", "2024-01-05", "2024-01-01", "110", "100", "--rate", "0.04"]);
    reversed
        .assert()
        .failure()
        .stderr(predicate::str::contains("[invalid_input]"));

    let mut negative = base_cmd(&home);
    negative.args(["project", "-1000", "2024-01-01", "2024-01-05", "110", "100", "--rate", "0.04"]);
    negative.assert().failure();
}

#[test]
fn business_days_span_years_flag() {
    let home = setup_temp_home();

    let start_year = run_cmd_json(&home, &["business-days", "2024-12-30", "2025-01-03"])
        .expect("business-days failed");
    assert_eq!(start_year["business_days"], 5);
    assert_eq!(start_year["total_days"], 5);

    let spanning = run_cmd_json(
        &home,
        &["business-days", "2024-12-30", "2025-01-03", "--span-years"],
    )
    .expect("business-days failed");
    assert_eq!(spanning["business_days"], 4);
}

#[test]
fn holidays_lists_anbima_extras() {
    let home = setup_temp_home();

    let mut cmd = base_cmd(&home);
    cmd.args(["holidays", "2025", "--calendar", "anbima"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2025-03-03"))
        .stdout(predicate::str::contains("Carnaval"))
        .stdout(predicate::str::contains("Corpus Christi"));
}

#[test]
fn config_file_changes_business_days_per_month() {
    let home = setup_temp_home();
    write_config(&home, "calendar = \"weekend_only\"\nbusiness_days_per_month = 22\n");

    let json = project_json(
        &home,
        &["1000", "2024-01-01", "2024-01-05", "110", "100", "--rate", "0.04"],
    )
    .expect("projection failed");
    assert_eq!(json["result"]["business_days"], 5);
    assert_eq!(decimal_at(&json["result"]["implied_monthly_rate"]), dec!(0.44));
}

#[test]
fn malformed_config_fails_cleanly() {
    let home = setup_temp_home();
    let path = write_config(&home, "calendar = 3\n");

    let mut cmd = base_cmd(&home);
    cmd.arg("--config")
        .arg(&path)
        .args(["holidays", "2025"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn explicit_missing_config_is_an_error() {
    let home = setup_temp_home();

    let mut cmd = base_cmd(&home);
    cmd.arg("--config")
        .arg(home.path().join("missing.toml"))
        .args(["holidays", "2025"]);
    cmd.assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("missing.toml"));
}
