use std::process::Command;

fn lane_defence(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_lane-defence"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch lane-defence")
}

#[test]
fn builtin_scenario_prints_a_summary() {
    let output = lane_defence(&["--max-seconds", "5", "--log-level", "warn"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let summary = stdout.lines().last().expect("summary line");
    assert!(summary.starts_with("outcome="), "unexpected summary: {summary}");
    assert!(summary.contains("wave="));
    assert!(summary.contains("leak_ratio="));
}

#[test]
fn missing_scenario_files_fail() {
    let output = lane_defence(&["--scenario", "does/not/exist.toml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read scenario"));
}

#[test]
fn zero_tick_rate_is_rejected() {
    let output = lane_defence(&["--tick-hz", "0"]);
    assert!(!output.status.success());
}
