use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "six-seven"])
        .status()
        .expect("failed to invoke cargo check for six-seven CLI binary");

    assert!(status.success(), "cargo check --bin six-seven should succeed");
}

#[test]
fn simulate_prints_one_line_per_round() {
    let output = Command::new(env!("CARGO_BIN_EXE_six-seven"))
        .args([
            "simulate",
            "--difficulty",
            "easy",
            "--rounds",
            "2",
            "--seed",
            "7",
            "--duration",
            "5",
        ])
        .output()
        .expect("failed to run six-seven simulate");

    assert!(output.status.success(), "simulate should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().next(), Some(six_seven_core::WELCOME_BANNER));
    assert_eq!(stdout.lines().filter(|line| line.starts_with("round ")).count(), 2);
    assert!(stdout.contains("played 2"));
}

#[test]
fn invalid_tuning_is_reported() {
    let output = Command::new(env!("CARGO_BIN_EXE_six-seven"))
        .args(["simulate", "--hit-accuracy", "2"])
        .output()
        .expect("failed to run six-seven simulate");

    assert!(!output.status.success());
}
