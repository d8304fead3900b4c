use assert_cmd::Command;

fn ttsbench() -> Command {
    let mut cmd = Command::cargo_bin("ttsbench").unwrap();
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = ttsbench().arg("--help").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["streaming", "input-streaming", "gpt"] {
        assert!(stdout.contains(name), "missing {name} in {stdout}");
    }
}

#[test]
fn unsupported_mode_fails_before_any_call() {
    let dir = std::env::temp_dir();
    ttsbench()
        .args(["input-streaming", "--vendor", "openai", "--out-dir"])
        .arg(&dir)
        .assert()
        .failure();
}

#[test]
fn unknown_vendor_is_a_usage_error() {
    ttsbench()
        .args(["streaming", "--vendor", "acme"])
        .assert()
        .failure();
}

#[test]
fn zero_trials_makes_no_calls() {
    let dir = std::env::temp_dir();
    ttsbench()
        .args(["streaming", "--vendor", "openai", "--trials", "0", "--out-dir"])
        .arg(&dir)
        .env("OPENAI_API_URL", "http://127.0.0.1:9")
        .assert()
        .success();
}
