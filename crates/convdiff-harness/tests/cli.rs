#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_workdir(suffix: &str) -> PathBuf {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    let dir = std::env::temp_dir().join(format!(
        "convdiff_cli_{suffix}_{}_{nonce}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp workdir");
    dir
}

#[test]
fn help_prints_usage_and_exits_success() {
    let output = Command::new(env!("CARGO_BIN_EXE_convdiff"))
        .arg("--help")
        .current_dir(unique_workdir("help"))
        .output()
        .expect("failed to execute convdiff");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--test <index>"), "usage on stderr: {stderr}");
}

#[test]
fn unrecognized_argument_exits_2() {
    let output = Command::new(env!("CARGO_BIN_EXE_convdiff"))
        .arg("--bogus")
        .current_dir(unique_workdir("bogus"))
        .output()
        .expect("failed to execute convdiff");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized argument `--bogus`"));
}

#[test]
fn out_of_range_test_index_is_reported_without_running_anything() {
    let workdir = unique_workdir("range");
    let output = Command::new(env!("CARGO_BIN_EXE_convdiff"))
        .args(["--test", "0"])
        .current_dir(&workdir)
        .output()
        .expect("failed to execute convdiff");

    // Failures are reported via text only; exit stays at default success.
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("test index must be between 1 and 100, got 0"),
        "stderr: {stderr}"
    );
    assert!(
        !workdir.join("input_matrices").exists(),
        "no fixtures may be created for an out-of-range index"
    );
}

#[test]
fn config_file_bounds_the_single_test_range() {
    let workdir = unique_workdir("config");
    fs::write(workdir.join("config.txt"), "num_tests = 5\n").expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_convdiff"))
        .args(["--test", "9"])
        .current_dir(&workdir)
        .output()
        .expect("failed to execute convdiff");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("test index must be between 1 and 5, got 9"),
        "stderr: {stderr}"
    );
}
