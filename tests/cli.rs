use std::process::Command;

fn maria() -> Command {
    Command::new(env!("CARGO_BIN_EXE_maria"))
}

#[test]
fn missing_required_flags_exit_with_usage() {
    let output = maria().args(["clean", "--in", "reads.fq"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--out"));
}

#[test]
fn help_goes_to_stdout_and_exits_zero() {
    let output = maria().args(["clean", "--help"]).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("--preworker"));
    assert!(output.stderr.is_empty());
}

#[test]
fn unknown_flags_exit_one_with_message() {
    let output = maria().args(["clean", "--bogus"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--bogus"));
}

#[test]
fn fatal_errors_are_reported_and_exit_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = maria()
        .current_dir(dir.path())
        .args(["clean", "--in", "absent.fastq", "--out", "clean.fastq"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn detect_prints_platform() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("reads.fq");
    std::fs::write(
        &input,
        "@m64023e_230414_133043/1/ccs\nACGT\n+\nIIII\n",
    )
    .unwrap();
    let output = maria()
        .arg("detect")
        .arg("--in")
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "PacBio");
}
