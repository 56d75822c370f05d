use std::{
    env, fs,
    path::{Path, PathBuf},
};

use assert_cmd::Command;

/// Writes a config for one test and returns its path.
fn config(name: &str, device: &Path, extra: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("pcie215-{}-{name}.toml", std::process::id()));
    let content = format!(
        "[device]\npath = \"{}\"\n\n[log]\nlevel = \"debug\"\n\n{extra}",
        device.display()
    );
    fs::write(&path, content).unwrap();
    path
}

fn read_cmd(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pcie215-read").unwrap();
    cmd.env("PCIE215_CONFIG", config).env_remove("PCIE215_LOG");
    cmd
}

fn ioctl_cmd(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pcie215-ioctl").unwrap();
    cmd.env("PCIE215_CONFIG", config).env_remove("PCIE215_LOG");
    cmd
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn help_exits_with_failure() {
    let cfg = config("help", Path::new("/dev/null"), "");
    let output = read_cmd(&cfg).arg("--help").output().unwrap();

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("usage:"));
    assert!(stderr.contains("--help"));
}

#[test]
fn extra_arguments_are_rejected() {
    let cfg = config("extra", Path::new("/dev/null"), "");
    let output = read_cmd(&cfg).arg("now").output().unwrap();

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("usage:"));
}

#[test]
fn missing_device() {
    let cfg = config("missing", Path::new("/dev/pcie215-not-here"), "");
    let output = read_cmd(&cfg).output().unwrap();

    assert!(!output.status.success());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("Err, can't open [/dev/pcie215-not-here]."));
    assert!(stderr.contains("Is the driver running?"));
}

#[test]
fn completed_read_succeeds() {
    // a zero-length read of /dev/null returns 0 right away
    let cfg = config(
        "null",
        Path::new("/dev/null"),
        "[wait]\ntimeout_secs = 5\n",
    );
    let output = read_cmd(&cfg).output().unwrap();

    assert!(output.status.success());
    assert!(stderr_of(&output).contains("OK, read [0]."));
}

#[test]
fn bad_config() {
    let path = env::temp_dir().join(format!("pcie215-{}-bad.toml", std::process::id()));
    fs::write(&path, "[device]\nlines = \"six\"\n").unwrap();
    let output = read_cmd(&path).output().unwrap();

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("bad config"));
}

#[test]
fn ioctl_needs_an_action() {
    let cfg = config("ioctl-none", Path::new("/dev/null"), "");
    let output = ioctl_cmd(&cfg).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn ioctl_rejects_irq_values() {
    let cfg = config("ioctl-irq", Path::new("/dev/null"), "");
    let output = ioctl_cmd(&cfg).args(["-i", "2"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn ioctl_rejects_wide_mask() {
    let cfg = config("ioctl-mask", Path::new("/dev/null"), "");
    let output = ioctl_cmd(&cfg).args(["-a", "0x40"]).output().unwrap();

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("exceeds the 6 lines"));
}

#[test]
fn ioctl_on_foreign_device() {
    let cfg = config("ioctl-foreign", Path::new("/dev/null"), "");
    let output = ioctl_cmd(&cfg).args(["-i", "1", "-a", "0x1"]).output().unwrap();

    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("can't set triggers"));
}

#[test]
fn ioctl_lists_lines() {
    let cfg = config("ioctl-list", Path::new("/dev/null"), "");
    let output = ioctl_cmd(&cfg).arg("--list").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0x1  PPI X C0"));
    assert!(stdout.contains("0x20  CTR Z2"));
}
