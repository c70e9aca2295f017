use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_sway-rotate");
const LINE_TIMEOUT: Duration = Duration::from_secs(5);

fn session_socket(dir: &Path) -> PathBuf {
    dir.join("sway-ipc.1000.42.sock")
}

fn control_socket(dir: &Path) -> PathBuf {
    dir.join("sway-rotate.1000.42.sock")
}

/// Write a helper script once; later instances reuse the same file.
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    if !path.exists() {
        std::fs::write(&path, format!("#!/bin/sh\n{body}")).expect("write script");
    }
    path
}

/// A `sway-rotate status` child with its stdout read on a helper thread.
struct StatusProcess {
    child: Child,
    lines: mpsc::Receiver<String>,
}

impl StatusProcess {
    fn start(dir: &Path) -> Self {
        let sensor = write_script(
            dir,
            "sensor.sh",
            "echo '=== Has accelerometer (orientation: right-up, tilt: vertical)'\nexec sleep 60\n",
        );
        let transform = write_script(
            dir,
            "transform.sh",
            &format!("echo \"$@\" >> {}\n", dir.join("transforms").display()),
        );

        let mut child = Command::new(BIN)
            .env("SWAYSOCK", session_socket(dir))
            .env_remove("RUST_LOG")
            .args(["status", "--sensor-command"])
            .arg(format!("sh {}", sensor.display()))
            .arg("--transform-command")
            .arg(format!("sh {}", transform.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn status");

        let stdout = child.stdout.take().expect("piped stdout");
        let (tx, lines) = mpsc::channel();
        std::thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        Self { child, lines }
    }

    fn next_status(&self) -> Value {
        let line = self
            .lines
            .recv_timeout(LINE_TIMEOUT)
            .expect("status line in time");
        serde_json::from_str(&line).expect("status line is JSON")
    }

    fn terminate(&mut self) -> std::process::ExitStatus {
        let _ = Command::new("kill")
            .args(["-TERM", &self.child.id().to_string()])
            .status();
        let deadline = Instant::now() + LINE_TIMEOUT;
        while Instant::now() < deadline {
            if let Ok(Some(status)) = self.child.try_wait() {
                return status;
            }
            sleep(Duration::from_millis(50));
        }
        let _ = self.child.kill();
        self.child.wait().expect("wait after kill")
    }
}

impl Drop for StatusProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn sway_rotate(dir: &Path) -> AssertCommand {
    let mut cmd = AssertCommand::new(BIN);
    cmd.env("SWAYSOCK", session_socket(dir)).env_remove("RUST_LOG");
    cmd
}

#[test]
fn commands_without_daemon_exit_one() {
    let dir = TempDir::new().expect("tempdir");
    let cases: [&[&str]; 4] = [&["enable"], &["toggle"], &["disable"], &["disable", "--hardware"]];
    for args in cases {
        sway_rotate(dir.path())
            .args(args)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("no instance of 'sway-rotate status'"));
    }
}

#[test]
fn missing_session_socket_is_an_error() {
    AssertCommand::new(BIN)
        .env_remove("SWAYSOCK")
        .arg("toggle")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SWAYSOCK"));
}

#[test]
fn unknown_orientation_is_rejected_by_the_parser() {
    let dir = TempDir::new().expect("tempdir");
    sway_rotate(dir.path())
        .args(["status", "--hardware-disabled-orientation", "sideways"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected: unset, normal"));
}

#[test]
fn status_rotates_and_obeys_commands() {
    let dir = TempDir::new().expect("tempdir");
    let mut status = StatusProcess::start(dir.path());

    let initial = status.next_status();
    assert_eq!(initial["class"][0], "enabled");

    let rotated = status.next_status();
    assert_eq!(rotated["class"][1], "right-up");
    assert!(control_socket(dir.path()).exists());

    sway_rotate(dir.path()).arg("toggle").assert().success();
    let toggled = status.next_status();
    assert_eq!(toggled["text"], "auto-rotate OFF");
    assert_eq!(
        toggled["tooltip"],
        "Automatic rotation enabled: false\nOrientation: right-up"
    );

    sway_rotate(dir.path())
        .args(["disable", "--hardware"])
        .assert()
        .success();
    assert_eq!(status.next_status()["class"][0], "disabled");

    let transforms =
        std::fs::read_to_string(dir.path().join("transforms")).expect("transform log");
    assert_eq!(
        transforms.lines().collect::<Vec<_>>(),
        vec!["output * transform 90", "output * transform 0"]
    );

    let exit = status.terminate();
    assert!(exit.success(), "SIGTERM is a clean shutdown: {exit:?}");
    assert!(
        !control_socket(dir.path()).exists(),
        "socket removed on shutdown"
    );
}

#[test]
fn second_status_becomes_a_proxy() {
    let dir = TempDir::new().expect("tempdir");
    let mut first = StatusProcess::start(dir.path());
    let _initial = first.next_status();
    let _rotated = first.next_status();

    let second = StatusProcess::start(dir.path());
    let attached = second.next_status();
    assert_eq!(first.next_status(), attached);

    sway_rotate(dir.path()).arg("disable").assert().success();
    let disabled = first.next_status();
    assert_eq!(disabled["class"][0], "disabled");
    assert_eq!(second.next_status(), disabled);

    // Only the first instance ever rotates.
    let transforms =
        std::fs::read_to_string(dir.path().join("transforms")).expect("transform log");
    assert_eq!(transforms.lines().count(), 1);

    assert!(first.terminate().success());
}
