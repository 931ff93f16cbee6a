#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde_json::Value;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/kankaku-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn capture() -> Vec<u8> {
    let mut bytes = vec![0x00, 0x04, 0x00, 0x03];
    for x in [10u8, 20, 20, 30] {
        bytes.extend_from_slice(&[0x01, 0x01, x, 0x00, 0x05, 0x00]);
    }
    bytes.extend_from_slice(&[0x02, 0x01, 0x63, 0x00, 0x63, 0x00]);
    bytes.extend_from_slice(&[0x01, 0x00, 0x28, 0x00, 0x05, 0x00]);
    bytes.extend_from_slice(&[0x02, 0x00, 0x63, 0x00, 0x63, 0x00]);
    bytes
}

#[test]
fn watch_follows_replayed_capture() {
    let dir = unique_temp_dir("watch");
    let capture_path = dir.join("capture.bin");
    let sock_path = dir.join("touch.sock");
    std::fs::write(&capture_path, capture()).expect("capture should be writable");

    let mut daemon = Command::new(env!("CARGO_BIN_EXE_kankaku"))
        .args(["--log-level", "error", "replay"])
        .arg(&capture_path)
        .arg(&sock_path)
        .args(["--interval", "2ms"])
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("replay should start");

    let output = Command::new(env!("CARGO_BIN_EXE_kankaku"))
        .args(["--log-level", "error", "--format", "json", "watch"])
        .arg(&sock_path)
        .args(["--connect-timeout", "5s", "--poll-interval", "50ms"])
        .output()
        .expect("watch should run");

    let daemon_status = daemon.wait().expect("replay should exit");
    assert!(daemon_status.success());
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let lines: Vec<Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout should be json lines"))
        .collect();

    assert_eq!(lines[0]["width"], 1024);
    assert_eq!(lines[0]["height"], 768);

    let events: Vec<(String, u64)> = lines[1..lines.len() - 1]
        .iter()
        .map(|line| {
            (
                line["event"].as_str().unwrap_or_default().to_string(),
                line["contact_id"].as_u64().unwrap_or_default(),
            )
        })
        .collect();
    let expected: Vec<(String, u64)> = [
        ("down", 1),
        ("move", 1),
        ("move", 1),
        ("down", 2),
        ("up", 1),
        ("up", 2),
    ]
    .iter()
    .map(|(name, id)| (name.to_string(), *id))
    .collect();
    assert_eq!(events, expected);

    let summary = &lines[lines.len() - 1];
    assert_eq!(summary["end"], "closed");
    assert_eq!(summary["strokes"].as_array().map(Vec::len), Some(1));
    assert_eq!(summary["strokes"][0]["contact_id"], 1);
    assert_eq!(summary["strokes"][0]["points"], 4);
    assert!(!sock_path.exists(), "replay should remove its socket");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn watch_count_stops_early() {
    let dir = unique_temp_dir("watch-count");
    let capture_path = dir.join("capture.bin");
    let sock_path = dir.join("touch.sock");
    std::fs::write(&capture_path, capture()).expect("capture should be writable");

    let mut daemon = Command::new(env!("CARGO_BIN_EXE_kankaku"))
        .args(["--log-level", "error", "replay"])
        .arg(&capture_path)
        .arg(&sock_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("replay should start");

    let output = Command::new(env!("CARGO_BIN_EXE_kankaku"))
        .args(["--log-level", "error", "--format", "json", "watch"])
        .arg(&sock_path)
        .args(["--count", "2"])
        .output()
        .expect("watch should run");

    let _ = daemon.wait();
    assert!(output.status.success());

    let lines: Vec<Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout should be json lines"))
        .collect();
    assert_eq!(lines.len(), 4, "device, two events, summary");
    assert_eq!(lines[3]["end"], "stopped");
    assert_eq!(lines[3]["strokes"][0]["sealed"], false);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn watch_times_out_without_daemon() {
    let dir = unique_temp_dir("watch-missing");
    let output = Command::new(env!("CARGO_BIN_EXE_kankaku"))
        .args(["--log-level", "error", "watch"])
        .arg(dir.join("nobody.sock"))
        .args(["--connect-timeout", "200ms"])
        .output()
        .expect("watch should run");

    assert_eq!(output.status.code(), Some(124));
    let _ = std::fs::remove_dir_all(&dir);
}
