// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::sync::watch;

fn cmd(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn run_captures_stdout_and_exits_zero() {
    let (_tx, rx) = watch::channel(false);
    let result = run(&cmd(&["echo", "hello"]), rx, RunOptions::new()).await.expect("spawn ok");
    assert_eq!(result.returncode, Some(0));
    assert_eq!(result.stdout.trim_end(), "hello");
    assert!(!result.is_timed_out);
}

#[tokio::test]
async fn run_reports_nonzero_exit() {
    let (_tx, rx) = watch::channel(false);
    let result = run(&cmd(&["false"]), rx, RunOptions::new()).await.expect("spawn ok");
    assert_ne!(result.returncode, Some(0));
    assert!(result.check().is_err());
}

#[tokio::test]
async fn run_delivers_lines_via_callback() {
    let (_tx, rx) = watch::channel(false);
    let lines = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let lines_clone = lines.clone();
    let mut options = RunOptions::new();
    options.line_callback = Some(Box::new(move |line| lines_clone.lock().expect("lock").push(line.text)));
    let result = run(&cmd(&["printf", "a\\nb\\n"]), rx, options).await.expect("spawn ok");
    assert_eq!(result.returncode, Some(0));
    let seen = lines.lock().expect("lock").clone();
    assert_eq!(seen, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn run_times_out_and_marks_result() {
    let (_tx, rx) = watch::channel(false);
    let mut options = RunOptions::new();
    options.timeout = Some(Duration::from_millis(50));
    let result = run(&cmd(&["sleep", "5"]), rx, options).await.expect("spawn ok");
    assert!(result.is_timed_out);
    match result.check() {
        Err(ProcessError::TimedOut(_)) => {}
        other => panic!("expected timeout error, got {other:?}"),
    }
}

#[tokio::test]
async fn run_honors_shutdown_signal() {
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(run(&cmd(&["sleep", "5"]), rx, RunOptions::new()));
    tokio::time::sleep(Duration::from_millis(20)).await;
    tx.send(true).expect("send");
    let result = handle.await.expect("join").expect("spawn ok");
    assert_ne!(result.returncode, Some(0));
}

#[tokio::test]
async fn setup_error_on_missing_binary() {
    let (_tx, rx) = watch::channel(false);
    let err = run(&cmd(&["definitely-not-a-real-binary-xyz"]), rx, RunOptions::new()).await;
    assert!(err.is_err());
}
