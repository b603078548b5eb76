// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn cmd(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn run_process_to_completion_returns_result() {
    let group = ConcurrencyGroup::new(Duration::from_secs(5));
    let result = group
        .run_process_to_completion(&cmd(&["echo", "hi"]), RunOptions::new())
        .await
        .expect("spawn ok");
    assert_eq!(result.returncode, Some(0));
    group.join().await;
}

#[tokio::test]
async fn run_background_streams_output_and_reports_exit() {
    let group = ConcurrencyGroup::new(Duration::from_secs(5));
    let mut proc = group
        .run_background(&cmd(&["printf", "out1\\nout2\\n"]), None, vec![])
        .await
        .expect("spawn ok");
    let code = proc.wait_and_read(Some(Duration::from_secs(5))).await;
    assert_eq!(code, Some(0));
    group.join().await;
}

#[tokio::test]
async fn run_background_poll_is_none_while_running() {
    let group = ConcurrencyGroup::new(Duration::from_secs(5));
    let mut proc = group.run_background(&cmd(&["sleep", "5"]), None, vec![]).await.expect("spawn ok");
    assert_eq!(proc.poll(), None);
    proc.terminate(0).await;
    group.join().await;
}

#[tokio::test]
async fn join_sends_shutdown_to_background_children() {
    let group = ConcurrencyGroup::new(Duration::from_millis(500));
    let _proc = group.run_background(&cmd(&["sleep", "30"]), None, vec![]).await.expect("spawn ok");
    let start = std::time::Instant::now();
    group.join().await;
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn shutdown_event_flips_is_shutting_down() {
    let group = ConcurrencyGroup::new(Duration::from_secs(5));
    assert!(!group.is_shutting_down());
    group.shutdown_event().send(true).expect("send");
    assert!(group.is_shutting_down());
    group.join().await;
}
