//! Process supervision against real child processes on Unix.
//!
//! Covers exit code capture, line delivery and the guarantee that a
//! cancelled run tears down the whole process tree, including grandchildren
//! that still hold the output pipes.

#![cfg(unix)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use nix::sys::signal::kill;
use nix::unistd::Pid;
use rtcheck::{
    CancellationSource, CancellationToken, CommandSpec, OutputSinks, ProcessSupervisor,
    SupervisorError,
};
use serial_test::serial;

fn collecting_sinks() -> (OutputSinks, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let out = Arc::clone(&lines);
    let err = Arc::clone(&lines);
    let sinks = OutputSinks::new(
        move |line| out.lock().unwrap().push(format!("out:{line}")),
        move |line| err.lock().unwrap().push(format!("err:{line}")),
    );
    (sinks, lines)
}

/// Zombies count as gone: they hold no pipes and run no code.
fn is_alive(pid: i32) -> bool {
    if kill(Pid::from_raw(pid), None).is_err() {
        return false;
    }
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit(')')
            .next()
            .and_then(|rest| rest.split_whitespace().next())
            != Some("Z"),
        Err(_) => true,
    }
}

async fn wait_until_gone(pid: i32) -> bool {
    for _ in 0..50 {
        if !is_alive(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    false
}

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("/bin/sh").arg("-c").arg(script)
}

// ============================================================================
// Normal completion
// ============================================================================

#[tokio::test]
async fn test_exit_code_is_captured() {
    let code = ProcessSupervisor::new()
        .run(&sh("exit 7"), &OutputSinks::discard(), &CancellationToken::none())
        .await
        .unwrap();
    assert_eq!(code, 7);
}

#[tokio::test]
async fn test_lines_are_delivered_per_stream() {
    let (sinks, lines) = collecting_sinks();
    let code = ProcessSupervisor::new()
        .run(
            &sh("echo one; echo two >&2; echo three"),
            &sinks,
            &CancellationToken::none(),
        )
        .await
        .unwrap();

    assert_eq!(code, 0);
    let lines = lines.lock().unwrap().clone();
    let stdout: Vec<_> = lines.iter().filter(|l| l.starts_with("out:")).collect();
    assert_eq!(stdout, vec!["out:one", "out:three"]);
    assert!(lines.contains(&"err:two".to_string()));
}

#[tokio::test]
#[serial]
async fn test_environment_is_cleared() {
    let (sinks, lines) = collecting_sinks();
    let spec = sh("echo \"[$RTCHECK_PROBE][$ONLY_THIS]\"")
        .clear_env()
        .env("ONLY_THIS", "yes");

    // SAFETY: this test binary does not read RTCHECK_PROBE elsewhere.
    unsafe { std::env::set_var("RTCHECK_PROBE", "leaked") };
    ProcessSupervisor::new()
        .run(&spec, &sinks, &CancellationToken::none())
        .await
        .unwrap();

    assert_eq!(lines.lock().unwrap().clone(), vec!["out:[][yes]"]);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_timeout_kills_long_running_child() {
    let source = CancellationSource::with_timeout(Duration::from_millis(200));
    let started = Instant::now();

    let err = ProcessSupervisor::new()
        .run(&sh("sleep 30"), &OutputSinks::discard(), &source.token())
        .await
        .unwrap_err();

    let SupervisorError::Cancelled { elapsed } = err else {
        panic!("expected cancellation, got {err:?}");
    };
    assert!(elapsed >= Duration::from_millis(200));
    assert!(started.elapsed() < Duration::from_secs(20));
}

#[tokio::test]
async fn test_orphaned_grandchild_holding_pipes_does_not_hang() {
    // The shell exits at once but the backgrounded sleep keeps stdout open.
    let source = CancellationSource::with_timeout(Duration::from_millis(300));
    let started = Instant::now();

    let err = ProcessSupervisor::new()
        .run(
            &sh("sleep 30 & echo started"),
            &OutputSinks::discard(),
            &source.token(),
        )
        .await
        .unwrap_err();

    let SupervisorError::Cancelled { elapsed } = err else {
        panic!("expected cancellation, got {err:?}");
    };
    assert!(elapsed >= Duration::from_millis(300));
    assert!(started.elapsed() < Duration::from_secs(20));
}

#[tokio::test]
async fn test_cancellation_kills_grandchildren() {
    let (sinks, lines) = collecting_sinks();
    let source = CancellationSource::with_timeout(Duration::from_millis(500));

    let result = ProcessSupervisor::new()
        .run(&sh("sleep 30 & echo $!; wait"), &sinks, &source.token())
        .await;
    assert!(matches!(result, Err(SupervisorError::Cancelled { .. })));

    let grandchild: i32 = lines
        .lock()
        .unwrap()
        .iter()
        .find_map(|line| line.strip_prefix("out:"))
        .and_then(|pid| pid.trim().parse().ok())
        .expect("shell printed the background pid");
    assert!(
        wait_until_gone(grandchild).await,
        "grandchild {grandchild} survived cancellation"
    );
}

#[tokio::test]
async fn test_pre_cancelled_token_never_reports_exit() {
    let source = CancellationSource::with_timeout(Duration::from_secs(60));
    source.cancel();

    let result = ProcessSupervisor::new()
        .with_kill_grace(Duration::from_millis(50))
        .run(&sh("sleep 30"), &OutputSinks::discard(), &source.token())
        .await;

    assert!(matches!(result, Err(SupervisorError::Cancelled { .. })));
}
