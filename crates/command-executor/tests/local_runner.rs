//! Tests for local command execution

use command_executor::{
    Command, LocalRunner, RunOptions, Runner, SPAWN_FAILURE_EXIT_CODE, TIMEOUT_EXIT_CODE,
};
use std::time::{Duration, Instant};

#[smol_potat::test]
async fn test_captures_stdout() {
    let cmd = Command::builder("echo").arg("hello world").build();

    let outcome = LocalRunner.run(&cmd, RunOptions::captured()).await;

    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.stdout.trim(), "hello world");
    assert!(outcome.stderr.is_empty());
    assert!(outcome.success());
}

#[smol_potat::test]
async fn test_captures_stderr_and_exit_code() {
    let cmd = Command::builder("sh")
        .args(["-c", "echo 'no such file' >&2; exit 3"])
        .build();

    let outcome = LocalRunner.run(&cmd, RunOptions::captured()).await;

    assert_eq!(outcome.exit_code, 3);
    assert_eq!(outcome.stderr.trim(), "no such file");
    assert!(outcome.stdout.is_empty());
    assert!(!outcome.timed_out);
}

#[smol_potat::test]
async fn test_inherited_output_is_not_collected() {
    let cmd = Command::builder("echo").arg("visible on the terminal").build();

    let outcome = LocalRunner.run(&cmd, RunOptions::inherited()).await;

    assert_eq!(outcome.exit_code, 0);
    assert!(outcome.stdout.is_empty());
    assert!(outcome.stderr.is_empty());
}

#[smol_potat::test]
async fn test_non_zero_exit_is_not_an_error() {
    let cmd = Command::new("false");

    let outcome = LocalRunner.run(&cmd, RunOptions::captured()).await;

    assert_eq!(outcome.exit_code, 1);
    assert!(!outcome.success());
}

#[smol_potat::test]
async fn test_timeout_returns_sentinel() {
    let cmd = Command::builder("sleep").arg("5").build();
    let started = Instant::now();

    let outcome = LocalRunner
        .run(&cmd, RunOptions::captured().with_timeout(Duration::from_millis(200)))
        .await;

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(outcome.exit_code, TIMEOUT_EXIT_CODE);
    assert!(outcome.timed_out);
    assert!(outcome.stdout.is_empty());
    assert!(outcome.stderr.contains("sleep 5"));
}

#[smol_potat::test]
async fn test_fast_command_beats_timeout() {
    let cmd = Command::builder("echo").arg("quick").build();

    let outcome = LocalRunner
        .run(&cmd, RunOptions::captured().with_timeout(Duration::from_secs(10)))
        .await;

    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.stdout.trim(), "quick");
}

#[smol_potat::test]
async fn test_missing_program_is_an_outcome() {
    let cmd = Command::builder("definitely-not-a-real-binary-4821").arg("ps").build();

    let outcome = LocalRunner.run(&cmd, RunOptions::captured()).await;

    assert_eq!(outcome.exit_code, SPAWN_FAILURE_EXIT_CODE);
    assert!(outcome.stderr.contains("definitely-not-a-real-binary-4821"));
    assert!(outcome.stderr.contains("failed to spawn process"));
    assert!(!outcome.timed_out);
    assert!(outcome.stdout.is_empty());
}

#[cfg(unix)]
#[smol_potat::test]
async fn test_signal_termination_maps_to_shell_convention() {
    let cmd = Command::builder("sh").args(["-c", "kill -TERM $$"]).build();

    let outcome = LocalRunner.run(&cmd, RunOptions::captured()).await;

    assert_eq!(outcome.exit_code, 128 + 15);
}

#[smol_potat::test]
async fn test_shell_metacharacters_are_passed_verbatim() {
    let cmd = Command::builder("echo").arg("a | tail; b").build();

    let outcome = LocalRunner.run(&cmd, RunOptions::captured()).await;

    assert_eq!(outcome.stdout.trim(), "a | tail; b");
}
