// Subprocess command runner
// reason: tokio::process so a slow query never blocks the runtime
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use deskops_core::port::{CommandError, CommandRunner, Invocation};

/// Spawns OS processes for the dispatcher and the telemetry queries
///
/// Query lines go through the platform shell (`cmd /C` or `sh -c`); invocations
/// are started directly with their argument vector. Children are killed when
/// their timeout elapses.
#[derive(Debug, Clone, Default)]
pub struct SubprocessCommandRunner;

impl SubprocessCommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn shell_command(command: &str) -> Command {
        #[cfg(windows)]
        {
            // cmd.exe parses its own command line; MSVC-style quoting would garble it
            let mut cmd = Command::new("cmd");
            cmd.raw_arg("/C").raw_arg(command);
            cmd
        }

        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }

    async fn collect(
        child: Child,
        label: &str,
        limit: Duration,
    ) -> Result<String, CommandError> {
        let timeout_ms = limit.as_millis() as u64;

        let output = match timeout(limit, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(CommandError::SpawnFailed(e.to_string())),
            Err(_) => {
                warn!(command = %label, timeout_ms = timeout_ms, "Command timed out, child killed");
                return Err(CommandError::Timeout(timeout_ms));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(command = %label, code = ?output.status.code(), stderr = %stderr, "Command failed");
            return Err(CommandError::NonZeroExit {
                code: output.status.code(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl CommandRunner for SubprocessCommandRunner {
    async fn run(&self, command: &str, limit: Duration) -> Result<String, CommandError> {
        debug!(command = %command, timeout_ms = limit.as_millis() as u64, "Running command");

        let child = Self::shell_command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CommandError::SpawnFailed(e.to_string()))?;

        Self::collect(child, command, limit).await
    }

    async fn exec(
        &self,
        invocation: &Invocation,
        limit: Duration,
    ) -> Result<String, CommandError> {
        let label = invocation.to_string();
        debug!(command = %label, detached = invocation.detached, "Starting process");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).stdin(Stdio::null());

        if invocation.detached {
            // The child outlives this call; tokio reaps it once it exits
            cmd.stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .map_err(|e| spawn_failed(invocation, e))?;
            return Ok(String::new());
        }

        let child = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_failed(invocation, e))?;

        Self::collect(child, &label, limit).await
    }
}

fn spawn_failed(invocation: &Invocation, err: std::io::Error) -> CommandError {
    CommandError::SpawnFailed(format!("{}: {}", invocation.program, err))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_captures_stdout() {
        let runner = SubprocessCommandRunner::new();
        let stdout = assert_ok!(runner.run("echo hello", Duration::from_secs(5)).await);
        assert_eq!(stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_non_zero_exit_carries_stderr() {
        let runner = SubprocessCommandRunner::new();
        let err = runner
            .run("echo boom >&2; exit 3", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CommandError::NonZeroExit {
                code: Some(3),
                stderr: "boom".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let runner = SubprocessCommandRunner::new();
        let started = std::time::Instant::now();

        let err = runner
            .run("sleep 5", Duration::from_millis(100))
            .await
            .unwrap_err();

        assert_eq!(err, CommandError::Timeout(100));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_background_launch_returns_immediately() {
        let runner = SubprocessCommandRunner::new();
        let started = std::time::Instant::now();

        assert_ok!(
            runner
                .run("nohup sleep 3 >/dev/null 2>&1 &", Duration::from_secs(2))
                .await
        );

        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_invocation_args_bypass_the_shell() {
        let runner = SubprocessCommandRunner::new();
        let hostile = "x; touch /tmp/deskops-owned \"$(id)\" `id`";

        let stdout = assert_ok!(
            runner
                .exec(&Invocation::new("echo").arg(hostile), Duration::from_secs(5))
                .await
        );

        assert_eq!(stdout.trim_end(), hostile);
    }

    #[tokio::test]
    async fn test_detached_missing_program_fails_to_spawn() {
        let runner = SubprocessCommandRunner::new();

        let err = runner
            .exec(
                &Invocation::new("definitely-missing-app-xyz").detached(),
                Duration::from_secs(2),
            )
            .await
            .unwrap_err();

        match err {
            CommandError::SpawnFailed(msg) => assert!(msg.contains("definitely-missing-app-xyz")),
            other => panic!("expected spawn failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_detached_returns_without_waiting() {
        let runner = SubprocessCommandRunner::new();
        let started = std::time::Instant::now();

        let stdout = assert_ok!(
            runner
                .exec(&Invocation::new("sleep").arg("3").detached(), Duration::from_secs(2))
                .await
        );

        assert!(stdout.is_empty());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_invocation_non_zero_exit() {
        let runner = SubprocessCommandRunner::new();

        let err = runner
            .exec(&Invocation::new("false"), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, CommandError::NonZeroExit { code: Some(1), .. }));
    }
}
