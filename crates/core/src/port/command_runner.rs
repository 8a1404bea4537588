// Command Runner Port
// Abstraction over "run a command, give me its stdout"

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Why an external command produced no usable output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Command timeout after {0}ms")]
    Timeout(u64),

    #[error("Exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },
}

/// A program and its argument vector, started without a shell
///
/// Arguments are handed to the OS one by one, so caller-supplied values never
/// pass through shell parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Return as soon as the process is started instead of waiting for it
    pub detached: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            detached: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }
}

/// Display form used in logs and registry records; blank or spaced arguments are quoted
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Command Runner trait
///
/// Implementations:
/// - SubprocessCommandRunner: spawns real processes
/// - MockCommandRunner: scripted responses for tests
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a fixed query line through the platform shell and return captured stdout
    ///
    /// Only for built-in query text; never splice caller input into `command`.
    ///
    /// # Errors
    /// - CommandError::SpawnFailed if the shell cannot be started
    /// - CommandError::Timeout if the command outlives `timeout` (the child is killed)
    /// - CommandError::NonZeroExit if the command reports failure
    async fn run(&self, command: &str, timeout: Duration) -> Result<String, CommandError>;

    /// Start `invocation` directly (no shell) and return captured stdout
    ///
    /// A detached invocation returns an empty string once the process has
    /// started; only a failed spawn is reported.
    ///
    /// # Errors
    /// Same as `run`; a missing program is `SpawnFailed`.
    async fn exec(
        &self,
        invocation: &Invocation,
        timeout: Duration,
    ) -> Result<String, CommandError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scripted reply for a matched command
    #[derive(Debug, Clone)]
    pub enum MockResponse {
        /// Return this stdout
        Output(String),
        /// Fail with this error
        Fail(CommandError),
        /// Never answer within any realistic timeout
        Hang,
    }

    struct Rule {
        pattern: String,
        responses: VecDeque<MockResponse>,
    }

    /// Mock Command Runner
    ///
    /// Rules match by substring, first match wins. A rule with several responses
    /// replays them in order and then keeps repeating the last one. Commands with
    /// no matching rule fail with `SpawnFailed`.
    #[derive(Clone, Default)]
    pub struct MockCommandRunner {
        rules: Arc<Mutex<Vec<Rule>>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockCommandRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on(self, pattern: impl Into<String>, response: MockResponse) -> Self {
            self.on_sequence(pattern, vec![response])
        }

        pub fn on_output(self, pattern: impl Into<String>, stdout: impl Into<String>) -> Self {
            self.on(pattern, MockResponse::Output(stdout.into()))
        }

        pub fn on_sequence(self, pattern: impl Into<String>, responses: Vec<MockResponse>) -> Self {
            self.rules.lock().unwrap().push(Rule {
                pattern: pattern.into(),
                responses: responses.into(),
            });
            self
        }

        /// Every command received, in order
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn next_response(&self, command: &str) -> Option<MockResponse> {
            let mut rules = self.rules.lock().unwrap();
            let rule = rules.iter_mut().find(|r| command.contains(&r.pattern))?;
            if rule.responses.len() > 1 {
                rule.responses.pop_front()
            } else {
                rule.responses.front().cloned()
            }
        }
    }

    impl MockCommandRunner {
        async fn respond(
            &self,
            command: String,
            timeout: Duration,
        ) -> Result<String, CommandError> {
            let response = self.next_response(&command);
            self.calls.lock().unwrap().push(command.clone());

            match response {
                Some(MockResponse::Output(stdout)) => Ok(stdout),
                Some(MockResponse::Fail(err)) => Err(err),
                Some(MockResponse::Hang) => {
                    tokio::time::sleep(timeout + Duration::from_secs(3600)).await;
                    Err(CommandError::Timeout(timeout.as_millis() as u64))
                }
                None => Err(CommandError::SpawnFailed(format!(
                    "no scripted response for '{}'",
                    command
                ))),
            }
        }
    }

    /// Invocations are recorded and matched by their display form
    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run(&self, command: &str, timeout: Duration) -> Result<String, CommandError> {
            self.respond(command.to_string(), timeout).await
        }

        async fn exec(
            &self,
            invocation: &Invocation,
            timeout: Duration,
        ) -> Result<String, CommandError> {
            self.respond(invocation.to_string(), timeout).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::*;
    use super::*;

    #[tokio::test]
    async fn test_mock_sequence_repeats_last() {
        let runner = MockCommandRunner::new().on_sequence(
            "cpu",
            vec![
                MockResponse::Fail(CommandError::Timeout(10)),
                MockResponse::Output("42".to_string()),
            ],
        );
        let t = Duration::from_millis(10);

        assert!(runner.run("cpu", t).await.is_err());
        assert_eq!(runner.run("cpu", t).await.unwrap(), "42");
        assert_eq!(runner.run("cpu", t).await.unwrap(), "42");
        assert_eq!(runner.call_count(), 3);
    }

    #[tokio::test]
    async fn test_unscripted_command_fails_to_spawn() {
        let runner = MockCommandRunner::new();
        let err = runner.run("whoami", Duration::from_millis(10)).await.unwrap_err();
        assert!(matches!(err, CommandError::SpawnFailed(_)));
    }

    #[test]
    fn test_invocation_display_quotes_blank_and_spaced_args() {
        let invocation = Invocation::new("cmd").args(["/C", "start", "", "my app.exe"]);
        assert_eq!(invocation.to_string(), "cmd /C start \"\" \"my app.exe\"");
        assert!(!invocation.detached);
        assert!(Invocation::new("gedit").detached().detached);
    }

    #[tokio::test]
    async fn test_mock_matches_invocations_by_display() {
        let runner = MockCommandRunner::new().on_output("pkill -x gedit", "");
        let t = Duration::from_millis(10);

        let ok = runner.exec(&Invocation::new("pkill").args(["-x", "gedit"]), t).await;
        let missing = runner.exec(&Invocation::new("pkill").args(["-x", "vim"]), t).await;

        assert!(ok.is_ok());
        assert!(missing.is_err());
        assert_eq!(runner.calls(), vec!["pkill -x gedit", "pkill -x vim"]);
    }
}
