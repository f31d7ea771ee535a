use std::process::Stdio;
use std::time::Duration;

use upcheck_utils::error::RunnerError;

use super::{CommandSpec, ProcessOutput, ProcessRunner};

/// Native process runner using `std::process::Command`.
///
/// `NativeRunner` executes commands with argv-style APIs only: no `sh -c`,
/// no shell metacharacter interpretation. Timeout handling is thread-based
/// so the public interface stays synchronous.
///
/// # Example
///
/// ```rust,no_run
/// use upcheck_runner::{NativeRunner, ProcessRunner, CommandSpec};
/// use std::time::Duration;
///
/// let runner = NativeRunner::new();
/// let cmd = CommandSpec::new("echo").arg("hello");
/// let output = runner.run(&cmd, Duration::from_secs(30)).unwrap();
/// assert!(output.success());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRunner;

impl NativeRunner {
    /// Create a new `NativeRunner`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Terminate a process by its PID.
    ///
    /// On Unix, sends SIGKILL. Elsewhere this is a no-op; the monitoring
    /// thread is left to finish on its own.
    fn terminate_process(pid: u32) {
        #[cfg(unix)]
        {
            unsafe {
                libc::kill(pid as i32, libc::SIGKILL);
            }
        }

        #[cfg(not(unix))]
        {
            let _ = pid;
        }
    }
}

impl ProcessRunner for NativeRunner {
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError> {
        use std::sync::mpsc;
        use std::thread;

        let mut command = cmd.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = command.spawn().map_err(|e| RunnerError::ExecutionFailed {
            program: cmd.program.to_string_lossy().into_owned(),
            reason: e.to_string(),
        })?;

        let child_id = child.id();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let output = child.wait_with_output();
            let _ = tx.send(output);
        });

        match rx.recv_timeout(timeout) {
            Ok(output_result) => {
                let _ = handle.join();

                let output = output_result.map_err(|e| RunnerError::ExecutionFailed {
                    program: cmd.program.to_string_lossy().into_owned(),
                    reason: format!("failed to wait for process: {e}"),
                })?;

                Ok(ProcessOutput::new(
                    output.stdout,
                    output.stderr,
                    output.status.code(),
                ))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                Self::terminate_process(child_id);
                let _ = handle.join();

                Err(RunnerError::Timeout { duration: timeout })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(RunnerError::ExecutionFailed {
                program: cmd.program.to_string_lossy().into_owned(),
                reason: "process monitoring thread terminated unexpectedly".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_simple_command() {
        let runner = NativeRunner::new();
        let cmd = CommandSpec::new("echo").arg("hello");
        let output = runner.run(&cmd, Duration::from_secs(30)).unwrap();
        assert!(output.success());
        assert!(output.stdout_string().contains("hello"));
    }

    #[test]
    fn captures_nonzero_exit_code() {
        let runner = NativeRunner::new();
        let cmd = CommandSpec::new("false");
        let output = runner.run(&cmd, Duration::from_secs(30)).unwrap();
        assert!(!output.success());
        assert_eq!(output.exit_code, Some(1));
    }

    #[test]
    fn spawn_failure_reports_program() {
        let runner = NativeRunner::new();
        let cmd = CommandSpec::new("definitely-not-a-real-binary-upcheck");
        let err = runner.run(&cmd, Duration::from_secs(5)).unwrap_err();
        match err {
            RunnerError::ExecutionFailed { program, .. } => {
                assert!(program.contains("definitely-not-a-real-binary"));
            }
            other => panic!("expected ExecutionFailed, got {other:?}"),
        }
    }

    #[test]
    #[cfg(unix)]
    fn times_out_long_running_process() {
        let runner = NativeRunner::new();
        let cmd = CommandSpec::new("sleep").arg("30");
        let err = runner.run(&cmd, Duration::from_millis(200)).unwrap_err();
        match err {
            RunnerError::Timeout { duration } => {
                assert_eq!(duration, Duration::from_millis(200));
                // sub-second timeouts must not be reported as zero
                assert!(err.to_string().contains("200ms"));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }
}
