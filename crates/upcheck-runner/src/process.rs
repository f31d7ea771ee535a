use std::time::Duration;

use upcheck_utils::error::RunnerError;

use super::CommandSpec;

/// Output from a process execution.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Standard output from the process
    pub stdout: Vec<u8>,
    /// Standard error from the process
    pub stderr: Vec<u8>,
    /// Exit code from the process (None if terminated by signal)
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    /// Create a new `ProcessOutput` with the given values.
    #[must_use]
    pub fn new(stdout: Vec<u8>, stderr: Vec<u8>, exit_code: Option<i32>) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
        }
    }

    /// Get stdout as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Check if the process exited successfully (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Trait for process execution.
///
/// Implementations MUST use argv-style APIs only (no shell string
/// evaluation). The trait is the seam the executor is generic over, so
/// tests can substitute a recording or scripted runner for real process
/// spawning.
pub trait ProcessRunner {
    /// Execute a command with the given timeout.
    ///
    /// # Returns
    ///
    /// * `Ok(ProcessOutput)` - the process completed (possibly with a
    ///   non-zero exit code; callers decide whether that is an error)
    /// * `Err(RunnerError::Timeout)` - the process timed out
    /// * `Err(RunnerError::*)` - other execution errors
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_output_success() {
        let ok = ProcessOutput::new(Vec::new(), Vec::new(), Some(0));
        assert!(ok.success());

        let failed = ProcessOutput::new(Vec::new(), Vec::new(), Some(2));
        assert!(!failed.success());

        let killed = ProcessOutput::new(Vec::new(), Vec::new(), None);
        assert!(!killed.success());
    }

    #[test]
    fn process_output_lossy_utf8() {
        let invalid = vec![0xff, 0xfe, 0x00, 0x01];
        let output = ProcessOutput::new(invalid.clone(), invalid, Some(0));
        assert!(!output.stdout_string().is_empty());
        assert!(!output.stderr_string().is_empty());
    }

    struct MockRunner {
        expected: ProcessOutput,
    }

    impl ProcessRunner for MockRunner {
        fn run(
            &self,
            _cmd: &CommandSpec,
            _timeout: Duration,
        ) -> Result<ProcessOutput, RunnerError> {
            Ok(self.expected.clone())
        }
    }

    #[test]
    fn trait_is_mockable() {
        let mock = MockRunner {
            expected: ProcessOutput::new(b"done".to_vec(), Vec::new(), Some(0)),
        };
        let cmd = CommandSpec::new("ansible-playbook").arg("check_and_simulate.yml");
        let output = mock.run(&cmd, Duration::from_secs(30)).unwrap();
        assert_eq!(output.stdout_string(), "done");
        assert!(output.success());
    }
}
