//! Simulation and upgrade command execution
//!
//! Two modes share one surface: `ansible` delegates to `ansible-playbook`
//! and lets the playbooks write the per-host output files; `apt` runs the
//! package manager locally and writes the files itself for `localhost`.
//! All invocations are argv-style through a [`ProcessRunner`], never a
//! shell.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use upcheck_config::{Config, ExecutorMode};
use upcheck_runner::{CommandSpec, ProcessRunner};
use upcheck_utils::error::RunnerError;
use upcheck_utils::UpcheckError;

use crate::outputs::{rdepends_path, simulation_path};

/// Host name used by the local apt executor.
pub const LOCAL_HOST: &str = "localhost";

/// Executes simulation and upgrade commands for the selected mode.
pub struct Executor<R: ProcessRunner> {
    runner: R,
    mode: ExecutorMode,
    output_dir: PathBuf,
    check_playbook: String,
    upgrade_playbook: String,
    inventory: Option<String>,
    binary: Option<String>,
    limit: Option<String>,
    timeout: Duration,
}

impl<R: ProcessRunner> Executor<R> {
    /// Build an executor from the effective configuration.
    pub fn from_config(
        config: &Config,
        runner: R,
        limit: Option<String>,
    ) -> Result<Self, UpcheckError> {
        Ok(Self {
            runner,
            mode: config.executor_mode()?,
            output_dir: config.output_dir(),
            check_playbook: config.check_playbook(),
            upgrade_playbook: config.upgrade_playbook(),
            inventory: config.playbooks.inventory.clone(),
            binary: config.playbooks.binary.clone(),
            limit,
            timeout: config.command_timeout(),
        })
    }

    /// Run the simulation step for `package`.
    ///
    /// In ansible mode the playbook writes the per-host output files; in apt
    /// mode the output files for `localhost` are written here. A failed
    /// simulation is fatal for the whole run.
    pub fn simulate(&self, package: &str) -> Result<(), UpcheckError> {
        match self.mode {
            ExecutorMode::Ansible => {
                info!(package, playbook = %self.check_playbook, "Running simulation playbook");
                let cmd = self.check_command(package)?;
                self.run_checked(&cmd)?;
            }
            ExecutorMode::Apt => {
                info!(package, "Simulating upgrade with apt-get");
                let sim = CommandSpec::new("apt-get")
                    .arg("--simulate")
                    .arg("install")
                    .arg(package);
                let sim_out = self.run_checked(&sim)?;
                fs::write(simulation_path(&self.output_dir, LOCAL_HOST), sim_out)?;

                let deps = CommandSpec::new("apt-cache").arg("rdepends").arg(package);
                let deps_out = self.run_checked(&deps)?;
                fs::write(rdepends_path(&self.output_dir, LOCAL_HOST), deps_out)?;
            }
        }
        Ok(())
    }

    /// Apply the upgrade for `package` on one host.
    pub fn apply(&self, package: &str, host: &str) -> Result<(), UpcheckError> {
        let cmd = match self.mode {
            ExecutorMode::Ansible => {
                info!(package, host, playbook = %self.upgrade_playbook, "Running upgrade playbook");
                self.upgrade_command(package, host)?
            }
            ExecutorMode::Apt => {
                info!(package, "Upgrading locally with apt-get");
                CommandSpec::new("apt-get").arg("install").arg("-y").arg(package)
            }
        };
        self.run_checked(&cmd)?;
        Ok(())
    }

    /// Build the simulation playbook invocation.
    ///
    /// The playbook expects the package under `package_name`; the upgrade
    /// playbook uses `package`. The asymmetry is part of the playbook
    /// contract.
    fn check_command(&self, package: &str) -> Result<CommandSpec, RunnerError> {
        let mut cmd = CommandSpec::new(self.ansible_binary()?)
            .arg(&self.check_playbook)
            .arg("-e")
            .arg(format!("package_name={package}"));
        if let Some(limit) = &self.limit {
            cmd = cmd.arg("--limit").arg(limit);
        }
        if let Some(inventory) = &self.inventory {
            cmd = cmd.arg("-i").arg(inventory);
        }
        Ok(cmd)
    }

    /// Build the upgrade playbook invocation, scoped to one host.
    fn upgrade_command(&self, package: &str, host: &str) -> Result<CommandSpec, RunnerError> {
        let mut cmd = CommandSpec::new(self.ansible_binary()?)
            .arg(&self.upgrade_playbook)
            .arg("-e")
            .arg(format!("package={package}"))
            .arg("--limit")
            .arg(host);
        if let Some(inventory) = &self.inventory {
            cmd = cmd.arg("-i").arg(inventory);
        }
        Ok(cmd)
    }

    fn ansible_binary(&self) -> Result<PathBuf, RunnerError> {
        match &self.binary {
            Some(path) => Ok(PathBuf::from(path)),
            None => which::which("ansible-playbook").map_err(|e| RunnerError::BinaryNotFound {
                reason: format!("ansible-playbook not found in PATH: {e}"),
            }),
        }
    }

    /// Run a command and treat a non-zero exit as an error.
    fn run_checked(&self, cmd: &CommandSpec) -> Result<Vec<u8>, RunnerError> {
        debug!(command = %cmd.display(), "Executing");
        let output = self.runner.run(cmd, self.timeout)?;
        match output.exit_code {
            Some(0) => Ok(output.stdout),
            Some(code) => Err(RunnerError::CommandFailed {
                program: cmd.program.to_string_lossy().into_owned(),
                code,
                stderr: output.stderr_string(),
            }),
            None => Err(RunnerError::Killed {
                program: cmd.program.to_string_lossy().into_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;
    use upcheck_runner::ProcessOutput;

    /// Records every invocation and replays scripted outputs in order.
    struct RecordingRunner {
        calls: Mutex<Vec<Vec<String>>>,
        outputs: Mutex<Vec<ProcessOutput>>,
    }

    impl RecordingRunner {
        fn ok() -> Self {
            Self::with_outputs(vec![])
        }

        fn with_outputs(outputs: Vec<ProcessOutput>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                outputs: Mutex::new(outputs),
            }
        }

        fn argv(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProcessRunner for &RecordingRunner {
        fn run(&self, cmd: &CommandSpec, _timeout: Duration) -> Result<ProcessOutput, RunnerError> {
            let mut argv = vec![cmd.program.to_string_lossy().into_owned()];
            argv.extend(cmd.args.iter().map(|a| a.to_string_lossy().into_owned()));
            self.calls.lock().unwrap().push(argv);

            let mut outputs = self.outputs.lock().unwrap();
            if outputs.is_empty() {
                Ok(ProcessOutput::new(Vec::new(), Vec::new(), Some(0)))
            } else {
                Ok(outputs.remove(0))
            }
        }
    }

    fn ansible_executor<'a>(
        runner: &'a RecordingRunner,
        tmp: &TempDir,
        limit: Option<String>,
        inventory: Option<String>,
    ) -> Executor<&'a RecordingRunner> {
        let mut config = Config::minimal_for_testing();
        config.defaults.output_dir = Some(tmp.path().to_path_buf());
        config.playbooks.binary = Some("ansible-playbook".to_string());
        config.playbooks.inventory = inventory;
        Executor::from_config(&config, runner, limit).unwrap()
    }

    #[test]
    fn simulate_builds_check_playbook_argv() {
        let runner = RecordingRunner::ok();
        let tmp = TempDir::new().unwrap();
        let executor = ansible_executor(&runner, &tmp, None, None);

        executor.simulate("curl").unwrap();

        let calls = runner.argv();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            vec![
                "ansible-playbook",
                "check_and_simulate.yml",
                "-e",
                "package_name=curl",
            ]
        );
    }

    #[test]
    fn simulate_appends_limit_and_inventory() {
        let runner = RecordingRunner::ok();
        let tmp = TempDir::new().unwrap();
        let executor = ansible_executor(
            &runner,
            &tmp,
            Some("web*".to_string()),
            Some("hosts.ini".to_string()),
        );

        executor.simulate("open-vm-tools").unwrap();

        let calls = runner.argv();
        assert_eq!(
            calls[0],
            vec![
                "ansible-playbook",
                "check_and_simulate.yml",
                "-e",
                "package_name=open-vm-tools",
                "--limit",
                "web*",
                "-i",
                "hosts.ini",
            ]
        );
    }

    #[test]
    fn apply_scopes_upgrade_to_host() {
        let runner = RecordingRunner::ok();
        let tmp = TempDir::new().unwrap();
        let executor = ansible_executor(&runner, &tmp, None, None);

        executor.apply("curl", "web01").unwrap();

        let calls = runner.argv();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0],
            vec![
                "ansible-playbook",
                "upgrade_package.yml",
                "-e",
                "package=curl",
                "--limit",
                "web01",
            ]
        );
    }

    #[test]
    fn failed_simulation_is_fatal() {
        let runner = RecordingRunner::with_outputs(vec![ProcessOutput::new(
            Vec::new(),
            b"unreachable host".to_vec(),
            Some(4),
        )]);
        let tmp = TempDir::new().unwrap();
        let executor = ansible_executor(&runner, &tmp, None, None);

        let err = executor.simulate("curl").unwrap_err();
        match err {
            UpcheckError::Runner(RunnerError::CommandFailed { code, stderr, .. }) => {
                assert_eq!(code, 4);
                assert!(stderr.contains("unreachable"));
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn apt_simulate_writes_localhost_outputs() {
        let runner = RecordingRunner::with_outputs(vec![
            ProcessOutput::new(b"Inst curl [7.88]\n".to_vec(), Vec::new(), Some(0)),
            ProcessOutput::new(b"curl\nReverse Depends:\n  git\n".to_vec(), Vec::new(), Some(0)),
        ]);
        let tmp = TempDir::new().unwrap();
        let mut config = Config::minimal_for_testing();
        config.defaults.output_dir = Some(tmp.path().to_path_buf());
        config.executor.mode = Some("apt".to_string());
        let executor = Executor::from_config(&config, &runner, None).unwrap();

        executor.simulate("curl").unwrap();

        let calls = runner.argv();
        assert_eq!(calls[0], vec!["apt-get", "--simulate", "install", "curl"]);
        assert_eq!(calls[1], vec!["apt-cache", "rdepends", "curl"]);

        let sim = fs::read_to_string(simulation_path(tmp.path(), LOCAL_HOST)).unwrap();
        assert_eq!(sim, "Inst curl [7.88]\n");
        let deps = fs::read_to_string(rdepends_path(tmp.path(), LOCAL_HOST)).unwrap();
        assert!(deps.contains("Reverse Depends"));
    }

    #[test]
    fn apt_apply_installs_package() {
        let runner = RecordingRunner::ok();
        let tmp = TempDir::new().unwrap();
        let mut config = Config::minimal_for_testing();
        config.defaults.output_dir = Some(tmp.path().to_path_buf());
        config.executor.mode = Some("apt".to_string());
        let executor = Executor::from_config(&config, &runner, None).unwrap();

        executor.apply("curl", LOCAL_HOST).unwrap();

        let calls = runner.argv();
        assert_eq!(calls[0], vec!["apt-get", "install", "-y", "curl"]);
    }
}
