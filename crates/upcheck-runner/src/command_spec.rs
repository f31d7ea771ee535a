use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

/// Specification for a command to execute.
///
/// All process execution goes through this type to ensure argv-style
/// invocation: arguments are `Vec<OsString>`, never shell strings, and no
/// shell evaluation (`sh -c`) is involved.
///
/// # Example
///
/// ```rust
/// use upcheck_runner::CommandSpec;
/// use std::ffi::OsString;
///
/// let cmd = CommandSpec::new("ansible-playbook")
///     .arg("check_and_simulate.yml")
///     .arg("-e")
///     .arg("package_name=curl");
///
/// assert_eq!(cmd.program, OsString::from("ansible-playbook"));
/// assert_eq!(cmd.args.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// The program to execute
    pub program: OsString,
    /// Arguments as discrete elements (NOT shell strings)
    pub args: Vec<OsString>,
    /// Optional working directory
    pub cwd: Option<PathBuf>,
    /// Optional environment overrides
    pub env: Option<HashMap<OsString, OsString>>,
}

impl CommandSpec {
    /// Create a new `CommandSpec` with the given program.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: None,
        }
    }

    /// Add a single argument to the command.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments to the command.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory for the command.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set an environment variable for the command.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Convert this `CommandSpec` into a `std::process::Command`.
    ///
    /// The resulting `Command` uses argv-style argument passing, so shell
    /// metacharacters in arguments are never interpreted.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        if let Some(ref env) = self.env {
            for (key, value) in env {
                cmd.env(key, value);
            }
        }

        cmd
    }

    /// Render the command as a display string for logging.
    #[must_use]
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn new_has_no_args() {
        let cmd = CommandSpec::new("ansible-playbook");
        assert_eq!(cmd.program, OsString::from("ansible-playbook"));
        assert!(cmd.args.is_empty());
        assert!(cmd.cwd.is_none());
        assert!(cmd.env.is_none());
    }

    #[test]
    fn builder_chain() {
        let cmd = CommandSpec::new("ansible-playbook")
            .arg("upgrade_package.yml")
            .args(["-e", "package=curl", "--limit", "web01"])
            .cwd("/work")
            .env("ANSIBLE_FORCE_COLOR", "0");

        assert_eq!(cmd.args.len(), 5);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/work")));
        assert_eq!(cmd.env.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn shell_metacharacters_are_preserved() {
        // Arguments must be stored literally, never shell-expanded.
        let cmd = CommandSpec::new("echo")
            .arg("$(whoami)")
            .arg("pkg;rm -rf /")
            .arg("a|b");

        assert_eq!(cmd.args[0], OsString::from("$(whoami)"));
        assert_eq!(cmd.args[1], OsString::from("pkg;rm -rf /"));
        assert_eq!(cmd.args[2], OsString::from("a|b"));
    }

    #[test]
    fn display_joins_program_and_args() {
        let cmd = CommandSpec::new("apt-get")
            .arg("--simulate")
            .arg("install")
            .arg("curl");
        assert_eq!(cmd.display(), "apt-get --simulate install curl");
    }
}
