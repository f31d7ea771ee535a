use std::path::PathBuf;

/// Command-line overrides applied on top of file configuration.
///
/// Only the fields the CLI actually exposes are represented here; `None`
/// means "not given on the command line" and leaves the file or default
/// value in place.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit config file path (skips upward discovery).
    pub config_path: Option<PathBuf>,
    /// Directory for simulate/rdepends output files.
    pub output_dir: Option<PathBuf>,
    /// Inventory file passed to ansible-playbook as `-i`.
    pub inventory: Option<String>,
    /// Executor mode override ("ansible" or "apt").
    pub executor_mode: Option<String>,
    /// LLM provider override ("gemini" or "anthropic").
    pub llm_provider: Option<String>,
    /// Model override for the selected provider.
    pub model: Option<String>,
    /// Command timeout override, in seconds.
    pub command_timeout: Option<u64>,
    /// LLM request timeout override, in seconds.
    pub llm_timeout: Option<u64>,
    /// Skip confirmation prompts.
    pub assume_yes: bool,
    /// Verbose logging override.
    pub verbose: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_leaves_everything_unset() {
        let args = CliArgs::default();
        assert!(args.config_path.is_none());
        assert!(args.output_dir.is_none());
        assert!(args.executor_mode.is_none());
        assert!(!args.assume_yes);
    }
}
