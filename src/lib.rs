//! upcheck - Package upgrade simulation, LLM risk analysis, and confirmed rollout
//!
//! upcheck automates a three-step operational workflow for Linux package
//! upgrades across a fleet of hosts:
//!
//! 1. **Simulate**: run a dry-run upgrade through `ansible-playbook` (or
//!    `apt-get --simulate` locally) that writes per-host output files.
//! 2. **Analyze**: embed each host's simulation output and reverse
//!    dependencies into a fixed risk prompt and send it to a hosted LLM.
//! 3. **Apply**: show the risk report, ask the operator, and on "y" run the
//!    upgrade playbook scoped to that host.
//!
//! # Quick Start
//!
//! ```bash
//! # Full workflow for one package
//! upcheck check curl
//!
//! # Or step by step
//! upcheck simulate curl
//! upcheck hosts
//! upcheck analyze --host web01
//! upcheck apply curl --host web01
//! ```
//!
//! Configuration lives in `.upcheck/config.toml`, discovered upward from
//! the working directory; CLI flags override file values which override
//! built-in defaults.

pub mod cli;
pub mod confirm;
pub mod discovery;
pub mod executor;
pub mod outputs;
pub mod prompt;
pub mod workflow;

pub use upcheck_config::{CliArgs, Config};
pub use upcheck_utils::{ExitCode, UpcheckError};
