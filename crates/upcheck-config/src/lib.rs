//! Configuration management for upcheck
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > file > defaults. Supports TOML configuration files with
//! `[defaults]`, `[playbooks]`, `[executor]`, and `[llm]` sections,
//! discovered by searching upward from the working directory for
//! `.upcheck/config.toml`.

mod cli_args;
mod discovery;
mod model;
mod validation;

pub use cli_args::CliArgs;
pub use model::*;
