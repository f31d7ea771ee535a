//! Process execution for upcheck.
//!
//! All playbook and package-manager invocations go through [`CommandSpec`]
//! to ensure argv-style invocation. This prevents shell injection by passing
//! arguments as discrete elements rather than shell strings.

pub mod command_spec;
pub mod native;
pub mod process;

pub use command_spec::CommandSpec;
pub use native::NativeRunner;
pub use process::{ProcessOutput, ProcessRunner};
pub use upcheck_utils::error::RunnerError;
