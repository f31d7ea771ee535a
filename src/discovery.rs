//! Host discovery from simulation output files
//!
//! Hosts are not configured anywhere in upcheck; they are discovered from
//! the `simulate_output_<host>.txt` files the simulation step leaves in the
//! output directory.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use upcheck_utils::UpcheckError;

static SIM_OUTPUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^simulate_output_(.+)\.txt$").unwrap());

/// Scan `output_dir` for simulation output files and extract host names.
///
/// Non-matching file names are ignored, subdirectories are not descended
/// into, and the result is sorted for deterministic iteration order. An
/// unreadable directory is a fatal error.
pub fn discover_hosts(output_dir: &Path) -> Result<Vec<String>, UpcheckError> {
    let entries = fs::read_dir(output_dir)?;

    let mut hosts = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(caps) = SIM_OUTPUT_RE.captures(name) {
            hosts.push(caps[1].to_string());
        }
    }

    hosts.sort();
    debug!(dir = %output_dir.display(), count = hosts.len(), "Discovered hosts");
    Ok(hosts)
}
