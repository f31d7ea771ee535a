//! Per-host output file loading
//!
//! The simulation step writes two files per host into the output directory:
//! `simulate_output_<host>.txt` and `rdepends_output_<host>.txt`. Their
//! contents are passed through verbatim; nothing is parsed or trimmed here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use upcheck_utils::error::OutputError;

/// The two text blobs the risk analysis is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOutputs {
    pub simulation: String,
    pub rdepends: String,
}

/// Path to the simulation output file for a host.
#[must_use]
pub fn simulation_path(output_dir: &Path, host: &str) -> PathBuf {
    output_dir.join(format!("simulate_output_{host}.txt"))
}

/// Path to the reverse-dependencies output file for a host.
#[must_use]
pub fn rdepends_path(output_dir: &Path, host: &str) -> PathBuf {
    output_dir.join(format!("rdepends_output_{host}.txt"))
}

/// Load both output files for a host.
///
/// A missing file yields `OutputError::Missing`, which the per-host loop
/// treats as "skip this host" rather than a fatal error. Any other I/O
/// failure is reported as `OutputError::Io`.
pub fn load_outputs(output_dir: &Path, host: &str) -> Result<HostOutputs, OutputError> {
    let simulation = read_host_file(simulation_path(output_dir, host), host)?;
    let rdepends = read_host_file(rdepends_path(output_dir, host), host)?;
    Ok(HostOutputs {
        simulation,
        rdepends,
    })
}

fn read_host_file(path: PathBuf, host: &str) -> Result<String, OutputError> {
    match fs::read_to_string(&path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(OutputError::Missing {
            host: host.to_string(),
            path,
        }),
        Err(e) => Err(OutputError::Io { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_exact_contents() {
        let tmp = TempDir::new().unwrap();
        let sim = "The following packages will be upgraded:\n  curl\n";
        let deps = "curl\nReverse Depends:\n  git\n  wget\n";
        fs::write(simulation_path(tmp.path(), "web01"), sim).unwrap();
        fs::write(rdepends_path(tmp.path(), "web01"), deps).unwrap();

        let outputs = load_outputs(tmp.path(), "web01").unwrap();
        assert_eq!(outputs.simulation, sim);
        assert_eq!(outputs.rdepends, deps);
    }

    #[test]
    fn missing_rdepends_is_distinguishable() {
        let tmp = TempDir::new().unwrap();
        fs::write(simulation_path(tmp.path(), "web01"), "sim").unwrap();

        let err = load_outputs(tmp.path(), "web01").unwrap_err();
        assert!(err.is_missing());
        match err {
            OutputError::Missing { host, path } => {
                assert_eq!(host, "web01");
                assert!(path.to_string_lossy().contains("rdepends_output_web01"));
            }
            other => panic!("expected Missing, got {other:?}"),
        }
    }

    #[test]
    fn missing_simulation_is_distinguishable() {
        let tmp = TempDir::new().unwrap();
        fs::write(rdepends_path(tmp.path(), "web01"), "deps").unwrap();

        let err = load_outputs(tmp.path(), "web01").unwrap_err();
        assert!(err.is_missing());
    }
}
