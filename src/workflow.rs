//! Per-host analysis, confirmation, and apply loop
//!
//! Hosts are handled strictly sequentially: load outputs, build the risk
//! prompt, invoke the LLM, show the report, ask the operator, and only
//! then move to the next host. A host with missing output files is
//! skipped with a warning; an LLM failure aborts the run.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use upcheck_llm::{LlmBackend, LlmInvocation, Message};
use upcheck_runner::ProcessRunner;
use upcheck_utils::UpcheckError;

use crate::confirm::confirm_upgrade;
use crate::executor::Executor;
use crate::outputs::load_outputs;
use crate::prompt::build_risk_prompt;

/// Everything the analysis step needs besides the host name.
pub struct AnalysisSession<'a> {
    pub backend: &'a dyn LlmBackend,
    pub output_dir: PathBuf,
    pub llm_timeout: Duration,
}

impl AnalysisSession<'_> {
    /// Analyze one host's outputs and return the raw report text.
    ///
    /// Returns `Ok(None)` when the host's output files are missing; the
    /// caller logs and moves on. Any other failure, including an LLM
    /// error, is fatal.
    pub async fn analyze_host(&self, host: &str) -> Result<Option<String>, UpcheckError> {
        let outputs = match load_outputs(&self.output_dir, host) {
            Ok(outputs) => outputs,
            Err(e) if e.is_missing() => {
                warn!(host, "Missing output files, skipping host");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let prompt = build_risk_prompt(&outputs.simulation, &outputs.rdepends);
        info!(host, "Running LLM risk analysis");

        let invocation = LlmInvocation::new(
            host,
            "", // backend default model
            self.llm_timeout,
            vec![Message::user(prompt)],
        );
        let result = self.backend.invoke(invocation).await?;
        Ok(Some(result.raw_response))
    }
}

/// Run the analyze/confirm/apply loop over `hosts`.
///
/// When `package` is `None` the loop only analyzes (no confirmation, no
/// upgrade). With `assume_yes` the confirmation prompt is bypassed.
pub async fn run_host_loop<R: ProcessRunner>(
    session: &AnalysisSession<'_>,
    executor: &Executor<R>,
    hosts: &[String],
    package: Option<&str>,
    assume_yes: bool,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<(), UpcheckError> {
    for host in hosts {
        writeln!(output, "\n=== Host: {host} ===")?;

        let Some(report) = session.analyze_host(host).await? else {
            writeln!(output, "[!] Missing output files for host {host}. Skipping.")?;
            continue;
        };

        writeln!(output, "\n[+] Risk Report:\n")?;
        writeln!(output, "{report}")?;

        let Some(package) = package else {
            continue;
        };

        let confirmed = assume_yes || confirm_upgrade(host, input, output)?;
        if confirmed {
            writeln!(output, "[+] Running upgrade for host {host}...")?;
            executor.apply(package, host)?;
        } else {
            writeln!(output, "[-] Skipping upgrade on {host}.")?;
        }
    }

    Ok(())
}
