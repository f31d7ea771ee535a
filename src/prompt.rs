//! Risk-analysis prompt construction
//!
//! The prompt is a fixed template; the simulation output and reverse
//! dependency listing are substituted verbatim, untruncated. The response
//! is expected to be JSON-shaped but is never parsed, only displayed.

/// Fixed risk-analysis prompt. `{simulation}` and `{rdepends}` are the only
/// substitution points.
pub const RISK_PROMPT_TEMPLATE: &str = r#"
# Task: Linux Package Upgrade Risk Analysis

Analyze the following outputs to evaluate risks in upgrading a package.

## Instructions:
1. Identify the package and version info.
2. List reverse dependencies.
3. Highlight what packages might break.
4. Assign a risk level: LOW, MEDIUM, HIGH.
5. Recommend if we should proceed.

## Format (JSON):
{"package": "...", "current_version": "...", "target_version": "...", "risk_level": "...", "reasoning": "...", "recommendation": "..."}

### Simulated Upgrade Output:
{simulation}

### Reverse Dependencies:
{rdepends}
"#;

/// Build the risk-analysis prompt for one host's outputs.
///
/// The later placeholder is substituted first so a blob that happens to
/// contain placeholder text cannot capture the other substitution.
#[must_use]
pub fn build_risk_prompt(simulation: &str, rdepends: &str) -> String {
    RISK_PROMPT_TEMPLATE
        .replacen("{rdepends}", rdepends, 1)
        .replacen("{simulation}", simulation, 1)
}
