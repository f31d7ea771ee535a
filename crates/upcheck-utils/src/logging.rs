//! Logging setup for upcheck.
//!
//! Operator-facing workflow output (reports, prompts) goes to stdout via
//! `println!`; diagnostics go through `tracing` to stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directives when `RUST_LOG` is not set.
///
/// Every workspace crate gets its own directive; a bare `upcheck=` target
/// would only match the root crate and silence diagnostics from the
/// library crates.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "upcheck=debug,upcheck_llm=debug,upcheck_runner=debug,upcheck_config=debug,info"
    } else {
        "upcheck=info,upcheck_llm=info,upcheck_runner=info,upcheck_config=info,warn"
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `--verbose` switches the default
/// filter from info to debug for all upcheck crates.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(false)
                .with_file(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
