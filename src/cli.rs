//! CLI entry point and dispatch logic
//!
//! `run()` parses arguments, discovers configuration, creates the tokio
//! runtime, dispatches to the command handlers, and handles all error
//! output. main.rs only maps the returned `ExitCode` to a process exit.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use upcheck_config::{CliArgs, Config};
use upcheck_llm::backend_from_config;
use upcheck_runner::NativeRunner;
use upcheck_utils::error::render_report;
use upcheck_utils::logging::init_tracing;
use upcheck_utils::{ExitCode, UpcheckError};

use crate::confirm::confirm_upgrade;
use crate::discovery::discover_hosts;
use crate::executor::Executor;
use crate::workflow::{run_host_loop, AnalysisSession};

/// Simulate package upgrades, assess risk with an LLM, and apply them
/// host by host after operator confirmation.
#[derive(Parser)]
#[command(name = "upcheck", version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a config file (skips .upcheck/config.toml discovery)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the per-host simulation output files
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Inventory file passed to ansible-playbook as -i
    #[arg(long, global = true)]
    inventory: Option<String>,

    /// Host pattern passed to the simulation playbook as --limit
    #[arg(long, global = true)]
    limit: Option<String>,

    /// Executor mode: ansible or apt
    #[arg(long, global = true)]
    executor: Option<String>,

    /// LLM provider: gemini or anthropic
    #[arg(long, global = true)]
    llm_provider: Option<String>,

    /// Model override for the selected LLM provider
    #[arg(long, global = true)]
    model: Option<String>,

    /// Timeout in seconds for playbook/package-manager runs
    #[arg(long, global = true)]
    command_timeout: Option<u64>,

    /// Timeout in seconds for LLM requests
    #[arg(long, global = true)]
    llm_timeout: Option<u64>,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full workflow: simulate, then analyze/confirm/apply per host
    Check {
        /// Package to upgrade
        package: String,
    },
    /// Run the simulation step only
    Simulate {
        /// Package to simulate upgrading
        package: String,
    },
    /// Analyze existing output files without simulating or upgrading
    Analyze {
        /// Analyze a single host instead of all discovered hosts
        #[arg(long)]
        host: Option<String>,
    },
    /// Upgrade one host (asks for confirmation unless --yes)
    Apply {
        /// Package to upgrade
        package: String,
        /// Host to upgrade
        #[arg(long)]
        host: String,
    },
    /// List hosts discovered from simulation output files
    Hosts,
}

/// Main CLI execution function.
///
/// Handles ALL output including errors and returns `Result<(), ExitCode>`;
/// library errors never call `std::process::exit()` themselves.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("✗ Failed to initialize logging: {e}");
        return Err(ExitCode::INTERNAL);
    }

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        output_dir: cli.output_dir.clone(),
        inventory: cli.inventory.clone(),
        executor_mode: cli.executor.clone(),
        llm_provider: cli.llm_provider.clone(),
        model: cli.model.clone(),
        command_timeout: cli.command_timeout,
        llm_timeout: cli.llm_timeout,
        assume_yes: cli.yes,
        verbose: if cli.verbose { Some(true) } else { None },
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            match err.downcast_ref::<upcheck_utils::error::ConfigError>() {
                Some(config_err) => eprintln!("{}", render_report(config_err)),
                None => eprintln!("✗ {err:#}"),
            }
            return Err(ExitCode::CLI_ARGS);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let limit = cli.limit.clone();
    let result = rt.block_on(async {
        match &cli.command {
            Commands::Check { package } => execute_check(package, &config, limit).await,
            Commands::Simulate { package } => execute_simulate(package, &config, limit),
            Commands::Analyze { host } => execute_analyze(host.as_deref(), &config).await,
            Commands::Apply { package, host } => execute_apply(package, host, &config),
            Commands::Hosts => execute_hosts(&config),
        }
    });

    if let Err(error) = result {
        eprintln!("{}", render_report(&error));
        return Err(error.to_exit_code());
    }

    Ok(())
}

/// Simulate, discover hosts, then analyze/confirm/apply each one.
async fn execute_check(
    package: &str,
    config: &Config,
    limit: Option<String>,
) -> Result<(), UpcheckError> {
    let executor = Executor::from_config(config, NativeRunner::new(), limit)?;

    println!("[+] Running simulation for package: {package}");
    executor.simulate(package)?;

    println!("\n[+] Discovering hosts from simulation output...");
    let hosts = discovered_hosts_or_err(config)?;

    let backend = backend_from_config(config)?;
    let session = AnalysisSession {
        backend: backend.as_ref(),
        output_dir: config.output_dir(),
        llm_timeout: config.llm_timeout(),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    run_host_loop(
        &session,
        &executor,
        &hosts,
        Some(package),
        config.assume_yes(),
        &mut input,
        &mut output,
    )
    .await
}

/// Run only the simulation step.
fn execute_simulate(
    package: &str,
    config: &Config,
    limit: Option<String>,
) -> Result<(), UpcheckError> {
    let executor = Executor::from_config(config, NativeRunner::new(), limit)?;
    println!("[+] Running simulation for package: {package}");
    executor.simulate(package)?;
    println!(
        "[+] Simulation complete. Output files are in {}",
        config.output_dir().display()
    );
    Ok(())
}

/// Analyze existing output files; no simulation, no upgrades.
async fn execute_analyze(host: Option<&str>, config: &Config) -> Result<(), UpcheckError> {
    let hosts = match host {
        Some(host) => vec![host.to_string()],
        None => discovered_hosts_or_err(config)?,
    };

    let executor = Executor::from_config(config, NativeRunner::new(), None)?;
    let backend = backend_from_config(config)?;
    let session = AnalysisSession {
        backend: backend.as_ref(),
        output_dir: config.output_dir(),
        llm_timeout: config.llm_timeout(),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    run_host_loop(
        &session,
        &executor,
        &hosts,
        None,
        config.assume_yes(),
        &mut input,
        &mut output,
    )
    .await
}

/// Upgrade a single host after confirmation.
fn execute_apply(package: &str, host: &str, config: &Config) -> Result<(), UpcheckError> {
    let executor = Executor::from_config(config, NativeRunner::new(), None)?;

    let confirmed = if config.assume_yes() {
        true
    } else {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        confirm_upgrade(host, &mut input, &mut output)?
    };

    if confirmed {
        println!("[+] Running upgrade for host {host}...");
        executor.apply(package, host)?;
    } else {
        println!("[-] Skipping upgrade on {host}.");
    }
    Ok(())
}

/// Print discovered hosts, one per line.
fn execute_hosts(config: &Config) -> Result<(), UpcheckError> {
    let hosts = discovered_hosts_or_err(config)?;
    let mut stdout = io::stdout();
    for host in hosts {
        writeln!(stdout, "{host}")?;
    }
    Ok(())
}

fn discovered_hosts_or_err(config: &Config) -> Result<Vec<String>, UpcheckError> {
    let output_dir = config.output_dir();
    let hosts = discover_hosts(&output_dir)?;
    if hosts.is_empty() {
        return Err(UpcheckError::NoHosts {
            dir: output_dir.display().to_string(),
        });
    }
    Ok(hosts)
}
