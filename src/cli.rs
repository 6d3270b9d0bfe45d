//! Command-line surface.

use crate::auth::CredentialMode;
use crate::error::Error;
use crate::orchestrator::{PublishOptions, Publisher};
use crate::paths::{WorkDir, CONFIG_FILE};
use crate::publish::DEFAULT_TOOL;
use crate::registry::MissingPackagePolicy;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Log in to a private npm registry and publish the package in the current directory.
#[derive(Debug, Parser)]
#[command(name = "verdaccio-publish", version, about)]
pub struct Args {
    /// Project directory (defaults to the current directory).
    #[arg(short = 'C', long)]
    pub dir: Option<PathBuf>,

    /// Registry config file, relative to the project directory.
    #[arg(short, long, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// How to treat an existing .npmrc.
    #[arg(long, value_enum, default_value_t, env = "VERDACCIO_CREDENTIAL_MODE")]
    pub credential_mode: CredentialMode,

    /// How to treat a 404 when checking published versions.
    #[arg(long, value_enum, default_value_t)]
    pub missing_package: MissingPackagePolicy,

    /// Timeout in seconds for the registry version check.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Publish tool to run.
    #[arg(long, default_value = DEFAULT_TOOL)]
    pub tool: String,

    /// Don't open the registry in a browser after publishing.
    #[arg(long)]
    pub no_browser: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Options for the publish run.
    pub fn options(&self) -> PublishOptions {
        PublishOptions {
            config_file: self.config.clone(),
            credential_mode: self.credential_mode,
            missing_package: self.missing_package,
            timeout: Duration::from_secs(self.timeout),
            tool: self.tool.clone(),
            open_browser: !self.no_browser,
        }
    }

    fn log_filter(&self) -> EnvFilter {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    }
}

/// Install the stderr log subscriber. Safe to call more than once.
pub fn init_logging(args: &Args) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(args.log_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Print an error and its hint to stderr.
pub fn report(err: &Error) {
    eprintln!("Error: {err}");
    if let Some(hint) = err.hint() {
        eprintln!("hint: {hint}");
    }
}

/// Run one publish on a single-threaded runtime and map the outcome to an exit code.
pub fn run(args: Args) -> ExitCode {
    init_logging(&args);

    let workdir = match &args.dir {
        Some(dir) => WorkDir::new(dir),
        None => match WorkDir::current() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("Error: failed to get current working directory: {e}");
                return ExitCode::FAILURE;
            }
        },
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let publisher = Publisher::new(workdir, args.options());
    match runtime.block_on(publisher.run()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
