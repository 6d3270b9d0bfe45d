use clap::Parser;
use std::process::ExitCode;
use verdaccio_publish::cli::{self, Args};

fn main() -> ExitCode {
    cli::run(Args::parse())
}
