mod cli;
mod cmd;
mod error;
mod io;
mod relations;
mod store;

use std::io::IsTerminal as _;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, OutputFormat, PathOrStdin};
use crate::error::CliError;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level());

    if let Err(e) = run(&cli) {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}

/// Installs a stderr subscriber. `RUST_LOG`, when set, overrides `default`.
/// Colors are only used when stderr is a terminal and `NO_COLOR` is unset.
fn init_tracing(default: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let ansi = std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(ansi)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let file = match &cli.command {
        Command::Trees { file, .. }
        | Command::Tree { file, .. }
        | Command::Roots { file, .. }
        | Command::Rebuild { file } => file,
    };
    let source = file.label();
    let book = cmd::open_book(file, cli.max_file_size, cli.cache_dir.as_deref())?;

    match &cli.command {
        Command::Trees { roots, .. } => cmd::trees::run(&book, &source, roots, cli.format),
        Command::Tree { root, .. } => cmd::tree::run(&book, &source, root, cli.format),
        Command::Roots { node, .. } => {
            cmd::roots::run(&book, &source, node.as_deref(), cli.format)
        }
        Command::Rebuild { .. } => cmd::rebuild::run(&book, &source, cli.format),
    }
}
