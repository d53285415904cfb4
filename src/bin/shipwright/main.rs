//! Shipwright CLI - dual-convention builds for TypeScript libraries

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, MessageFormat};
use shipwright::util::diagnostic;
use shipwright::util::Shell;

fn main() {
    let cli = Cli::parse();

    let shell = Arc::new(Shell::from_flags(
        cli.quiet,
        cli.verbose,
        cli.color,
        cli.message_format == MessageFormat::Json,
    ));

    if let Err(e) = run(cli, &shell) {
        if shell.is_json() {
            shell.error(format!("{:#}", e));
        } else if let Some(diag) = diagnostic::from_error(&e) {
            diagnostic::emit(&diag, shell.use_color());
        } else {
            eprintln!("error: {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Arc<Shell>) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("shipwright=debug")
    } else {
        EnvFilter::new("shipwright=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(shell.use_color())
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, shell),
        Commands::Manifest(args) => commands::manifest::execute(args, shell),
        Commands::Files(args) => commands::files::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
