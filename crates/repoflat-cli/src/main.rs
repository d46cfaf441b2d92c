//! Repoflat CLI - Command-line utility for flattening repository snapshot
//! archives and querying their provenance.

mod cli;
mod commands;
mod error;
mod output;

use anyhow::Result;
use clap::CommandFactory;
use clap::FromArgMatches;

fn main() -> Result<()> {
    let matches = cli::Cli::command().get_matches();
    let cli = cli::Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    init_logging(cli.verbose, cli.quiet);

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    match &cli.command {
        cli::Commands::Unpack(args) => {
            let rules = matches
                .subcommand_matches("unpack")
                .map(cli::ordered_rules)
                .unwrap_or_default();
            commands::unpack::execute(args, &rules, &*formatter)
        }
        cli::Commands::Lookup(args) => commands::lookup::execute(args, &*formatter),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    }
}

/// Progress and diagnostics go to stderr; stdout carries results only.
fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}
