//! filebox CLI
//!
//! Compacts client action batches and applies them to the file index.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} file action reconciler", "filebox".green().bold());
            println!();
            println!("Run {} for available commands.", "filebox --help".cyan());
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout stays machine readable.
fn init_tracing(verbose: bool) {
    let result = if verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    if let Err(e) = result {
        eprintln!("{}: failed to set tracing subscriber: {}", "warning".yellow(), e);
    }
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init {
            path,
            root,
            on_conflict,
            survivors,
            force,
        } => commands::run_init(
            &path,
            root,
            on_conflict.map(Into::into),
            survivors.map(Into::into),
            force,
        ),
        Commands::Compact {
            input,
            survivors,
            stats,
        } => commands::run_compact(&input, survivors.into(), stats),
        Commands::Files { input } => commands::run_files(&input),
        Commands::Apply {
            input,
            owner,
            store,
            on_conflict,
            json,
        } => commands::run_apply(&input, owner, &store, on_conflict.map(Into::into), json),
        Commands::Ls { owner, store, json } => commands::run_ls(owner, &store, json),
        Commands::Hash {
            paths,
            delete,
            client,
        } => commands::run_hash(&paths, delete, client),
        Commands::Register {
            id,
            email,
            password,
        } => commands::run_register(id, &email, &password),
        Commands::ClientKey { id, user } => commands::run_client_key(id, user),
    }
}
