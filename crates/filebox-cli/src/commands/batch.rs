//! Offline batch commands: compact and files

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use filebox_core::{Compactor, SurvivorPolicy, codec, materialize};

use super::read_batch;
use crate::error::Result;

/// Run the compact command
pub fn run_compact(input: &Path, policy: SurvivorPolicy, stats: bool) -> Result<()> {
    let actions = read_batch(input)?;
    let (simplified, counters) = Compactor::with_policy(policy).compact_with_stats(&actions);

    print!("{}", codec::encode_batch(&simplified)?);
    std::io::stdout().flush()?;

    if stats {
        eprintln!(
            "{} {} actions in, {} survive, {} cancelled",
            "OK".green().bold(),
            counters.input,
            counters.survivors,
            counters.cancelled
        );
    }
    Ok(())
}

/// Run the files command
pub fn run_files(input: &Path) -> Result<()> {
    let actions = read_batch(input)?;
    let simplified = Compactor::new().compact(&actions);

    let mut out = std::io::stdout().lock();
    for file in materialize(&simplified) {
        writeln!(out, "{}", serde_json::to_string(&file)?)?;
    }
    Ok(())
}
