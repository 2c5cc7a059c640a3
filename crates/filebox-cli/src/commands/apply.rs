//! Commands that touch the file index: apply and ls

use std::path::Path;

use colored::Colorize;
use filebox_core::{ConflictPolicy, ReconcileReport, Reconciler, User};

use super::{read_batch, require_durable, resolve_settings};
use crate::cli::StoreArgs;
use crate::error::Result;

/// Run the apply command
pub fn run_apply(
    input: &Path,
    owner: u64,
    store: &StoreArgs,
    on_conflict: Option<ConflictPolicy>,
    json: bool,
) -> Result<()> {
    let mut settings = resolve_settings(store)?;
    require_durable(&settings)?;
    if let Some(policy) = on_conflict {
        settings.apply.on_conflict = policy;
    }

    let actions = read_batch(input)?;
    let reconciler = Reconciler::from_settings(&settings)?;
    // No credential check: the owner id is trusted as given
    let report = reconciler.reconcile(&actions, &User::new(owner, "", ""))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &ReconcileReport) {
    let applied = &report.applied;
    if applied.is_noop() {
        println!(
            "{} Nothing to apply ({} actions cancelled out).",
            "OK".green().bold(),
            report.compaction.cancelled
        );
        return;
    }

    println!(
        "{} Applied {} of {} actions for owner {}:",
        "OK".green().bold(),
        report.compaction.survivors,
        report.compaction.input,
        applied.owner
    );
    for path in &applied.inserted {
        println!("   {} {}", "+".green(), path);
    }
    for path in &applied.replaced {
        println!("   {} {}", "~".yellow(), path);
    }
    for path in &applied.deleted {
        println!("   {} {}", "-".red(), path);
    }
}

/// Run the ls command
pub fn run_ls(owner: u64, store: &StoreArgs, json: bool) -> Result<()> {
    let settings = resolve_settings(store)?;
    require_durable(&settings)?;
    let table = settings.open_store()?.load(owner)?;

    if json {
        let files: Vec<_> = table.files().collect();
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    if table.is_empty() {
        println!("{}", "No files indexed".dimmed());
        return Ok(());
    }
    for file in table.files() {
        println!(
            "{:>6}  {}  {:>10}  {}",
            file.id.to_string().dimmed(),
            file.hash.chars().take(12).collect::<String>(),
            file.size,
            file.path.cyan()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use filebox_core::{File, FileAction, codec};
    use tempfile::TempDir;

    fn write_batch(dir: &Path, name: &str, batch: &[FileAction]) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, codec::encode_batch(batch).unwrap()).unwrap();
        path
    }

    #[test]
    fn apply_then_ls() {
        let temp = TempDir::new().unwrap();
        let store = StoreArgs {
            config: None,
            root: Some(temp.path().join("index")),
        };
        let batch = write_batch(
            temp.path(),
            "b.jsonl",
            &[FileAction::create(File::new("a.txt", "H1"))],
        );

        run_apply(&batch, 1, &store, None, false).unwrap();
        assert!(temp.path().join("index/1.json").exists());
        assert!(run_ls(1, &store, true).is_ok());
    }

    #[test]
    fn memory_backend_is_refused() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("filebox.json");
        std::fs::write(&config, r#"{"index":{"backend":"memory"}}"#).unwrap();
        let store = StoreArgs {
            config: Some(config),
            root: None,
        };
        let batch = write_batch(temp.path(), "b.jsonl", &[FileAction::create(File::new("a.txt", "H1"))]);

        assert!(matches!(run_apply(&batch, 1, &store, None, false), Err(CliError::User { .. })));
        assert!(matches!(run_ls(1, &store, false), Err(CliError::User { .. })));
    }

    #[test]
    fn conflict_override_allows_recreate() {
        let temp = TempDir::new().unwrap();
        let store = StoreArgs {
            config: None,
            root: Some(temp.path().join("index")),
        };
        let first = write_batch(temp.path(), "1.jsonl", &[FileAction::create(File::new("a.txt", "H1"))]);
        let second = write_batch(temp.path(), "2.jsonl", &[FileAction::create(File::new("a.txt", "H2"))]);

        run_apply(&first, 1, &store, None, false).unwrap();
        assert!(run_apply(&second, 1, &store, None, false).is_err());
        assert!(run_apply(&second, 1, &store, Some(ConflictPolicy::Replace), true).is_ok());
    }
}
