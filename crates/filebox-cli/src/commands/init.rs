//! Init command: write a settings file

use std::path::{Path, PathBuf};

use colored::Colorize;
use filebox_core::{ConflictPolicy, Settings, SurvivorPolicy};
use filebox_fs::NormalizedPath;

use crate::error::{CliError, Result};

/// Run the init command
pub fn run_init(
    path: &Path,
    root: Option<PathBuf>,
    on_conflict: Option<ConflictPolicy>,
    survivors: Option<SurvivorPolicy>,
    force: bool,
) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::user(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let mut settings = Settings::default();
    settings.index.root = root;
    if let Some(policy) = on_conflict {
        settings.apply.on_conflict = policy;
    }
    if let Some(policy) = survivors {
        settings.compact.survivors = policy;
    }

    settings.save(&NormalizedPath::new(path))?;

    println!("{} Wrote {}", "OK".green().bold(), path.display());
    println!(
        "   index root: {}",
        settings.index_root().display().to_string().cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_writes_loadable_settings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("filebox.yaml");

        run_init(
            &path,
            Some(temp.path().join("idx")),
            Some(ConflictPolicy::Replace),
            None,
            false,
        )
        .unwrap();

        let settings = Settings::load(&NormalizedPath::new(&path)).unwrap();
        assert_eq!(settings.index.root, Some(temp.path().join("idx")));
        assert_eq!(settings.apply.on_conflict, ConflictPolicy::Replace);
        assert_eq!(settings.compact.survivors, SurvivorPolicy::TraversalOrder);
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("filebox.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(matches!(
            run_init(&path, None, None, None, false),
            Err(CliError::User { .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");
        assert!(run_init(&path, None, None, None, true).is_ok());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let temp = TempDir::new().unwrap();
        assert!(run_init(&temp.path().join("filebox.ini"), None, None, None, false).is_err());
    }
}
