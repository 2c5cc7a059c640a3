//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use filebox_core::{ConflictPolicy, SurvivorPolicy};

/// filebox - Reconcile client file actions against the file index
#[derive(Parser, Debug)]
#[command(name = "filebox")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Write a settings file with the given policies
    ///
    /// Examples:
    ///   filebox init                              # ./filebox.toml
    ///   filebox init /etc/filebox.yaml --root /var/lib/filebox
    ///   filebox init --on-conflict replace --survivors most-recent
    Init {
        /// Settings file to create (.toml, .json or .yaml)
        #[arg(default_value = "filebox.toml")]
        path: PathBuf,

        /// Index directory
        #[arg(long)]
        root: Option<PathBuf>,

        /// Conflict policy to record
        #[arg(long, value_enum)]
        on_conflict: Option<ConflictArg>,

        /// Survivor policy to record
        #[arg(long, value_enum)]
        survivors: Option<SurvivorArg>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Reduce a batch of actions to its net effect
    ///
    /// Reads JSON Lines (one action per line) and writes the surviving
    /// actions in the same format.
    ///
    /// Examples:
    ///   filebox compact batch.jsonl
    ///   filebox compact - < batch.jsonl
    ///   filebox compact batch.jsonl --survivors most-recent --stats
    Compact {
        /// Action file, or `-` for stdin
        input: PathBuf,

        /// Which instances survive in unbalanced buckets
        #[arg(long, value_enum, default_value_t = SurvivorArg::Traversal)]
        survivors: SurvivorArg,

        /// Print compaction counters to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Print the file snapshots a batch reduces to
    Files {
        /// Action file, or `-` for stdin
        input: PathBuf,
    },

    /// Compact a batch and apply it to an owner's file index
    ///
    /// The batch is applied in one transaction: if any action is rejected
    /// nothing is written.
    Apply {
        /// Action file, or `-` for stdin
        input: PathBuf,

        /// Owner whose index is updated
        #[arg(short, long, env = "FILEBOX_OWNER")]
        owner: u64,

        #[command(flatten)]
        store: StoreArgs,

        /// Override the configured conflict policy
        #[arg(long, value_enum)]
        on_conflict: Option<ConflictArg>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List an owner's indexed files
    Ls {
        /// Owner whose index is listed
        #[arg(short, long, env = "FILEBOX_OWNER")]
        owner: u64,

        #[command(flatten)]
        store: StoreArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Emit actions for local files, hashed the way clients hash them
    ///
    /// Examples:
    ///   filebox hash notes.txt >> batch.jsonl
    ///   filebox hash --delete notes.txt >> batch.jsonl
    Hash {
        /// Files to snapshot
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Emit deletions instead of creations
        #[arg(long)]
        delete: bool,

        /// Client id recorded on each action
        #[arg(long, default_value_t = 0)]
        client: u64,
    },

    /// Create a user record with a hashed password
    Register {
        /// User id
        #[arg(long)]
        id: u64,

        /// Email address
        #[arg(long)]
        email: String,

        /// Password to hash
        #[arg(long, env = "FILEBOX_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Issue a client record with a fresh session key
    ClientKey {
        /// Client id
        #[arg(long)]
        id: u64,

        /// Owning user id
        #[arg(long)]
        user: u64,
    },
}

/// Where the file index lives
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct StoreArgs {
    /// Settings file (.toml, .json or .yaml)
    #[arg(short, long, env = "FILEBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Index directory, overriding the settings file
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurvivorArg {
    Traversal,
    MostRecent,
}

impl From<SurvivorArg> for SurvivorPolicy {
    fn from(arg: SurvivorArg) -> Self {
        match arg {
            SurvivorArg::Traversal => SurvivorPolicy::TraversalOrder,
            SurvivorArg::MostRecent => SurvivorPolicy::MostRecent,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictArg {
    Reject,
    Replace,
}

impl From<ConflictArg> for ConflictPolicy {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::Reject => ConflictPolicy::Reject,
            ConflictArg::Replace => ConflictPolicy::Replace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_apply_with_overrides() {
        let cli = Cli::try_parse_from([
            "filebox",
            "apply",
            "batch.jsonl",
            "--owner",
            "7",
            "--root",
            "/tmp/idx",
            "--on-conflict",
            "replace",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Apply {
                owner,
                store,
                on_conflict,
                json,
                ..
            }) => {
                assert_eq!(owner, 7);
                assert_eq!(store.root, Some(PathBuf::from("/tmp/idx")));
                assert_eq!(on_conflict, Some(ConflictArg::Replace));
                assert!(!json);
            }
            other => panic!("Expected Apply, got {:?}", other),
        }
    }

    #[test]
    fn parse_compact_defaults_to_traversal() {
        let cli = Cli::try_parse_from(["filebox", "compact", "-"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Compact {
                survivors: SurvivorArg::Traversal,
                stats: false,
                ..
            })
        ));
    }

    #[test]
    fn parse_init_defaults_to_toml() {
        let cli = Cli::try_parse_from(["filebox", "init"]).unwrap();
        match cli.command {
            Some(Commands::Init { path, force, .. }) => {
                assert_eq!(path, PathBuf::from("filebox.toml"));
                assert!(!force);
            }
            other => panic!("Expected Init, got {:?}", other),
        }
    }

    #[test]
    fn hash_requires_a_path() {
        assert!(Cli::try_parse_from(["filebox", "hash"]).is_err());
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["filebox", "files", "b.jsonl", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
