//! CLI definition for pgback.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "pgback",
    version,
    about = "PostgreSQL logical backups: dump, compress, encrypt, upload — and back again"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Dump a database, run it through the pipeline, and store it
    Create {
        target: Target,
        /// Database to dump
        source_db: String,
    },

    /// Find a stored backup and restore it into a new database
    Restore {
        target: Target,
        /// Database name the backup was created from
        source_db_name: String,
        /// Database to restore into (created by the restore)
        dest_db: String,
        /// Restore the backup with this exact filename
        #[arg(long)]
        name: Option<String>,
        /// Restore the newest backup from this day (see --datefmt)
        #[arg(long, conflicts_with = "name")]
        date: Option<String>,
    },

    /// Delete backups older than a day cutoff
    Cleanup {
        target: Target,
        /// Delete backups older than this many days
        maxage_days: i64,
        /// Only consider backups of this database
        db_name: Option<String>,
    },

    /// Push a local backup to a remote target (not implemented)
    Push { target: Target, db_name: String },

    /// Pull a backup from a remote target (not implemented)
    Pull { target: Target, db_name: String },

    /// List stored backups (not implemented)
    List {
        target: Target,
        db_name: Option<String>,
    },
}

/// Storage target a subcommand routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Local,
    S3,
    Fileserver,
    All,
}

/// Options shared by every subcommand. Each falls back to the config file
/// and then to a built-in default; see `config`.
#[derive(Debug, Args, Default)]
pub struct GlobalArgs {
    /// Database username
    #[arg(short = 'u', long = "user", global = true)]
    pub user: Option<String>,

    /// Database password (not available with --peer)
    #[arg(short = 'w', long = "password", global = true)]
    pub password: Option<String>,

    /// Database host (not available with --peer)
    #[arg(short = 'H', long = "host", global = true)]
    pub host: Option<String>,

    /// Database port
    #[arg(short = 'p', long = "port", global = true)]
    pub port: Option<u16>,

    /// Use peer authentication (run as the OS-authenticated user)
    #[arg(long, global = true)]
    pub peer: bool,

    /// S3 bucket for uploads/downloads
    #[arg(long, global = true)]
    pub bucket: Option<String>,

    /// AWS credentials profile
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// gpg keychain recipient for asymmetric encryption
    #[arg(long = "gpgname", global = true)]
    pub gpg_recipient: Option<String>,

    /// Passphrase for symmetric gpg encryption (mutually exclusive with --gpgname)
    #[arg(long = "gpgpass", global = true)]
    pub gpg_passphrase: Option<String>,

    /// Working directory for backup files
    #[arg(long = "dir", global = true)]
    pub dir: Option<PathBuf>,

    /// Timestamp format for backup filenames
    #[arg(long = "savefmt", global = true)]
    pub save_format: Option<String>,

    /// Date format for the --date argument
    #[arg(long = "datefmt", global = true)]
    pub date_format: Option<String>,

    /// Logfile location (must be writeable)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    /// Config file path (default: ./pgback.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Per-stage timeout for external tools, in seconds
    #[arg(long = "timeout", global = true)]
    pub timeout_secs: Option<u64>,

    /// List ALL backup files with the list command
    #[arg(short = 'a', long = "all", global = true)]
    pub all: bool,

    /// Extra-detailed output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Disable all progress output (does NOT imply -x)
    #[arg(short = 's', long = "silent", global = true)]
    pub silent: bool,

    /// Disable yes/no confirmations for irreversible actions
    #[arg(short = 'x', long = "noconfirm", global = true)]
    pub noconfirm: bool,

    /// Disable gzipping
    #[arg(short = 'z', long = "nozip", global = true)]
    pub nozip: bool,
}
