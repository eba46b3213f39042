//! Immutable runtime configuration.
//!
//! Built exactly once at startup from three layers with a fixed precedence:
//! explicit CLI flag > config file (`pgback.json`) > built-in default.
//! Nothing reads ambient state afterwards; every component receives the
//! value it needs explicitly.

use anyhow::Context;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::GlobalArgs;
use crate::errors::{AppError, Result};
use crate::naming::SEPARATOR;

pub const DEFAULT_SAVE_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
pub const DEFAULT_DATE_FORMAT: &str = "%d/%m/%Y";
pub const DEFAULT_LOGFILE: &str = "pgback.log";
pub const DEFAULT_CONFIG_PATH: &str = "pgback.json";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;

/// Optional config file, all fields optional. Keys mirror the CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub dir: Option<PathBuf>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub peer: Option<bool>,
    pub bucket: Option<String>,
    pub profile: Option<String>,
    pub s3_endpoint_url: Option<String>,
    pub s3_region: Option<String>,
    #[serde(rename = "gpgname")]
    pub gpg_recipient: Option<String>,
    #[serde(rename = "gpgpass")]
    pub gpg_passphrase: Option<String>,
    #[serde(rename = "savefmt")]
    pub save_format: Option<String>,
    #[serde(rename = "datefmt")]
    pub date_format: Option<String>,
    pub logfile: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        let config: FileConfig = serde_json::from_str(&contents).with_context(|| {
            format!("Failed to parse JSON from config file at {}", path.display())
        })?;
        Ok(config)
    }
}

/// How dump/restore authenticate against Postgres. Exactly one variant is
/// active per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbAuth {
    Password {
        user: String,
        password: String,
        host: String,
        port: u16,
    },
    Peer {
        user: String,
        port: u16,
    },
}

/// Encryption mode for the gpg stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encryption {
    /// Encrypt stage is a no-op.
    Disabled,
    /// Asymmetric, for a named keychain identity.
    Recipient(String),
    /// Symmetric, passphrase delivered on gpg's fd 0.
    Passphrase(String),
}

/// Connection settings for the S3 backend.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub workdir: PathBuf,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub peer: bool,
    pub bucket: Option<String>,
    pub profile: Option<String>,
    pub s3_endpoint_url: Option<String>,
    pub s3_region: Option<String>,
    pub encryption: Encryption,
    pub save_format: String,
    pub date_format: String,
    pub logfile: PathBuf,
    pub compress: bool,
    pub tool_timeout: Duration,
}

impl AppConfig {
    /// Merges CLI flags over the config file over the defaults, and runs
    /// the conflict checks that must fail before any stage starts.
    pub fn from_cli(global: &GlobalArgs) -> Result<AppConfig> {
        let file = load_file_config(global)?;
        AppConfig::merge(global, &file)
    }

    fn merge(global: &GlobalArgs, file: &FileConfig) -> Result<AppConfig> {
        let peer = global.peer || file.peer.unwrap_or(false);

        // --peer switches off the network credential path entirely, so an
        // explicit -w or --host alongside it is a contradiction.
        if global.peer && (global.password.is_some() || global.host.is_some()) {
            return Err(AppError::Config(
                "--peer cannot be combined with -w/--password or --host".to_string(),
            ));
        }

        let save_format = global
            .save_format
            .clone()
            .or_else(|| file.save_format.clone())
            .unwrap_or_else(|| DEFAULT_SAVE_FORMAT.to_string());
        if save_format.contains(SEPARATOR) {
            return Err(AppError::Config(format!(
                "--savefmt `{}` contains the reserved separator `{}`",
                save_format, SEPARATOR
            )));
        }

        let encryption = resolve_encryption(
            global.gpg_recipient.as_deref(),
            global.gpg_passphrase.as_deref(),
            file.gpg_recipient.as_deref(),
            file.gpg_passphrase.as_deref(),
        );

        Ok(AppConfig {
            workdir: global
                .dir
                .clone()
                .or_else(|| file.dir.clone())
                .unwrap_or_else(|| PathBuf::from(".")),
            user: global.user.clone().or_else(|| file.user.clone()),
            password: global.password.clone().or_else(|| file.password.clone()),
            host: global.host.clone().or_else(|| file.host.clone()),
            port: global.port.or(file.port).unwrap_or(DEFAULT_PORT),
            peer,
            bucket: global.bucket.clone().or_else(|| file.bucket.clone()),
            profile: global.profile.clone().or_else(|| file.profile.clone()),
            s3_endpoint_url: file.s3_endpoint_url.clone(),
            s3_region: file.s3_region.clone(),
            encryption,
            save_format,
            date_format: global
                .date_format
                .clone()
                .or_else(|| file.date_format.clone())
                .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string()),
            logfile: global
                .logfile
                .clone()
                .or_else(|| file.logfile.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOGFILE)),
            compress: !global.nozip,
            tool_timeout: Duration::from_secs(
                global
                    .timeout_secs
                    .or(file.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    }

    /// Resolves the credential variant for dump/restore stages.
    pub fn db_auth(&self) -> Result<DbAuth> {
        let user = self
            .user
            .clone()
            .ok_or_else(|| AppError::Config("database user is required (-u/--user)".to_string()))?;

        if self.peer {
            return Ok(DbAuth::Peer {
                user,
                port: self.port,
            });
        }

        let password = self.password.clone().ok_or_else(|| {
            AppError::Config("database password is required (-w/--password, or use --peer)".to_string())
        })?;
        let host = self.host.clone().ok_or_else(|| {
            AppError::Config("database host is required (--host, or use --peer)".to_string())
        })?;

        Ok(DbAuth::Password {
            user,
            password,
            host,
            port: self.port,
        })
    }

    /// Settings for the S3 backend; the bucket is the only hard requirement.
    pub fn s3_settings(&self) -> Result<S3Settings> {
        let bucket = self
            .bucket
            .clone()
            .ok_or_else(|| AppError::Config("an S3 bucket is required (--bucket)".to_string()))?;
        Ok(S3Settings {
            bucket,
            profile: self.profile.clone(),
            endpoint_url: self.s3_endpoint_url.clone(),
            region: self.s3_region.clone(),
        })
    }

    /// Parses a --date argument with the configured date format.
    pub fn parse_selection_date(&self, raw: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(raw, &self.date_format).map_err(|_| {
            AppError::Config(format!(
                "--date `{}` does not match the date format `{}`",
                raw, self.date_format
            ))
        })
    }
}

fn load_file_config(global: &GlobalArgs) -> Result<FileConfig> {
    match &global.config {
        Some(path) => FileConfig::load(path),
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                FileConfig::load(default_path)
            } else {
                Ok(FileConfig::default())
            }
        }
    }
}

/// Recipient-based encryption wins over passphrase-based when both are
/// supplied; that is a documented precedence with a warning, not an error.
/// An explicit CLI choice shadows whatever the config file says.
fn resolve_encryption(
    cli_recipient: Option<&str>,
    cli_passphrase: Option<&str>,
    file_recipient: Option<&str>,
    file_passphrase: Option<&str>,
) -> Encryption {
    let (recipient, passphrase) = if cli_recipient.is_some() || cli_passphrase.is_some() {
        (cli_recipient, cli_passphrase)
    } else {
        (file_recipient, file_passphrase)
    };

    match (recipient, passphrase) {
        (Some(r), Some(_)) => {
            println!(
                "Both --gpgname and --gpgpass were supplied, but they can not be used in combination."
            );
            println!("Falling back to --gpgname...");
            Encryption::Recipient(r.to_string())
        }
        (Some(r), None) => Encryption::Recipient(r.to_string()),
        (None, Some(p)) => Encryption::Passphrase(p.to_string()),
        (None, None) => Encryption::Disabled,
    }
}
