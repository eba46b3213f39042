//! Storage backends: one tagged variant per target, selected once at
//! startup. Each exposes the same capability set: list, upload, download,
//! delete.

pub(crate) mod fileserver;
pub(crate) mod local;
pub(crate) mod s3;

use std::path::{Path, PathBuf};

use crate::cli::Target;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

pub use fileserver::FileServerBackend;
pub use local::LocalBackend;
pub use s3::S3Backend;

#[derive(Debug)]
pub enum Backend {
    Local(LocalBackend),
    S3(S3Backend),
    FileServer(FileServerBackend),
}

impl Backend {
    /// Builds the backend for a single target. `all` is expanded by the
    /// orchestrators, never here.
    pub fn for_target(config: &AppConfig, target: Target) -> Result<Backend> {
        match target {
            Target::Local => Ok(Backend::Local(LocalBackend::new(
                config.workdir.clone(),
                config.save_format.clone(),
            ))),
            Target::S3 => Ok(Backend::S3(S3Backend::new(config.s3_settings()?))),
            Target::Fileserver => Ok(Backend::FileServer(FileServerBackend)),
            Target::All => Err(AppError::Config(
                "this operation requires a single backend, not `all`".to_string(),
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Local(_) => "local",
            Backend::S3(_) => "S3",
            Backend::FileServer(_) => "fileserver",
        }
    }

    /// Filenames of the stored backup artifacts.
    pub async fn list(&self) -> Result<Vec<String>> {
        match self {
            Backend::Local(b) => b.list(),
            Backend::S3(b) => b.list().await,
            Backend::FileServer(b) => b.list(),
        }
    }

    pub async fn upload(&self, file: &Path, key: &str) -> Result<()> {
        match self {
            Backend::Local(b) => b.upload(file, key),
            Backend::S3(b) => b.upload(file, key).await,
            Backend::FileServer(b) => b.upload(file, key),
        }
    }

    /// Fetches `key` into `dest_dir` and returns the local path.
    pub async fn download(&self, key: &str, dest_dir: &Path) -> Result<PathBuf> {
        match self {
            Backend::Local(b) => b.download(key, dest_dir),
            Backend::S3(b) => b.download(key, dest_dir).await,
            Backend::FileServer(b) => b.download(key, dest_dir),
        }
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        match self {
            Backend::Local(b) => b.delete(key),
            Backend::S3(b) => b.delete(key).await,
            Backend::FileServer(b) => b.delete(key),
        }
    }
}
