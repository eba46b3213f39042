//! SSH fileserver backend. Recognized as a target but every capability is
//! unimplemented; selecting it fails cleanly instead of half-working.

use std::path::{Path, PathBuf};

use crate::errors::{AppError, Result};

#[derive(Debug)]
pub struct FileServerBackend;

impl FileServerBackend {
    pub fn list(&self) -> Result<Vec<String>> {
        Err(not_implemented())
    }

    pub fn upload(&self, _file: &Path, _key: &str) -> Result<()> {
        Err(not_implemented())
    }

    pub fn download(&self, _key: &str, _dest_dir: &Path) -> Result<PathBuf> {
        Err(not_implemented())
    }

    pub fn delete(&self, _key: &str) -> Result<()> {
        Err(not_implemented())
    }
}

fn not_implemented() -> AppError {
    AppError::NotImplemented("the fileserver backend".to_string())
}
