//! Local filesystem backend: the working directory is the store.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, Result};
use crate::naming;

#[derive(Debug)]
pub struct LocalBackend {
    root: PathBuf,
    save_format: String,
}

impl LocalBackend {
    pub fn new(root: PathBuf, save_format: String) -> Self {
        LocalBackend { root, save_format }
    }

    /// Directory entries whose names decode under the configured save
    /// format. Anything else in the directory is not a backup artifact.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read backup directory {}", self.root.display()))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry
                .with_context(|| format!("Failed to read entry in {}", self.root.display()))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if naming::decode(&name, &self.save_format).is_ok() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// The create pipeline already writes into the working directory, so
    /// uploading to the same place is a no-op; any other root is a copy.
    pub fn upload(&self, file: &Path, key: &str) -> Result<()> {
        let dest = self.root.join(key);
        if same_file(file, &dest) {
            return Ok(());
        }
        fs::copy(file, &dest).with_context(|| {
            format!("Failed to copy {} to {}", file.display(), dest.display())
        })?;
        Ok(())
    }

    /// Always hands out a working copy: the stored artifact belongs to the
    /// backend, and the restore pipeline consumes its input stage by stage
    /// (gunzip and gpg both delete the file they transform). When the
    /// working directory IS the store, the copy goes into a `restore/`
    /// subdirectory under the same name, which keeps the suffix chain
    /// intact and stays invisible to `list` (files only).
    pub fn download(&self, key: &str, dest_dir: &Path) -> Result<PathBuf> {
        let src = self.root.join(key);
        if !src.is_file() {
            return Err(AppError::Storage(format!(
                "backup file not found: {}",
                src.display()
            )));
        }
        let mut dest = dest_dir.join(key);
        if same_file(&src, &dest) {
            let work_dir = dest_dir.join("restore");
            fs::create_dir_all(&work_dir).with_context(|| {
                format!("Failed to create working directory {}", work_dir.display())
            })?;
            dest = work_dir.join(key);
        }
        fs::copy(&src, &dest).with_context(|| {
            format!("Failed to copy {} to {}", src.display(), dest.display())
        })?;
        Ok(dest)
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        let path = self.root.join(key);
        fs::remove_file(&path)
            .with_context(|| format!("Failed to delete {}", path.display()))?;
        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    let canon_a = a.canonicalize().unwrap_or_else(|_| a.to_path_buf());
    let canon_b = b.canonicalize().unwrap_or_else(|_| b.to_path_buf());
    canon_a == canon_b
}
