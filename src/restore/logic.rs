//! Restore orchestration: list → select → confirm → download → decrypt →
//! decompress → replay. The mirror of the create pipeline, stage order
//! reversed.

use crate::cli::Target;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::naming::{self, BackupRecord};
use crate::select::{self, Criterion};
use crate::storage::Backend;
use crate::utils::logfile::Logger;
use crate::utils::prompt::Ui;

use crate::backup::{archive, encrypt};

use super::db_restore;

pub async fn perform_restore(
    config: &AppConfig,
    target: Target,
    source_db_name: &str,
    dest_db: &str,
    criterion: &Criterion,
    ui: &Ui,
    logger: &Logger,
) -> Result<()> {
    logger.info("Starting a new backup-restore job");

    if !config.workdir.is_dir() {
        logger.error(&format!(
            "The path could not be found    `{}`",
            config.workdir.display()
        ));
        return Err(AppError::Path(format!(
            "working directory not found: `{}`",
            config.workdir.display()
        )));
    }

    let backend = Backend::for_target(config, target)?;

    ui.say(&format!("Searching {}...", backend.name()));
    let names = backend.list().await?;
    let records = decode_listing(&names, &config.save_format, source_db_name, ui);

    let chosen = select::select(&records, criterion).inspect_err(|e| {
        logger.error(&format!("Restore failed - {}", e));
    })?;
    logger.success(&format!(
        "Searching {} - found matching file `{}`",
        backend.name(),
        chosen.file_name
    ));

    ui.say_always(&format!("Found matching backup: `{}`", chosen.file_name));
    if !ui.confirm("Would you like to restore it?")? {
        logger.info("User chose not to restore, exiting...");
        return Err(AppError::Cancelled("restore declined".to_string()));
    }

    ui.say(&format!("Downloading from {}...", backend.name()));
    let local_file = backend.download(&chosen.file_name, &config.workdir).await?;
    logger.success(&format!(
        "Downloading    {} -> {}",
        chosen.file_name,
        local_file.display()
    ));

    // Mirror order: decrypt first, then decompress.
    let local_file = encrypt::decrypt_file(config, local_file, ui, logger).await?;
    let local_file = archive::decompress_file(config, local_file, ui, logger).await?;

    db_restore::restore_database(config, dest_db, &local_file, ui, logger).await?;

    logger.success(&format!(
        "Backup-restore job finished    {} -> {}",
        chosen.file_name, dest_db
    ));
    Ok(())
}

/// Decodes a backend listing, keeping only backups of the requested
/// database. Entries that are not valid backup names are skipped, not
/// fatal — a bucket may hold unrelated objects.
fn decode_listing(
    names: &[String],
    save_format: &str,
    source_db_name: &str,
    ui: &Ui,
) -> Vec<BackupRecord> {
    let mut records = Vec::new();
    for name in names {
        match naming::decode(name, save_format) {
            Ok(record) => {
                if record.database == source_db_name {
                    records.push(record);
                }
            }
            Err(e) => ui.say_verbose(&format!("Skipping `{}`: {}", name, e)),
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_ui() -> Ui {
        Ui {
            verbose: false,
            silent: true,
            noconfirm: true,
        }
    }

    const FMT: &str = "%Y-%m-%d_%H-%M-%S";

    #[test]
    fn decode_listing_filters_by_database_and_skips_garbage() {
        let names = vec![
            "mydb__2021-01-01_00-00-00.pgdump".to_string(),
            "mydb__2021-03-01_00-00-00.pgdump.gz".to_string(),
            "otherdb__2021-02-01_00-00-00.pgdump".to_string(),
            "random-object.txt".to_string(),
        ];
        let records = decode_listing(&names, FMT, "mydb", &quiet_ui());
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.database == "mydb"));
    }

    #[test]
    fn database_match_is_case_sensitive() {
        let names = vec!["MyDb__2021-01-01_00-00-00.pgdump".to_string()];
        let records = decode_listing(&names, FMT, "mydb", &quiet_ui());
        assert!(records.is_empty());
    }
}
