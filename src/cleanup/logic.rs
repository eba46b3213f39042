//! Cleanup orchestration: delete backups older than a day cutoff,
//! optionally scoped to one database. Deletions sit behind the same
//! confirmation gate as restores.

use chrono::{Duration, Local, NaiveDateTime};

use crate::cli::Target;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::naming::{self, BackupRecord};
use crate::storage::Backend;
use crate::utils::logfile::Logger;
use crate::utils::prompt::Ui;

/// Deletes expired backups from the target (or from local and S3 when the
/// target is `all`) and returns how many artifacts were removed.
pub async fn perform_cleanup(
    config: &AppConfig,
    target: Target,
    maxage_days: i64,
    db_filter: Option<&str>,
    ui: &Ui,
    logger: &Logger,
) -> Result<usize> {
    logger.info("Starting a new backup-cleanup job");

    if maxage_days < 0 {
        return Err(AppError::Config(
            "maxage-days must not be negative".to_string(),
        ));
    }

    let targets = match target {
        Target::All => vec![Target::Local, Target::S3],
        single => vec![single],
    };

    let cutoff = Local::now().naive_local() - Duration::days(maxage_days);
    let mut deleted = 0;

    for single in targets {
        let backend = Backend::for_target(config, single)?;

        ui.say(&format!("Searching {}...", backend.name()));
        let names = backend.list().await?;

        let mut records = Vec::new();
        for name in &names {
            match naming::decode(name, &config.save_format) {
                Ok(record) => records.push(record),
                Err(e) => ui.say_verbose(&format!("Skipping `{}`: {}", name, e)),
            }
        }

        let expired = expired_records(&records, cutoff, db_filter);
        if expired.is_empty() {
            ui.say(&format!(
                "Nothing to delete on {} (cutoff {} days)",
                backend.name(),
                maxage_days
            ));
            continue;
        }

        ui.say_always(&format!(
            "Found {} backup(s) on {} older than {} days.",
            expired.len(),
            backend.name(),
            maxage_days
        ));
        if !ui.confirm(&format!(
            "Delete {} backup(s) from {}?",
            expired.len(),
            backend.name()
        ))? {
            logger.info("User declined the cleanup confirmation");
            return Err(AppError::Cancelled("cleanup declined".to_string()));
        }

        for record in expired {
            backend.delete(&record.file_name).await?;
            logger.success(&format!(
                "Deleting old backup    {} ({})",
                record.file_name,
                backend.name()
            ));
            ui.say_verbose(&format!("Deleted {}", record.file_name));
            deleted += 1;
        }
    }

    logger.success(&format!(
        "Backup-cleanup job finished, {} artifact(s) deleted",
        deleted
    ));
    Ok(deleted)
}

/// Records strictly older than the cutoff, optionally limited to one
/// database (exact match).
fn expired_records(
    records: &[BackupRecord],
    cutoff: NaiveDateTime,
    db_filter: Option<&str>,
) -> Vec<BackupRecord> {
    records
        .iter()
        .filter(|r| db_filter.is_none_or(|db| r.database == db))
        .filter(|r| r.created_at < cutoff)
        .cloned()
        .collect()
}
