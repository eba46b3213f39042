//! Create orchestration: name → dump → compress → encrypt → upload.

use chrono::Local;

use crate::cli::Target;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::naming;
use crate::storage::Backend;
use crate::utils::logfile::Logger;
use crate::utils::prompt::Ui;

use super::{archive, db_dump, encrypt};

pub async fn perform_create(
    config: &AppConfig,
    target: Target,
    source_db: &str,
    ui: &Ui,
    logger: &Logger,
) -> Result<()> {
    logger.info("Starting a new backup-create job");

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

    // Timestamp truncation happens here: whatever precision the save
    // format keeps is all the backup will ever carry.
    let now = Local::now().naive_local();
    let file_name = naming::encode(source_db, &now, &config.save_format)?;
    let dump_path = config.workdir.join(&file_name);

    let artifact = db_dump::dump_database(config, source_db, &dump_path, ui, logger).await?;
    let artifact = archive::compress_file(config, artifact, ui, logger).await?;
    let artifact = encrypt::encrypt_file(config, artifact, ui, logger).await?;

    let key = artifact
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::Path(format!("artifact has no file name: {}", artifact.display())))?;

    match target {
        Target::Local => {
            ui.say(&format!("Backup stored at {}", artifact.display()));
        }
        Target::S3 => {
            let backend = Backend::for_target(config, Target::S3)?;
            ui.say("Uploading to S3...");
            backend.upload(&artifact, &key).await?;
            logger.success(&format!("Uploading to S3    {} -> {}", artifact.display(), key));
            ui.say("✓ Upload complete");
        }
        Target::Fileserver => {
            let backend = Backend::for_target(config, Target::Fileserver)?;
            backend.upload(&artifact, &key).await?;
        }
        Target::All => {
            let backend = Backend::for_target(config, Target::S3)?;
            ui.say("Uploading to S3...");
            backend.upload(&artifact, &key).await?;
            logger.success(&format!("Uploading to S3    {} -> {}", artifact.display(), key));
            ui.say("✓ Upload complete");
            ui.say("Skipping fileserver upload: the fileserver backend is not implemented.");
            logger.info("Skipped fileserver upload (not implemented)");
        }
    }

    logger.success(&format!("Backup-create job finished for `{}`", source_db));
    Ok(())
}
