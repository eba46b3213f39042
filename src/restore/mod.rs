mod logic;
pub(crate) mod db_restore; // createdb + psql replay

use crate::cli::Target;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::select::Criterion;
use crate::utils::logfile::Logger;
use crate::utils::prompt::Ui;

/// Public entry point for the restore flow.
pub async fn run_restore_flow(
    config: &AppConfig,
    target: Target,
    source_db_name: &str,
    dest_db: &str,
    criterion: &Criterion,
    ui: &Ui,
    logger: &Logger,
) -> Result<()> {
    logic::perform_restore(config, target, source_db_name, dest_db, criterion, ui, logger).await
}
