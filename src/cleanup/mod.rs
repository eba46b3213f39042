mod logic;

use crate::cli::Target;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::utils::logfile::Logger;
use crate::utils::prompt::Ui;

/// Public entry point for the cleanup flow. Returns the number of deleted
/// artifacts.
pub async fn run_cleanup_flow(
    config: &AppConfig,
    target: Target,
    maxage_days: i64,
    db_filter: Option<&str>,
    ui: &Ui,
    logger: &Logger,
) -> Result<usize> {
    logic::perform_cleanup(config, target, maxage_days, db_filter, ui, logger).await
}
