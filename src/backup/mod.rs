mod logic;
pub(crate) mod archive;   // gzip/gunzip stages
pub(crate) mod db_dump;   // pg_dump stage
pub(crate) mod encrypt;   // gpg stages

use crate::cli::Target;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::utils::logfile::Logger;
use crate::utils::prompt::Ui;

/// Public entry point for the create flow.
pub async fn run_create_flow(
    config: &AppConfig,
    target: Target,
    source_db: &str,
    ui: &Ui,
    logger: &Logger,
) -> Result<()> {
    logic::perform_create(config, target, source_db, ui, logger).await
}
