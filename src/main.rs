//! pgback — PostgreSQL logical backup orchestrator.
//!
//! Dump, compress, encrypt, and store backups; search, fetch, decrypt,
//! decompress, and restore them. Every heavy operation is a shell-out to
//! the standard tooling (pg_dump, psql, createdb, gzip, gpg) or an S3 API
//! call; the backup filename is the only structured state.

mod backup;
mod cleanup;
mod cli;
mod config;
mod errors;
mod naming;
mod restore;
mod select;
mod storage;
mod utils;

use clap::Parser;
use std::process::ExitCode;

use cli::{Cli, Commands};
use config::AppConfig;
use errors::{AppError, Result};
use select::Criterion;
use utils::logfile::Logger;
use utils::prompt::Ui;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run_app(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app(cli: Cli) -> Result<()> {
    let config = AppConfig::from_cli(&cli.global)?;
    let ui = Ui {
        verbose: cli.global.verbose,
        silent: cli.global.silent,
        noconfirm: cli.global.noconfirm,
    };
    let logger = Logger::new(config.logfile.clone());

    let result = dispatch(&cli.command, &config, &ui, &logger).await;
    if let Err(e) = &result {
        logger.error(&format!("{:#}", e));
    }
    result
}

async fn dispatch(command: &Commands, config: &AppConfig, ui: &Ui, logger: &Logger) -> Result<()> {
    match command {
        Commands::Create { target, source_db } => {
            backup::run_create_flow(config, *target, source_db, ui, logger).await
        }
        Commands::Restore {
            target,
            source_db_name,
            dest_db,
            name,
            date,
        } => {
            let criterion = build_criterion(config, name.as_deref(), date.as_deref())?;
            restore::run_restore_flow(
                config,
                *target,
                source_db_name,
                dest_db,
                &criterion,
                ui,
                logger,
            )
            .await
        }
        Commands::Cleanup {
            target,
            maxage_days,
            db_name,
        } => {
            let deleted =
                cleanup::run_cleanup_flow(config, *target, *maxage_days, db_name.as_deref(), ui, logger)
                    .await?;
            ui.say_always(&format!("Deleted {} backup artifact(s).", deleted));
            Ok(())
        }
        Commands::Push { .. } => Err(AppError::NotImplemented("the push command".to_string())),
        Commands::Pull { .. } => Err(AppError::NotImplemented("the pull command".to_string())),
        Commands::List { .. } => Err(AppError::NotImplemented("the list command".to_string())),
    }
}

/// --name and --date are mutually exclusive at the parser level; with
/// neither, the newest backup wins.
fn build_criterion(
    config: &AppConfig,
    name: Option<&str>,
    date: Option<&str>,
) -> Result<Criterion> {
    match (name, date) {
        (Some(n), _) => Ok(Criterion::ByName(n.to_string())),
        (None, Some(d)) => Ok(Criterion::ByDate(config.parse_selection_date(d)?)),
        (None, None) => Ok(Criterion::Newest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use cli::GlobalArgs;

    #[test]
    fn criterion_defaults_to_newest() -> anyhow::Result<()> {
        let config = AppConfig::from_cli(&GlobalArgs::default())?;
        assert_eq!(build_criterion(&config, None, None)?, Criterion::Newest);
        Ok(())
    }

    #[test]
    fn criterion_parses_date_with_configured_format() -> anyhow::Result<()> {
        let config = AppConfig::from_cli(&GlobalArgs::default())?;
        assert_eq!(
            build_criterion(&config, None, Some("01/03/2021"))?,
            Criterion::ByDate(NaiveDate::from_ymd_opt(2021, 3, 1).unwrap())
        );
        assert!(build_criterion(&config, None, Some("2021-03-01")).is_err());
        Ok(())
    }

    #[test]
    fn criterion_prefers_literal_name() -> anyhow::Result<()> {
        let config = AppConfig::from_cli(&GlobalArgs::default())?;
        assert_eq!(
            build_criterion(&config, Some("db__2021-03-01_00-00-00.pgdump"), None)?,
            Criterion::ByName("db__2021-03-01_00-00-00.pgdump".to_string())
        );
        Ok(())
    }
}
