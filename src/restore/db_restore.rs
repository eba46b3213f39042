//! The createdb + psql replay stage.

use std::io::{BufRead, stdin};
use std::path::Path;

use crate::config::{AppConfig, DbAuth};
use crate::errors::{AppError, Result};
use crate::utils::logfile::Logger;
use crate::utils::process::{ToolInvocation, find_tool};
use crate::utils::prompt::Ui;

/// Creates `dest_db` and replays `dump_file` into it.
///
/// This is the destructive end of the pipeline, so it sits behind its own
/// confirmation gate. createdb failing on an already-existing database is
/// passed through verbatim as an external tool error.
pub async fn restore_database(
    config: &AppConfig,
    dest_db: &str,
    dump_file: &Path,
    ui: &Ui,
    logger: &Logger,
) -> Result<()> {
    confirm_restore(dest_db, dump_file, ui, &mut stdin().lock(), logger)?;

    let auth = config.db_auth()?;

    create_database(config, dest_db, &auth, ui, logger).await?;
    replay_dump(config, dest_db, dump_file, &auth, ui, logger).await?;

    Ok(())
}

fn confirm_restore(
    dest_db: &str,
    dump_file: &Path,
    ui: &Ui,
    answers: &mut dyn BufRead,
    logger: &Logger,
) -> Result<()> {
    if !ui.confirm_with(
        &format!("Restore to `{}` from `{}`?", dest_db, dump_file.display()),
        answers,
    )? {
        logger.info("User declined the restore confirmation");
        return Err(AppError::Cancelled("restore was not confirmed".to_string()));
    }
    Ok(())
}

async fn create_database(
    config: &AppConfig,
    dest_db: &str,
    auth: &DbAuth,
    ui: &Ui,
    logger: &Logger,
) -> Result<()> {
    let createdb = find_tool("createdb")?;
    let invocation = with_auth(ToolInvocation::new(createdb), auth).arg(dest_db);

    ui.say(&format!("Creating database `{}`...", dest_db));
    ui.say_verbose(&invocation.display_line());
    invocation.run(config.tool_timeout).await.inspect_err(|_| {
        logger.error(&format!("Creating database failed    {}", dest_db));
    })?;

    logger.success(&format!("Creating database    {}", dest_db));
    Ok(())
}

async fn replay_dump(
    config: &AppConfig,
    dest_db: &str,
    dump_file: &Path,
    auth: &DbAuth,
    ui: &Ui,
    logger: &Logger,
) -> Result<()> {
    let psql = find_tool("psql")?;
    let invocation = with_auth(ToolInvocation::new(psql), auth)
        .arg("-X")
        .arg("-q")
        .arg("-v")
        .arg("ON_ERROR_STOP=1")
        .arg("-d")
        .arg(dest_db)
        .arg("-f")
        .arg(dump_file);

    ui.say("Restoring database...");
    ui.say_verbose(&invocation.display_line());
    invocation.run(config.tool_timeout).await.inspect_err(|_| {
        logger.error(&format!(
            "Restoring database failed    {} -> {}",
            dump_file.display(),
            dest_db
        ));
    })?;

    logger.success(&format!(
        "Restoring database    {} -> {}",
        dump_file.display(),
        dest_db
    ));
    ui.say("✓ Restore complete");
    Ok(())
}

/// Credential arguments shared by createdb and psql; the password only
/// ever travels through the environment.
fn with_auth(invocation: ToolInvocation, auth: &DbAuth) -> ToolInvocation {
    match auth {
        DbAuth::Password {
            user,
            password,
            host,
            port,
        } => invocation
            .arg("-h")
            .arg(host)
            .arg("-p")
            .arg(port.to_string())
            .arg("-U")
            .arg(user)
            .env("PGPASSWORD", password),
        DbAuth::Peer { user, port } => invocation
            .arg("-U")
            .arg(user)
            .arg("-p")
            .arg(port.to_string()),
    }
}
