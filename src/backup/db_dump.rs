//! The pg_dump stage.

use std::path::{Path, PathBuf};

use crate::config::{AppConfig, DbAuth};
use crate::errors::Result;
use crate::utils::logfile::Logger;
use crate::utils::process::{ToolInvocation, find_tool};
use crate::utils::prompt::Ui;

/// Options handed to pg_dump on every invocation (plain-text format,
/// blobs included, UTF-8 regardless of server encoding).
const DUMP_OPTIONS: [&str; 5] = ["-E", "UTF-8", "-F", "p", "-b"];

/// Dumps `database` to `dest` with pg_dump.
///
/// The credential variant comes from the configuration: password auth puts
/// host/port/user on the command line and the password in `PGPASSWORD`;
/// peer auth runs as the OS-authenticated user and omits host and password
/// entirely.
pub async fn dump_database(
    config: &AppConfig,
    database: &str,
    dest: &Path,
    ui: &Ui,
    logger: &Logger,
) -> Result<PathBuf> {
    let pg_dump = find_tool("pg_dump")?;
    let auth = config.db_auth()?;

    let mut invocation = ToolInvocation::new(pg_dump)
        .args(DUMP_OPTIONS)
        .arg("-f")
        .arg(dest)
        .arg("-d")
        .arg(database);

    let detail = match &auth {
        DbAuth::Password {
            user,
            password,
            host,
            port,
        } => {
            invocation = invocation
                .arg("-h")
                .arg(host)
                .arg("-p")
                .arg(port.to_string())
                .arg("-U")
                .arg(user)
                .env("PGPASSWORD", password);
            format!("{}:[password]@{}:{}/{}  ->  {}", user, host, port, database, dest.display())
        }
        DbAuth::Peer { user, port } => {
            invocation = invocation
                .arg("-U")
                .arg(user)
                .arg("-p")
                .arg(port.to_string());
            format!("{}:[peer]@localhost:{}/{}  ->  {}", user, port, database, dest.display())
        }
    };

    ui.say(&format!("Dumping database `{}`...", database));
    ui.say_verbose(&invocation.display_line());

    invocation.run(config.tool_timeout).await.inspect_err(|_| {
        logger.error(&format!("Dumping database failed    {}", detail));
    })?;

    logger.success(&format!("Dumping database    {}", detail));
    ui.say("✓ Dump complete");
    Ok(dest.to_path_buf())
}
