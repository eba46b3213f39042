//! Compress/decompress stages, paired in one module like the dump/restore
//! tools they bracket. Both shell out to gzip, which consumes the input
//! file and leaves the renamed output in its place.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::naming::GZIP_SUFFIX;
use crate::utils::logfile::Logger;
use crate::utils::process::{ToolInvocation, find_tool};
use crate::utils::prompt::Ui;

/// Gzips `file` and returns the `.gz` path. Pass-through when compression
/// is disabled (--nozip).
pub async fn compress_file(
    config: &AppConfig,
    file: PathBuf,
    ui: &Ui,
    logger: &Logger,
) -> Result<PathBuf> {
    if !config.compress {
        return Ok(file);
    }

    let gzip = find_tool("gzip")?;
    let invocation = ToolInvocation::new(gzip)
        .arg("-9")
        .arg("--force")
        .arg(&file);

    ui.say("Gzipping...");
    ui.say_verbose(&invocation.display_line());
    invocation.run(config.tool_timeout).await?;

    let compressed = append_suffix(&file, GZIP_SUFFIX);
    logger.success(&format!("Gzipping    {}", compressed.display()));
    Ok(compressed)
}

/// Gunzips `file` back to its uncompressed path. Pass-through when the
/// file does not carry the `.gz` suffix — a backup that was never
/// compressed must come out of the chain unchanged.
pub async fn decompress_file(
    config: &AppConfig,
    file: PathBuf,
    ui: &Ui,
    logger: &Logger,
) -> Result<PathBuf> {
    let Some(plain) = strip_suffix(&file, GZIP_SUFFIX) else {
        return Ok(file);
    };

    let gunzip = find_tool("gunzip")?;
    let invocation = ToolInvocation::new(gunzip).arg("--force").arg(&file);

    ui.say("Unzipping...");
    ui.say_verbose(&invocation.display_line());
    invocation.run(config.tool_timeout).await?;

    logger.success(&format!("Unzipping    {}", plain.display()));
    Ok(plain)
}

pub(crate) fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

pub(crate) fn strip_suffix(path: &Path, suffix: &str) -> Option<PathBuf> {
    path.to_str()
        .and_then(|s| s.strip_suffix(suffix))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::GlobalArgs;

    fn quiet_ui() -> Ui {
        Ui {
            verbose: false,
            silent: true,
            noconfirm: true,
        }
    }

    fn config(nozip: bool) -> AppConfig {
        let global = GlobalArgs {
            nozip,
            ..GlobalArgs::default()
        };
        crate::config::AppConfig::from_cli(&global).unwrap()
    }

    #[tokio::test]
    async fn compress_is_pass_through_when_disabled() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let logger = Logger::new(dir.path().join("pgback.log"));
        let file = PathBuf::from("/tmp/b/mydb__2021-03-01_00-00-00.pgdump");

        let out = compress_file(&config(true), file.clone(), &quiet_ui(), &logger).await?;
        assert_eq!(out, file);
        Ok(())
    }

    #[tokio::test]
    async fn decompress_is_pass_through_without_gz_suffix() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let logger = Logger::new(dir.path().join("pgback.log"));
        let file = PathBuf::from("/tmp/b/mydb__2021-03-01_00-00-00.pgdump");

        let out = decompress_file(&config(false), file.clone(), &quiet_ui(), &logger).await?;
        assert_eq!(out, file);
        Ok(())
    }

    #[tokio::test]
    async fn disabled_compress_then_decompress_is_a_no_op_chain() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let logger = Logger::new(dir.path().join("pgback.log"));
        let cfg = config(true);
        let file = PathBuf::from("/tmp/b/mydb__2021-03-01_00-00-00.pgdump");

        let mid = compress_file(&cfg, file.clone(), &quiet_ui(), &logger).await?;
        let out = decompress_file(&cfg, mid, &quiet_ui(), &logger).await?;
        assert_eq!(out, file);
        Ok(())
    }

    #[test]
    fn suffix_helpers_round_trip() {
        let path = Path::new("/b/db__2021-01-01_00-00-00.pgdump");
        let gz = append_suffix(path, GZIP_SUFFIX);
        assert_eq!(gz, Path::new("/b/db__2021-01-01_00-00-00.pgdump.gz"));
        assert_eq!(strip_suffix(&gz, GZIP_SUFFIX).as_deref(), Some(path));
        assert_eq!(strip_suffix(path, GZIP_SUFFIX), None);
    }
}
