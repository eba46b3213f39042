//! Encrypt/decrypt stages, shelling out to gpg.
//!
//! Recipient-based (asymmetric) and passphrase-based (symmetric) modes are
//! resolved by the configuration; when both were supplied the config layer
//! already warned and kept the recipient. Passphrases reach gpg on fd 0,
//! never on the command line.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use crate::config::{AppConfig, Encryption};
use crate::errors::Result;
use crate::naming::GPG_SUFFIX;
use crate::utils::logfile::Logger;
use crate::utils::process::{ToolInvocation, find_tool};
use crate::utils::prompt::Ui;

const ENCRYPT_OPTIONS: [&str; 5] = ["--batch", "--yes", "--quiet", "--no-tty", "--cipher-algo"];
const DECRYPT_OPTIONS: [&str; 3] = ["--batch", "--yes", "--quiet"];
const CIPHER: &str = "AES256";

/// Encrypts `file`, deletes the plaintext, and returns the `.gpg` path.
/// No-op when encryption is disabled.
pub async fn encrypt_file(
    config: &AppConfig,
    file: PathBuf,
    ui: &Ui,
    logger: &Logger,
) -> Result<PathBuf> {
    let gpg = match &config.encryption {
        Encryption::Disabled => return Ok(file),
        _ => find_tool("gpg")?,
    };

    let encrypted = super::archive::append_suffix(&file, GPG_SUFFIX);
    let invocation = match &config.encryption {
        Encryption::Recipient(recipient) => ToolInvocation::new(gpg)
            .args(ENCRYPT_OPTIONS)
            .arg(CIPHER)
            .arg("-o")
            .arg(&encrypted)
            .arg("-r")
            .arg(recipient)
            .arg("-e")
            .arg(&file),
        Encryption::Passphrase(passphrase) => ToolInvocation::new(gpg)
            .args(ENCRYPT_OPTIONS)
            .arg(CIPHER)
            .arg("--pinentry-mode")
            .arg("loopback")
            .arg("--passphrase-fd")
            .arg("0")
            .arg("-o")
            .arg(&encrypted)
            .arg("-c")
            .arg(&file)
            .stdin_payload(format!("{}\n", passphrase).into_bytes()),
        Encryption::Disabled => unreachable!(),
    };

    ui.say("Encrypting...");
    ui.say_verbose(&invocation.display_line());
    invocation.run(config.tool_timeout).await?;

    // The plaintext intermediate must not outlive the encrypted artifact.
    fs::remove_file(&file)
        .with_context(|| format!("Failed to remove plaintext file {}", file.display()))?;

    logger.success(&format!("Encrypting    {}", encrypted.display()));
    Ok(encrypted)
}

/// Decrypts `file` back to its plaintext path and deletes the ciphertext.
/// No-op when the file does not carry the `.gpg` suffix.
pub async fn decrypt_file(
    config: &AppConfig,
    file: PathBuf,
    ui: &Ui,
    logger: &Logger,
) -> Result<PathBuf> {
    let Some(plain) = super::archive::strip_suffix(&file, GPG_SUFFIX) else {
        return Ok(file);
    };

    let gpg = find_tool("gpg")?;
    let mut invocation = ToolInvocation::new(gpg).args(DECRYPT_OPTIONS);
    if let Encryption::Passphrase(passphrase) = &config.encryption {
        invocation = invocation
            .arg("--pinentry-mode")
            .arg("loopback")
            .arg("--passphrase-fd")
            .arg("0")
            .stdin_payload(format!("{}\n", passphrase).into_bytes());
    }
    let invocation = invocation.arg("-o").arg(&plain).arg("-d").arg(&file);

    ui.say("Decrypting...");
    ui.say_verbose(&invocation.display_line());
    invocation.run(config.tool_timeout).await?;

    fs::remove_file(&file)
        .with_context(|| format!("Failed to remove encrypted file {}", file.display()))?;

    logger.success(&format!("Decrypting    {}", plain.display()));
    Ok(plain)
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

    #[tokio::test]
    async fn encrypt_is_a_no_op_when_disabled() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let logger = Logger::new(dir.path().join("pgback.log"));
        let cfg = AppConfig::from_cli(&GlobalArgs::default())?;
        let file = PathBuf::from("/tmp/b/mydb__2021-03-01_00-00-00.pgdump");

        let out = encrypt_file(&cfg, file.clone(), &quiet_ui(), &logger).await?;
        assert_eq!(out, file);
        Ok(())
    }

    #[tokio::test]
    async fn decrypt_is_a_no_op_without_gpg_suffix() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let logger = Logger::new(dir.path().join("pgback.log"));
        let cfg = AppConfig::from_cli(&GlobalArgs::default())?;
        let file = PathBuf::from("/tmp/b/mydb__2021-03-01_00-00-00.pgdump.gz");

        let out = decrypt_file(&cfg, file.clone(), &quiet_ui(), &logger).await?;
        assert_eq!(out, file);
        Ok(())
    }
}
