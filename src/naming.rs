//! Backup filename convention: `<database>__<timestamp>.pgdump[.gz][.gpg]`.
//!
//! The double-underscore separator is the only structure a backup carries;
//! there is no index file. Decoding depends on the separator never appearing
//! in the database name or the timestamp format, so `encode` rejects both.

use chrono::NaiveDateTime;
use std::path::Path;
use thiserror::Error;

/// Separator between database name and timestamp.
pub const SEPARATOR: &str = "__";

/// Suffix appended by the dump stage.
pub const DUMP_SUFFIX: &str = ".pgdump";
/// Suffix appended by the compress stage.
pub const GZIP_SUFFIX: &str = ".gz";
/// Suffix appended by the encrypt stage.
pub const GPG_SUFFIX: &str = ".gpg";

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("backup filename `{0}` has no `__` separator")]
    MissingSeparator(String),

    #[error("backup filename `{name}` has an unparsable timestamp `{stamp}` (format `{format}`)")]
    BadTimestamp {
        name: String,
        stamp: String,
        format: String,
    },
}

/// One backup artifact as reconstructed from its filename.
///
/// Records exist only while a listing is being searched; once a backup is
/// selected, only its `file_name` matters again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub database: String,
    pub created_at: NaiveDateTime,
    pub file_name: String,
}

impl BackupRecord {
    pub fn is_compressed(&self) -> bool {
        self.file_name.trim_end_matches(GPG_SUFFIX).ends_with(GZIP_SUFFIX)
    }

    pub fn is_encrypted(&self) -> bool {
        self.file_name.ends_with(GPG_SUFFIX)
    }
}

/// Builds the filename for a fresh dump: `<database>__<timestamp>.pgdump`.
///
/// Fails when the database name or the timestamp format contains the
/// separator, since such a name could not be decoded back unambiguously.
pub fn encode(
    database: &str,
    timestamp: &NaiveDateTime,
    save_format: &str,
) -> crate::errors::Result<String> {
    if database.is_empty() {
        return Err(crate::errors::AppError::Config(
            "database name must not be empty".to_string(),
        ));
    }
    if database.contains(SEPARATOR) {
        return Err(crate::errors::AppError::Config(format!(
            "database name `{}` contains the reserved separator `{}`",
            database, SEPARATOR
        )));
    }
    if save_format.contains(SEPARATOR) {
        return Err(crate::errors::AppError::Config(format!(
            "--savefmt `{}` contains the reserved separator `{}`",
            save_format, SEPARATOR
        )));
    }

    Ok(format!(
        "{}{}{}{}",
        database,
        SEPARATOR,
        timestamp.format(save_format),
        DUMP_SUFFIX
    ))
}

/// Parses a backup filename back into a [`BackupRecord`].
///
/// Strips at most one `.gpg`, then one `.gz`, then one `.pgdump` (fixed
/// order, each optional), splits at the FIRST separator occurrence, and
/// parses the remainder with `save_format`.
pub fn decode(filename: &str, save_format: &str) -> Result<BackupRecord, DecodeError> {
    // A full path may arrive from a listing; only the base name is encoded.
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    let mut stem = base;
    stem = stem.strip_suffix(GPG_SUFFIX).unwrap_or(stem);
    stem = stem.strip_suffix(GZIP_SUFFIX).unwrap_or(stem);
    stem = stem.strip_suffix(DUMP_SUFFIX).unwrap_or(stem);

    let sep = stem
        .find(SEPARATOR)
        .ok_or_else(|| DecodeError::MissingSeparator(base.to_string()))?;
    let database = &stem[..sep];
    let stamp = &stem[sep + SEPARATOR.len()..];

    let created_at = NaiveDateTime::parse_from_str(stamp, save_format).map_err(|_| {
        DecodeError::BadTimestamp {
            name: base.to_string(),
            stamp: stamp.to_string(),
            format: save_format.to_string(),
        }
    })?;

    Ok(BackupRecord {
        database: database.to_string(),
        created_at,
        file_name: base.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const FMT: &str = "%Y-%m-%d_%H-%M-%S";

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn encode_then_decode_round_trips() -> anyhow::Result<()> {
        let stamp = ts(2021, 3, 1, 14, 30, 59);
        let name = encode("livedb", &stamp, FMT)?;
        assert_eq!(name, "livedb__2021-03-01_14-30-59.pgdump");

        let record = decode(&name, FMT)?;
        assert_eq!(record.database, "livedb");
        assert_eq!(record.created_at, stamp);
        Ok(())
    }

    #[test]
    fn round_trip_truncates_to_format_precision() -> anyhow::Result<()> {
        // A minute-precision format loses the seconds on the way through.
        let fmt = "%Y-%m-%d_%H-%M";
        let stamp = ts(2021, 3, 1, 14, 30, 59);
        let name = encode("livedb", &stamp, fmt)?;
        let record = decode(&name, fmt)?;
        assert_eq!(record.created_at, ts(2021, 3, 1, 14, 30, 0));
        Ok(())
    }

    #[test]
    fn decode_strips_each_optional_suffix() -> anyhow::Result<()> {
        let stamp = ts(2020, 12, 31, 23, 59, 0);
        for name in [
            "db__2020-12-31_23-59-00.pgdump",
            "db__2020-12-31_23-59-00.pgdump.gz",
            "db__2020-12-31_23-59-00.pgdump.gz.gpg",
            "db__2020-12-31_23-59-00.pgdump.gpg",
            "db__2020-12-31_23-59-00",
        ] {
            let record = decode(name, FMT)?;
            assert_eq!(record.database, "db");
            assert_eq!(record.created_at, stamp);
            assert_eq!(record.file_name, name);
        }
        Ok(())
    }

    #[test]
    fn decode_reports_pipeline_state() -> anyhow::Result<()> {
        let record = decode("db__2020-12-31_23-59-00.pgdump.gz.gpg", FMT)?;
        assert!(record.is_compressed());
        assert!(record.is_encrypted());

        let record = decode("db__2020-12-31_23-59-00.pgdump.gpg", FMT)?;
        assert!(!record.is_compressed());
        assert!(record.is_encrypted());

        let record = decode("db__2020-12-31_23-59-00.pgdump", FMT)?;
        assert!(!record.is_compressed());
        assert!(!record.is_encrypted());
        Ok(())
    }

    #[test]
    fn decode_splits_at_first_separator() -> anyhow::Result<()> {
        // A timestamp can never contain `__`, so the first occurrence is
        // always the right split point.
        let record = decode("mydb__2021-03-01_00-00-00.pgdump", FMT)?;
        assert_eq!(record.database, "mydb");
        Ok(())
    }

    #[test]
    fn decode_uses_base_name_of_full_paths() -> anyhow::Result<()> {
        let record = decode("/var/backups/mydb__2021-03-01_00-00-00.pgdump.gz", FMT)?;
        assert_eq!(record.database, "mydb");
        assert_eq!(record.file_name, "mydb__2021-03-01_00-00-00.pgdump.gz");
        Ok(())
    }

    #[test]
    fn decode_fails_without_separator() {
        let err = decode("mydb-2021-03-01.pgdump", FMT).unwrap_err();
        assert!(matches!(err, DecodeError::MissingSeparator(_)));
    }

    #[test]
    fn decode_fails_on_unparsable_timestamp() {
        let err = decode("mydb__not-a-date.pgdump", FMT).unwrap_err();
        assert!(matches!(err, DecodeError::BadTimestamp { .. }));
    }

    #[test]
    fn encode_rejects_separator_in_database_name() {
        let stamp = ts(2021, 1, 1, 0, 0, 0);
        assert!(encode("my__db", &stamp, FMT).is_err());
        assert!(encode("", &stamp, FMT).is_err());
    }

    #[test]
    fn encode_rejects_separator_in_format() {
        let stamp = ts(2021, 1, 1, 0, 0, 0);
        assert!(encode("mydb", &stamp, "%Y__%m").is_err());
    }
}
