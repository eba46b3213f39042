//! Picks exactly one backup out of a listing during restore and cleanup.

use chrono::NaiveDate;
use thiserror::Error;

use crate::naming::BackupRecord;

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("no backups found for the requested database")]
    NoBackupsFound,

    #[error("no backup matches the date {0}")]
    NoMatchForDate(NaiveDate),

    #[error("no backup named `{0}`")]
    NoMatchForName(String),

    #[error("multiple backups share the name `{0}`")]
    AmbiguousMatch(String),
}

/// How to choose among candidate backups of one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Maximal `created_at`; the default when neither --name nor --date is given.
    Newest,
    /// Literal filename equality.
    ByName(String),
    /// Calendar-day match, newest within the day.
    ByDate(NaiveDate),
}

/// Selects one record from `records`, which must already be filtered to a
/// single database (exact, case-sensitive name match).
pub fn select(
    records: &[BackupRecord],
    criterion: &Criterion,
) -> Result<BackupRecord, SelectionError> {
    if records.is_empty() {
        return Err(SelectionError::NoBackupsFound);
    }

    match criterion {
        Criterion::Newest => Ok(newest(records).clone()),
        Criterion::ByDate(day) => {
            let same_day: Vec<BackupRecord> = records
                .iter()
                .filter(|r| r.created_at.date() == *day)
                .cloned()
                .collect();
            if same_day.is_empty() {
                return Err(SelectionError::NoMatchForDate(*day));
            }
            Ok(newest(&same_day).clone())
        }
        Criterion::ByName(name) => {
            let mut matches = records.iter().filter(|r| &r.file_name == name);
            let first = matches
                .next()
                .ok_or_else(|| SelectionError::NoMatchForName(name.clone()))?;
            if matches.next().is_some() {
                return Err(SelectionError::AmbiguousMatch(name.clone()));
            }
            Ok(first.clone())
        }
    }
}

/// Maximal `created_at`; ties keep the first-encountered record.
fn newest(records: &[BackupRecord]) -> &BackupRecord {
    let mut best = &records[0];
    for record in &records[1..] {
        if record.created_at > best.created_at {
            best = record;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn record(day: (i32, u32, u32), hms: (u32, u32, u32)) -> BackupRecord {
        let created_at: NaiveDateTime = NaiveDate::from_ymd_opt(day.0, day.1, day.2)
            .unwrap()
            .and_hms_opt(hms.0, hms.1, hms.2)
            .unwrap();
        BackupRecord {
            database: "db".to_string(),
            created_at,
            file_name: format!("db__{}.pgdump", created_at.format("%Y-%m-%d_%H-%M-%S")),
        }
    }

    fn fixture() -> Vec<BackupRecord> {
        vec![
            record((2021, 1, 1), (0, 0, 0)),
            record((2021, 3, 1), (0, 0, 0)),
            record((2020, 12, 31), (0, 0, 0)),
        ]
    }

    #[test]
    fn newest_picks_maximal_created_at() -> anyhow::Result<()> {
        let chosen = select(&fixture(), &Criterion::Newest)?;
        assert_eq!(
            chosen.created_at.date(),
            NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()
        );
        Ok(())
    }

    #[test]
    fn newest_tie_keeps_first_encountered() -> anyhow::Result<()> {
        let mut records = fixture();
        // Duplicate timestamp under a different name.
        let mut twin = records[1].clone();
        twin.file_name = "db__twin.pgdump".to_string();
        records.push(twin);

        let chosen = select(&records, &Criterion::Newest)?;
        assert_eq!(chosen.file_name, records[1].file_name);
        Ok(())
    }

    #[test]
    fn by_date_matches_calendar_day() -> anyhow::Result<()> {
        let day = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let chosen = select(&fixture(), &Criterion::ByDate(day))?;
        assert_eq!(chosen.created_at.date(), day);
        Ok(())
    }

    #[test]
    fn by_date_picks_newest_within_the_day() -> anyhow::Result<()> {
        let records = vec![
            record((2021, 3, 1), (8, 0, 0)),
            record((2021, 3, 1), (22, 15, 0)),
            record((2021, 3, 2), (1, 0, 0)),
        ];
        let day = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let chosen = select(&records, &Criterion::ByDate(day))?;
        assert_eq!(chosen.created_at, records[1].created_at);
        Ok(())
    }

    #[test]
    fn by_date_without_match_fails() {
        let day = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let err = select(&fixture(), &Criterion::ByDate(day)).unwrap_err();
        assert!(matches!(err, SelectionError::NoMatchForDate(d) if d == day));
    }

    #[test]
    fn by_name_matches_literally() -> anyhow::Result<()> {
        let records = fixture();
        let wanted = records[2].file_name.clone();
        let chosen = select(&records, &Criterion::ByName(wanted.clone()))?;
        assert_eq!(chosen.file_name, wanted);
        Ok(())
    }

    #[test]
    fn by_name_without_match_fails() {
        let err = select(&fixture(), &Criterion::ByName("db__nope.pgdump".to_string()))
            .unwrap_err();
        assert!(matches!(err, SelectionError::NoMatchForName(_)));
    }

    #[test]
    fn by_name_with_duplicates_is_ambiguous() {
        let mut records = fixture();
        records.push(records[0].clone());
        let name = records[0].file_name.clone();
        let err = select(&records, &Criterion::ByName(name)).unwrap_err();
        assert!(matches!(err, SelectionError::AmbiguousMatch(_)));
    }

    #[test]
    fn empty_listing_fails_for_every_criterion() {
        for criterion in [
            Criterion::Newest,
            Criterion::ByName("x".to_string()),
            Criterion::ByDate(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()),
        ] {
            let err = select(&[], &criterion).unwrap_err();
            assert!(matches!(err, SelectionError::NoBackupsFound));
        }
    }
}
