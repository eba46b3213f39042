//! Append-only job log, one `<timestamp>  <LEVEL>: <message>` line per event.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Timestamp format used for log lines.
const LINE_STAMP: &str = "%Y/%m/%d %I:%M:%S%p";

#[derive(Debug, Clone)]
pub struct Logger {
    path: PathBuf,
}

impl Logger {
    pub fn new(path: PathBuf) -> Self {
        Logger { path }
    }

    pub fn info(&self, message: &str) {
        self.write_line("INFO", message);
    }

    pub fn success(&self, message: &str) {
        self.write_line("SUCCESS", message);
    }

    pub fn error(&self, message: &str) {
        self.write_line("ERROR", message);
    }

    /// Opens, appends, and closes per line; no handle is held across
    /// stages. A log write failure must never abort a running backup, so
    /// it degrades to a stderr warning.
    fn write_line(&self, level: &str, message: &str) {
        let stamp = Local::now().format(LINE_STAMP);
        let line = format!("{}  {}: {}\n", stamp, level, message);

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = result {
            eprintln!(
                "Warning: could not write to logfile {}: {}",
                self.path.display(),
                e
            );
        }
    }
}
