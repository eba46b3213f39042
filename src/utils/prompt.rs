//! Console output gates and the yes/no confirmation for destructive steps.

use anyhow::{Context, Result};
use std::io::{BufRead, Write, stdin, stdout};

#[derive(Debug, Clone, Copy)]
pub struct Ui {
    pub verbose: bool,
    pub silent: bool,
    pub noconfirm: bool,
}

impl Ui {
    /// Progress output; suppressed under --silent.
    pub fn say(&self, message: &str) {
        if !self.silent {
            println!("{}", message);
        }
    }

    /// Output the user must see even under --silent, e.g. which backup a
    /// restore is about to touch.
    pub fn say_always(&self, message: &str) {
        println!("{}", message);
    }

    /// Extra detail; only under --verbose (and never under --silent).
    pub fn say_verbose(&self, message: &str) {
        if self.verbose && !self.silent {
            println!("{}", message);
        }
    }

    /// Yes/no gate before an irreversible action (restore, deletion).
    ///
    /// --noconfirm answers yes without prompting. --silent does NOT skip
    /// the prompt: it suppresses output, not the safety gate, so the
    /// question is printed regardless.
    pub fn confirm(&self, question: &str) -> Result<bool> {
        self.confirm_with(question, &mut stdin().lock())
    }

    /// `confirm` with the answer source split out. Anything but a plain
    /// `y`/`Y` (EOF included) counts as no.
    pub(crate) fn confirm_with(&self, question: &str, input: &mut dyn BufRead) -> Result<bool> {
        if self.noconfirm {
            return Ok(true);
        }

        print!("{} [y/N]: ", question);
        stdout().flush().context("Failed to flush stdout")?;

        let mut answer = String::new();
        input
            .read_line(&mut answer)
            .context("Failed to read confirmation input")?;

        Ok(answer.trim().eq_ignore_ascii_case("y"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompting_ui() -> Ui {
        Ui {
            verbose: false,
            silent: true,
            noconfirm: false,
        }
    }

    #[test]
    fn noconfirm_answers_yes_without_reading_stdin() -> anyhow::Result<()> {
        let ui = Ui {
            verbose: false,
            silent: true,
            noconfirm: true,
        };
        let mut input: &[u8] = b"n\n";
        assert!(ui.confirm_with("Restore to `newdb`?", &mut input)?);
        Ok(())
    }

    #[test]
    fn only_y_counts_as_yes() -> anyhow::Result<()> {
        let ui = prompting_ui();
        for answer in ["y\n", "Y\n", "  y  \n"] {
            let mut input = answer.as_bytes();
            assert!(ui.confirm_with("Delete?", &mut input)?, "{:?}", answer);
        }
        for answer in ["n\n", "N\n", "yes\n", "\n", ""] {
            let mut input = answer.as_bytes();
            assert!(!ui.confirm_with("Delete?", &mut input)?, "{:?}", answer);
        }
        Ok(())
    }
}
