use chrono::{SecondsFormat, Utc};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::data::FeedbackSubmission;

const JOURNAL_FILE: &str = "feedback.txt";

/// What happened to one rating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Failed,
    Skipped,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Accepted => "ok",
            Outcome::Failed => "failed",
            Outcome::Skipped => "skipped",
        }
    }
}

/// Append-only `feedback.txt` in the log directory, one line per entry
///
/// Debugging aid only: write errors are logged and swallowed.
#[derive(Debug, Clone)]
pub struct FeedbackJournal {
    path: PathBuf,
}

impl FeedbackJournal {
    pub fn new(log_dir: &Path) -> Self {
        Self {
            path: log_dir.join(JOURNAL_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a submission attempt
    pub fn record(&self, submission: &FeedbackSubmission, outcome: Outcome) {
        self.write_entry(&submission.image_id, &submission.score.value().to_string(), outcome);
    }

    /// Record an image the user moved past without rating
    pub fn record_skip(&self, image_id: &str) {
        self.write_entry(image_id, "", Outcome::Skipped);
    }

    fn write_entry(&self, image_id: &str, score: &str, outcome: Outcome) {
        let line = format!(
            "{}\t{}\t{}\t{}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            image_id,
            score,
            outcome.as_str()
        );

        match self.append_line(&line) {
            Ok(()) => debug!(path = %self.path.display(), "journal entry written"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "could not write feedback journal"),
        }
    }

    fn append_line(&self, line: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{line}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Score;

    fn submission(id: &str, score: u8) -> FeedbackSubmission {
        FeedbackSubmission {
            image_id: id.to_string(),
            score: Score::new(score),
        }
    }

    #[test]
    fn test_appends_one_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let journal = FeedbackJournal::new(&dir.path().join("logs"));

        journal.record(&submission("a", 7), Outcome::Accepted);
        journal.record(&submission("b", 2), Outcome::Failed);
        journal.record_skip("c");

        let contents = fs::read_to_string(journal.path()).unwrap();
        let lines: Vec<Vec<&str>> = contents.lines().map(|l| l.split('\t').collect()).collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0][1..], ["a", "7", "ok"]);
        assert_eq!(lines[1][1..], ["b", "2", "failed"]);
        assert_eq!(lines[2][1..], ["c", "", "skipped"]);
    }

    #[test]
    fn test_existing_entries_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(JOURNAL_FILE), "earlier entry\n").unwrap();

        FeedbackJournal::new(dir.path()).record(&submission("a", 1), Outcome::Accepted);

        let contents = fs::read_to_string(dir.path().join(JOURNAL_FILE)).unwrap();
        assert!(contents.starts_with("earlier entry\n"));
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn test_unwritable_location_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        // Parent is a regular file, so create_dir_all fails; must not panic
        FeedbackJournal::new(&blocker).record_skip("a");
    }
}
