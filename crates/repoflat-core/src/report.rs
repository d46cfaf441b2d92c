//! Per-archive and per-batch reporting.

use std::path::PathBuf;
use std::time::Duration;

use crate::FlattenError;

/// Counts for one unpacked archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackSummary {
    /// Non-directory entries examined.
    pub attempted: usize,

    /// Entries written to disk (or, in a dry run, that would have been).
    pub extracted: usize,

    /// Entries rejected by the filter or the layout rules.
    pub skipped: usize,

    /// Entries that failed while reading or writing.
    pub failed: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Provenance rows appended.
    pub records: usize,

    /// Processing stopped early because the file limit was reached.
    pub limit_reached: bool,

    /// Extraction was disabled.
    pub dry_run: bool,
}

impl UnpackSummary {
    /// Creates an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// What happened to one archive of a batch.
#[derive(Debug)]
pub enum ArchiveOutcome {
    /// The archive was processed; entry-level failures are in the summary.
    Unpacked(UnpackSummary),
    /// The archive was abandoned before or during processing.
    Failed(FlattenError),
}

/// One archive of a batch and its outcome.
#[derive(Debug)]
pub struct ArchiveReport {
    /// Archive path as given by the caller.
    pub archive: PathBuf,
    /// Result of processing it.
    pub outcome: ArchiveOutcome,
}

impl ArchiveReport {
    /// Returns the archive's summary; failed archives count as zero.
    #[must_use]
    pub fn summary(&self) -> UnpackSummary {
        match &self.outcome {
            ArchiveOutcome::Unpacked(summary) => summary.clone(),
            ArchiveOutcome::Failed(_) => UnpackSummary::default(),
        }
    }

    /// Returns the error for failed archives.
    #[must_use]
    pub fn error(&self) -> Option<&FlattenError> {
        match &self.outcome {
            ArchiveOutcome::Failed(err) => Some(err),
            ArchiveOutcome::Unpacked(_) => None,
        }
    }
}

/// Report of a whole batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One report per input archive, in input order.
    pub archives: Vec<ArchiveReport>,

    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl BatchReport {
    /// Creates an empty batch report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of archives that failed as a whole.
    #[must_use]
    pub fn archives_failed(&self) -> usize {
        self.archives.iter().filter(|a| a.error().is_some()).count()
    }

    /// Sum of all per-archive summaries.
    #[must_use]
    pub fn totals(&self) -> UnpackSummary {
        self.archives
            .iter()
            .map(ArchiveReport::summary)
            .fold(UnpackSummary::default(), |mut acc, s| {
                acc.attempted += s.attempted;
                acc.extracted += s.extracted;
                acc.skipped += s.skipped;
                acc.failed += s.failed;
                acc.bytes_written += s.bytes_written;
                acc.records += s.records;
                acc.limit_reached |= s.limit_reached;
                acc.dry_run |= s.dry_run;
                acc
            })
    }
}
