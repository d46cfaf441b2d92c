//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use repoflat_core::ArchiveReport;
use repoflat_core::BatchReport;
use repoflat_core::ProvenanceRecord;
use serde::Serialize;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct ArchiveOutput {
    archive: String,
    attempted: usize,
    extracted: usize,
    skipped: usize,
    failed: usize,
    bytes_written: u64,
    records: usize,
    limit_reached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<&ArchiveReport> for ArchiveOutput {
    fn from(report: &ArchiveReport) -> Self {
        let summary = report.summary();
        Self {
            archive: report.archive.display().to_string(),
            attempted: summary.attempted,
            extracted: summary.extracted,
            skipped: summary.skipped,
            failed: summary.failed,
            bytes_written: summary.bytes_written,
            records: summary.records,
            limit_reached: summary.limit_reached,
            error: report.error().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchOutput {
    archives_processed: usize,
    archives_failed: usize,
    files_extracted: usize,
    files_skipped: usize,
    files_failed: usize,
    bytes_written: u64,
    records: usize,
    dry_run: bool,
    duration_ms: u128,
    archives: Vec<ArchiveOutput>,
}

#[derive(Debug, Serialize)]
struct RecordOutput<'a> {
    uid: i64,
    flat_name: &'a str,
    repository: &'a str,
    branch: &'a str,
    commit_id: &'a str,
    original_path: &'a str,
}

#[derive(Debug, Serialize)]
struct LookupOutput<'a> {
    flat_name: &'a str,
    records: Vec<RecordOutput<'a>>,
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    fn batch_output(report: &BatchReport) -> JsonOutput<BatchOutput> {
        let totals = report.totals();
        let failed = report.archives_failed();

        let data = BatchOutput {
            archives_processed: report.archives.len(),
            archives_failed: failed,
            files_extracted: totals.extracted,
            files_skipped: totals.skipped,
            files_failed: totals.failed,
            bytes_written: totals.bytes_written,
            records: totals.records,
            dry_run: totals.dry_run,
            duration_ms: report.duration.as_millis(),
            archives: report.archives.iter().map(ArchiveOutput::from).collect(),
        };

        if failed == 0 {
            JsonOutput::success("unpack", data)
        } else {
            JsonOutput::partial("unpack", data, format!("{failed} archive(s) failed"))
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_batch_report(&self, report: &BatchReport) -> Result<()> {
        Self::output(&Self::batch_output(report))
    }

    fn format_lookup(&self, flat_name: &str, records: &[ProvenanceRecord]) -> Result<()> {
        let data = LookupOutput {
            flat_name,
            records: records
                .iter()
                .map(|r| RecordOutput {
                    uid: r.uid,
                    flat_name: &r.flat_name,
                    repository: &r.repository,
                    branch: &r.branch,
                    commit_id: &r.commit_id,
                    original_path: &r.original_path,
                })
                .collect(),
        };

        Self::output(&JsonOutput::success("lookup", data))
    }
}
