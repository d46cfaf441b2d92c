//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use repoflat_core::BatchReport;
use repoflat_core::ProvenanceRecord;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let digits = n.to_string();
        let mut result = String::with_capacity(digits.len() + digits.len() / 3);

        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }

        result
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn header(&self, mark: &str, text: &str, ok: bool) {
        if self.use_colors {
            let mark = if ok {
                style(mark).green().bold()
            } else {
                style(mark).yellow().bold()
            };
            self.line(&format!("{mark} {text}"));
        } else {
            self.line(text);
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_batch_report(&self, report: &BatchReport) -> Result<()> {
        let failed = report.archives_failed();

        // Failures are always shown, even in quiet mode
        if self.quiet && failed == 0 {
            return Ok(());
        }

        let totals = report.totals();
        let archives = report.archives.len();

        if !self.quiet {
            let verb = if totals.dry_run {
                "Dry run complete"
            } else {
                "Unpack complete"
            };
            self.header(
                "✓",
                &format!("{verb}: {} of {archives} archives", archives - failed),
                failed == 0,
            );

            let extracted_label = if totals.dry_run {
                "Files matched"
            } else {
                "Files extracted"
            };
            self.line(&format!(
                "  {extracted_label}:  {}",
                Self::format_number(totals.extracted)
            ));
            self.line(&format!(
                "  Files skipped:    {}",
                Self::format_number(totals.skipped)
            ));
            if totals.failed > 0 {
                self.line(&format!(
                    "  Files failed:     {}",
                    Self::format_number(totals.failed)
                ));
            }
            self.line(&format!(
                "  Total size:       {}",
                Self::format_size(totals.bytes_written)
            ));
            if totals.records > 0 {
                self.line(&format!(
                    "  Provenance rows:  {}",
                    Self::format_number(totals.records)
                ));
            }

            if self.verbose {
                for archive in &report.archives {
                    let summary = archive.summary();
                    let limit = if summary.limit_reached {
                        " (file limit reached)"
                    } else {
                        ""
                    };
                    self.line(&format!(
                        "  {}: {} extracted, {} skipped, {} failed{limit}",
                        archive.archive.display(),
                        summary.extracted,
                        summary.skipped,
                        summary.failed
                    ));
                }
                self.line(&format!("  Duration: {:?}", report.duration));
            }
        }

        if failed > 0 {
            if self.use_colors {
                self.line(&format!("{}", style("Failed archives:").yellow().bold()));
            } else {
                self.line("Failed archives:");
            }
            for archive in &report.archives {
                if let Some(error) = archive.error() {
                    self.line(&format!("  - {}: {error}", archive.archive.display()));
                }
            }
        }

        Ok(())
    }

    fn format_lookup(&self, flat_name: &str, records: &[ProvenanceRecord]) -> Result<()> {
        if records.is_empty() {
            self.header("⚠", &format!("No provenance rows for {flat_name}"), false);
            return Ok(());
        }

        for record in records {
            if self.verbose {
                self.line(&format!(
                    "#{} {} {} {} {}",
                    record.uid,
                    record.repository,
                    record.branch,
                    record.commit_id,
                    record.original_path
                ));
            } else {
                self.line(&format!(
                    "{} {} {} {}",
                    record.repository, record.branch, record.commit_id, record.original_path
                ));
            }
        }

        Ok(())
    }
}
