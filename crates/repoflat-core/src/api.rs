//! High-level public API for flattening archives.

use std::path::Path;

use crate::BatchConfig;
use crate::BatchReport;
use crate::BatchRunner;
use crate::Result;
use crate::UnpackConfig;
use crate::UnpackSummary;
use crate::unpack::unpack_archive;

/// Flattens one archive into `dest_root` without recording provenance.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened or is not a valid zip.
/// Entry-level failures are counted in the summary instead.
///
/// # Examples
///
/// ```no_run
/// use repoflat_core::UnpackConfig;
/// use repoflat_core::flatten_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = flatten_archive("zip/abc123.zip", "flat", &UnpackConfig::default())?;
/// println!("Extracted {} files", summary.extracted);
/// # Ok(())
/// # }
/// ```
pub fn flatten_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    dest_root: Q,
    config: &UnpackConfig,
) -> Result<UnpackSummary> {
    unpack_archive(archive_path.as_ref(), dest_root.as_ref(), config, None)
}

/// Runs a whole batch and closes the provenance store afterwards.
///
/// # Errors
///
/// Returns an error only for configuration problems detected before any
/// archive is processed, or if the final commit of the store fails.
///
/// # Examples
///
/// ```no_run
/// use repoflat_core::BatchConfig;
/// use repoflat_core::run_batch;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BatchConfig::new("flat");
/// let report = run_batch(&["zip/abc123.zip"], config)?;
/// println!("Extracted {} files", report.totals().extracted);
/// # Ok(())
/// # }
/// ```
pub fn run_batch<P: AsRef<Path>>(archives: &[P], config: BatchConfig) -> Result<BatchReport> {
    let mut runner = BatchRunner::new(config)?;
    let report = runner.run(archives);
    runner.finish()?;
    Ok(report)
}
