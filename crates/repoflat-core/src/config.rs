//! Configuration for unpacking archives.

use crate::filter::EntryFilter;

/// Default per-entry size limit (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Default number of files extracted from one archive before stopping.
pub const DEFAULT_MAX_FILES: usize = 10_000;

/// Settings applied to every archive of a run.
///
/// # Examples
///
/// ```
/// use repoflat_core::UnpackConfig;
/// use repoflat_core::filter::{EntryFilter, FilterRule};
///
/// # fn main() -> Result<(), repoflat_core::FlattenError> {
/// // Dry run over Java sources up to 256 KiB.
/// let config = UnpackConfig {
///     filter: EntryFilter::new().with_rule(FilterRule::include(r"\.java$")?),
///     extract: false,
///     max_file_size: 256 * 1024,
///     ..Default::default()
/// };
/// assert_eq!(config.max_files, 10_000);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct UnpackConfig {
    /// Inclusion/exclusion rules applied to entry paths.
    pub filter: EntryFilter,

    /// Write bytes to disk. `false` is a dry run that only counts entries.
    pub extract: bool,

    /// Maximum size for a single entry in bytes, both declared and streamed.
    pub max_file_size: u64,

    /// Maximum number of files extracted from one archive.
    pub max_files: usize,
}

impl Default for UnpackConfig {
    /// Default values:
    /// - `filter`: no rules (accept all visible entries)
    /// - `extract`: true
    /// - `max_file_size`: 1 MiB
    /// - `max_files`: 10,000
    fn default() -> Self {
        Self {
            filter: EntryFilter::new(),
            extract: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

impl UnpackConfig {
    /// Returns a copy of this configuration with extraction disabled.
    #[must_use]
    pub fn dry_run(mut self) -> Self {
        self.extract = false;
        self
    }
}
