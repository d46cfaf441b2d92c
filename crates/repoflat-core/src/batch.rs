//! Sequential processing of many snapshot archives.
//!
//! The runner owns the two resources shared across archives: the
//! repository index (loaded once, read-only) and the provenance store
//! (opened once, committed after every archive).

use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use log::error;
use log::info;
use log::warn;

use crate::FlattenError;
use crate::Result;
use crate::UnpackConfig;
use crate::report::ArchiveOutcome;
use crate::report::ArchiveReport;
use crate::report::BatchReport;
use crate::repo_index::RepoIndex;
use crate::store::ProvenanceStore;
use crate::unpack::Provenance;
use crate::unpack::unpack_archive;

/// Everything a batch run needs besides the archive list.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Root of the flattened output tree.
    pub dest_root: PathBuf,

    /// Per-archive settings.
    pub unpack: UnpackConfig,

    /// Repository index listing (`repo branch commit` lines).
    pub repo_index: Option<PathBuf>,

    /// SQLite database receiving provenance rows.
    pub provenance_db: Option<PathBuf>,
}

impl BatchConfig {
    /// Creates a configuration writing to `dest_root` without provenance.
    #[must_use]
    pub fn new(dest_root: impl Into<PathBuf>) -> Self {
        Self {
            dest_root: dest_root.into(),
            unpack: UnpackConfig::default(),
            repo_index: None,
            provenance_db: None,
        }
    }

    /// Checks option combinations.
    ///
    /// # Errors
    ///
    /// Returns `Usage` when only one of `repo_index` and `provenance_db` is
    /// set: provenance rows need a commit reference and vice versa.
    pub fn validate(&self) -> Result<()> {
        match (&self.repo_index, &self.provenance_db) {
            (Some(_), None) => Err(FlattenError::Usage(
                "a repository index requires a provenance database".into(),
            )),
            (None, Some(_)) => Err(FlattenError::Usage(
                "a provenance database requires a repository index".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Runs archives one after another, isolating per-archive failures.
///
/// # Examples
///
/// ```no_run
/// use repoflat_core::{BatchConfig, BatchRunner};
///
/// # fn main() -> Result<(), repoflat_core::FlattenError> {
/// let mut config = BatchConfig::new("flat");
/// config.repo_index = Some("repos.lst".into());
/// config.provenance_db = Some("srcmap.db".into());
///
/// let mut runner = BatchRunner::new(config)?;
/// let report = runner.run(["zip/abc123.zip", "zip/def456.zip"]);
/// runner.finish()?;
/// println!("{} archives failed", report.archives_failed());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BatchRunner {
    config: BatchConfig,
    provenance: Option<(ProvenanceStore, RepoIndex)>,
}

impl BatchRunner {
    /// Validates the configuration, loads the repository index and opens
    /// the provenance store.
    ///
    /// # Errors
    ///
    /// All errors here are fatal: invalid option combination, unreadable
    /// index, or a store that cannot be opened or initialised.
    pub fn new(config: BatchConfig) -> Result<Self> {
        config.validate()?;

        let provenance = match (&config.repo_index, &config.provenance_db) {
            (Some(index_path), Some(db_path)) => {
                let index = RepoIndex::load(index_path)?;
                info!(
                    "loaded {} commits from {}",
                    index.len(),
                    index_path.display()
                );
                let store = ProvenanceStore::open(db_path)?;
                Some((store, index))
            }
            _ => None,
        };

        Ok(Self { config, provenance })
    }

    /// Builds a runner from already loaded parts.
    ///
    /// Path fields of `config` for the index and store are ignored.
    pub fn with_provenance(config: BatchConfig, store: ProvenanceStore, index: RepoIndex) -> Self {
        Self {
            config,
            provenance: Some((store, index)),
        }
    }

    /// Returns the provenance store, if one is attached.
    #[must_use]
    pub fn store(&self) -> Option<&ProvenanceStore> {
        self.provenance.as_ref().map(|(store, _)| store)
    }

    /// Processes archives in input order.
    ///
    /// Never fails as a whole; each archive's outcome is in the report.
    pub fn run<I, P>(&mut self, archives: I) -> BatchReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let start = Instant::now();
        let mut report = BatchReport::new();

        for archive in archives {
            report.archives.push(self.unpack_one(archive.as_ref()));
        }

        report.duration = start.elapsed();
        report
    }

    /// Processes a single archive and commits its provenance rows.
    pub fn unpack_one(&mut self, archive: &Path) -> ArchiveReport {
        let provenance = self
            .provenance
            .as_mut()
            .map(|(store, index)| Provenance { store, index });

        let result = unpack_archive(archive, &self.config.dest_root, &self.config.unpack, provenance);

        // Rows only exist for files already on disk, so whatever is pending
        // is kept even when the archive stopped early.
        let result = match self.commit_pending() {
            Ok(()) => result,
            Err(commit_err) => result.and(Err(commit_err)),
        };

        let outcome = match result {
            Ok(summary) => ArchiveOutcome::Unpacked(summary),
            Err(e) => {
                error!("error: {}: {e}", archive.display());
                ArchiveOutcome::Failed(e)
            }
        };

        ArchiveReport {
            archive: archive.to_path_buf(),
            outcome,
        }
    }

    fn commit_pending(&mut self) -> Result<()> {
        let Some((store, _)) = self.provenance.as_mut() else {
            return Ok(());
        };
        if let Err(e) = store.commit() {
            // Leave the connection usable for the next archive.
            if let Err(rollback_err) = store.rollback() {
                warn!("cannot roll back provenance store: {rollback_err}");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Commits and closes the provenance store.
    pub fn finish(self) -> Result<()> {
        match self.provenance {
            Some((store, _)) => store.close(),
            None => Ok(()),
        }
    }
}
