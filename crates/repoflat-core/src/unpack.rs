//! Flattening of a single repository snapshot archive.
//!
//! Every surviving entry `bucket/some/deep/path.ext` is written to
//! `dest_root/bucket/<derive_key("some/deep/path.ext")>`. When a
//! [`Provenance`] sink is attached, one row per written file is appended to
//! the store after the bytes are safely on disk.

use std::fs::File;
use std::fs::create_dir_all;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use log::debug;
use log::error;
use log::info;
use log::warn;

use crate::FlattenError;
use crate::Result;
use crate::UnpackConfig;
use crate::UnpackSummary;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_limit;
use crate::filter::FilterDecision;
use crate::key::FlatName;
use crate::key::split_bucket;
use crate::repo_index::CommitRef;
use crate::repo_index::RepoIndex;
use crate::store::NewProvenanceRecord;
use crate::store::ProvenanceStore;

/// Provenance recording for one archive: the store to append to and the
/// index used to resolve the archive's commit id.
///
/// Bundling both makes "store without commit reference" unrepresentable.
#[derive(Debug)]
pub struct Provenance<'a> {
    /// Store receiving one row per extracted file.
    pub store: &'a mut ProvenanceStore,
    /// Commit id to repository/branch mapping.
    pub index: &'a RepoIndex,
}

/// Returns the commit id encoded in an archive's file name (its stem).
///
/// # Examples
///
/// ```
/// use repoflat_core::unpack::commit_id_from_path;
/// use std::path::Path;
///
/// assert_eq!(commit_id_from_path(Path::new("zip/abc123.zip")), "abc123");
/// ```
#[must_use]
pub fn commit_id_from_path(archive_path: &Path) -> String {
    archive_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Flattens one archive into `dest_root`.
///
/// Entry-level problems (filtered entries, read or write failures, size
/// breaches) are logged and counted in the returned summary. Archive-level
/// problems are returned as errors.
///
/// # Errors
///
/// Returns an error if:
/// - The archive cannot be opened or is not a valid zip (`Io`, `InvalidArchive`)
/// - Provenance is requested and the commit id is not indexed (`UnknownCommit`)
/// - Appending a provenance row fails (`Provenance`)
///
/// # Examples
///
/// ```no_run
/// use repoflat_core::UnpackConfig;
/// use repoflat_core::unpack::unpack_archive;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = unpack_archive(
///     Path::new("zip/abc123.zip"),
///     Path::new("out"),
///     &UnpackConfig::default(),
///     None,
/// )?;
/// println!("extracted {} of {} entries", summary.extracted, summary.attempted);
/// # Ok(())
/// # }
/// ```
pub fn unpack_archive(
    archive_path: &Path,
    dest_root: &Path,
    config: &UnpackConfig,
    provenance: Option<Provenance<'_>>,
) -> Result<UnpackSummary> {
    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| FlattenError::InvalidArchive {
        path: archive_path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let commit_id = commit_id_from_path(archive_path);
    let sink = match provenance {
        Some(Provenance { store, index }) => {
            let commit = index
                .resolve(&commit_id)
                .ok_or(FlattenError::UnknownCommit { commit_id })?;
            Some((store, commit))
        }
        None => None,
    };

    let mut unpacker = ArchiveUnpacker {
        archive_path,
        dest_root,
        config,
        sink,
        buffer: CopyBuffer::new(),
        current_bucket: None,
        summary: UnpackSummary {
            dry_run: !config.extract,
            ..UnpackSummary::default()
        },
    };

    for index in 0..archive.len() {
        if unpacker.summary.extracted >= config.max_files {
            warn!(
                "{}: stopped after {} files (--max-files)",
                archive_path.display(),
                unpacker.summary.extracted
            );
            unpacker.summary.limit_reached = true;
            break;
        }

        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                error!("error: {}: entry #{index}: {e}", archive_path.display());
                unpacker.summary.failed += 1;
                continue;
            }
        };

        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        if entry.is_symlink() {
            info!("skipped symlink: {name:?}");
            unpacker.summary.attempted += 1;
            unpacker.summary.skipped += 1;
            continue;
        }

        let size = entry.size();
        unpacker.process_entry(&name, size, &mut entry)?;
    }

    let summary = unpacker.summary;
    info!(
        "extracted: {}: {} files ({} attempted, {} skipped, {} failed).",
        archive_path.display(),
        summary.extracted,
        summary.attempted,
        summary.skipped,
        summary.failed
    );
    Ok(summary)
}

/// Per-archive state while iterating entries.
struct ArchiveUnpacker<'a> {
    archive_path: &'a Path,
    dest_root: &'a Path,
    config: &'a UnpackConfig,
    sink: Option<(&'a mut ProvenanceStore, CommitRef)>,
    buffer: CopyBuffer,
    current_bucket: Option<String>,
    summary: UnpackSummary,
}

impl ArchiveUnpacker<'_> {
    /// Filters, names, writes and records one file entry.
    ///
    /// Only a provenance failure escapes; everything else is counted.
    fn process_entry<R: Read>(&mut self, name: &str, size: u64, reader: &mut R) -> Result<()> {
        self.summary.attempted += 1;

        match self
            .config
            .filter
            .evaluate(name, size, self.config.max_file_size)
        {
            FilterDecision::Accept => {}
            FilterDecision::Oversized { size, .. } => {
                info!("skipped: {name:?} ({size})");
                self.summary.skipped += 1;
                return Ok(());
            }
            FilterDecision::Excluded => {
                info!("skipped: {name:?} (excluded)");
                self.summary.skipped += 1;
                return Ok(());
            }
            FilterDecision::Hidden | FilterDecision::NotIncluded => {
                debug!("ignored: {name:?}");
                self.summary.skipped += 1;
                return Ok(());
            }
        }

        let Some((bucket, remainder)) = split_bucket(name) else {
            warn!("skipped: {name:?} (not under a top-level directory)");
            self.summary.skipped += 1;
            return Ok(());
        };

        self.enter_bucket(bucket);

        let flat = FlatName::new(bucket, remainder);
        debug!("extract: {remainder:?} -> {flat}");

        if !self.config.extract {
            self.summary.extracted += 1;
            return Ok(());
        }

        let out_path = self.dest_root.join(&flat.bucket).join(&flat.key);
        let written = match write_entry(reader, &out_path, &mut self.buffer, self.config.max_file_size)
        {
            Ok(n) => n,
            Err(e) => {
                error!("error: {}/{name:?}: {e}", self.archive_path.display());
                discard_partial(&out_path);
                self.summary.failed += 1;
                return Ok(());
            }
        };

        if let Some((store, commit)) = self.sink.as_mut() {
            let record = NewProvenanceRecord {
                flat_name: flat.as_flat_name(),
                repository: commit.repository.clone(),
                branch: commit.branch.clone(),
                commit_id: commit.commit_id.clone(),
                original_path: remainder.to_string(),
            };
            if let Err(e) = store.append(&record) {
                discard_partial(&out_path);
                return Err(e);
            }
            self.summary.records += 1;
        }

        self.summary.extracted += 1;
        self.summary.bytes_written += written;
        Ok(())
    }

    /// Creates the bucket directory the first time a bucket is seen in a run
    /// of entries. Creation is idempotent; failures surface on the writes.
    fn enter_bucket(&mut self, bucket: &str) {
        if self.current_bucket.as_deref() == Some(bucket) {
            return;
        }
        self.current_bucket = Some(bucket.to_string());

        if self.config.extract {
            let dir = self.dest_root.join(bucket);
            if let Err(e) = create_dir_all(&dir) {
                error!("error: cannot create {}: {e}", dir.display());
            }
        }
    }
}

/// Streams one entry to `out_path` through the shared buffer.
fn write_entry<R: Read>(
    reader: &mut R,
    out_path: &Path,
    buffer: &mut CopyBuffer,
    limit: u64,
) -> Result<u64> {
    let file = File::create(out_path)?;
    let mut writer = BufWriter::with_capacity(64 * 1024, file);
    let written = copy_with_limit(reader, &mut writer, buffer, limit)?;
    writer.flush()?;
    Ok(written)
}

/// Removes a partially written or unrecorded output file.
fn discard_partial(out_path: &Path) {
    match std::fs::remove_file(out_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("cannot remove partial file {}: {e}", out_path.display()),
    }
}
