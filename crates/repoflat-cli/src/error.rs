//! Error conversion utilities for CLI.
//!
//! Converts repoflat-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use repoflat_core::FlattenError;

/// Converts `FlattenError` to user-friendly anyhow error with context
pub fn convert_flatten_error(err: FlattenError) -> anyhow::Error {
    match err {
        FlattenError::Usage(message) => {
            anyhow!(
                "Invalid arguments: {message}\n\
                 HINT: Pass --repo-index and --srcmap together, or neither."
            )
        }
        FlattenError::InvalidPattern(source) => {
            anyhow!(
                "Invalid filter pattern: {source}\n\
                 HINT: Patterns are regular expressions; escape literal dots as '\\.'."
            )
        }
        FlattenError::Provenance(source) => {
            anyhow!(
                "Provenance database error: {source}\n\
                 HINT: Check that the --srcmap path is writable and not locked by another process."
            )
        }
        FlattenError::Io(source) => {
            anyhow!(
                "I/O error: {source}\n\
                 HINT: Check that the repository index and destination directory are accessible."
            )
        }
        FlattenError::InvalidArchive { path, reason } => {
            anyhow!(
                "Invalid archive '{}': {reason}\n\
                 HINT: The archive may be corrupted or truncated.",
                path.display()
            )
        }
        FlattenError::UnknownCommit { commit_id } => {
            anyhow!(
                "Commit '{commit_id}' is not in the repository index\n\
                 HINT: Archives must be named <commit>.zip with the commit listed in --repo-index."
            )
        }
        FlattenError::QuotaExceeded { resource } => {
            anyhow!(
                "Limit exceeded: {resource}\n\
                 HINT: Use --max-file-size to raise the per-file limit."
            )
        }
    }
}

/// Attaches hints to a core result
pub fn with_hint<T>(result: Result<T, FlattenError>) -> anyhow::Result<T> {
    result.map_err(convert_flatten_error)
}
