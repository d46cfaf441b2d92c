//! Error types for archive flattening operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `FlattenError`.
pub type Result<T> = std::result::Result<T, FlattenError>;

/// Represents a specific limit that was exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaResource {
    /// Bytes streamed for one entry exceeded the per-entry size limit.
    FileSize {
        /// Bytes seen when the limit tripped.
        size: u64,
        /// Maximum allowed size in bytes.
        max: u64,
    },
    /// Integer overflow detected while counting bytes.
    IntegerOverflow,
}

impl std::fmt::Display for QuotaResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileSize { size, max } => {
                write!(f, "quota exceeded: single file size ({size} > {max})")
            }
            Self::IntegerOverflow => {
                write!(f, "quota exceeded: integer overflow in byte counting")
            }
        }
    }
}

/// Errors that can occur while flattening archives.
#[derive(Error, Debug)]
pub enum FlattenError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Archive is corrupted or not a zip file.
    #[error("invalid archive {}: {reason}", .path.display())]
    InvalidArchive {
        /// Archive that failed to open.
        path: PathBuf,
        /// Reason reported by the zip reader.
        reason: String,
    },

    /// Commit id has no entry in the repository index.
    #[error("commit {commit_id} not found in repository index")]
    UnknownCommit {
        /// The commit id derived from the archive file name.
        commit_id: String,
    },

    /// Provenance database operation failed.
    #[error("provenance store error: {0}")]
    Provenance(#[from] rusqlite::Error),

    /// Inclusion or exclusion pattern failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A byte limit was exceeded while streaming an entry.
    #[error("{resource}")]
    QuotaExceeded {
        /// Description of the exceeded resource.
        resource: QuotaResource,
    },

    /// Invalid combination of options supplied by the caller.
    #[error("usage error: {0}")]
    Usage(String),
}

impl FlattenError {
    /// Returns `true` if this error must stop the whole batch.
    ///
    /// Only configuration problems detected before any archive is touched
    /// are fatal. Everything else is scoped to one archive or one entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use repoflat_core::FlattenError;
    ///
    /// let err = FlattenError::Usage("missing --srcmap".into());
    /// assert!(err.is_fatal());
    ///
    /// let err = FlattenError::UnknownCommit {
    ///     commit_id: "abc123".into(),
    /// };
    /// assert!(!err.is_fatal());
    /// ```
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Usage(_) | Self::InvalidPattern(_))
    }

    /// Returns `true` if processing can continue with the next entry.
    ///
    /// Entry-level errors are I/O failures while streaming bytes and
    /// byte-limit breaches. Archive-level errors abort the current archive
    /// only.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::QuotaExceeded { .. })
    }

    /// Returns a context string for this error, if available.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidArchive { reason, .. } => Some(reason),
            Self::UnknownCommit { commit_id } => Some(commit_id),
            Self::Usage(msg) => Some(msg),
            _ => None,
        }
    }

    /// Returns the quota resource that was exceeded, if applicable.
    #[must_use]
    pub const fn quota_resource(&self) -> Option<&QuotaResource> {
        match self {
            Self::QuotaExceeded { resource } => Some(resource),
            _ => None,
        }
    }
}
