//! Flatten repository snapshot archives into a collision-free tree.
//!
//! `repoflat-core` takes zip snapshots named after a commit id
//! (`<commit>.zip`, each holding a single top-level folder), filters their
//! entries, writes every surviving file to
//! `dest_root/<top-level folder>/<md5(path)>_<escaped base name>`, and
//! optionally records where each flat file came from in a SQLite table.
//!
//! # Examples
//!
//! ```no_run
//! use repoflat_core::filter::{EntryFilter, FilterRule};
//! use repoflat_core::{BatchConfig, BatchRunner, UnpackConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = BatchConfig::new("flat");
//! config.unpack = UnpackConfig {
//!     filter: EntryFilter::new()
//!         .with_rule(FilterRule::exclude("/test/")?)
//!         .with_rule(FilterRule::include(r"\.java$")?),
//!     ..Default::default()
//! };
//! config.repo_index = Some("repos.lst".into());
//! config.provenance_db = Some("srcmap.db".into());
//!
//! let mut runner = BatchRunner::new(config)?;
//! let report = runner.run(["zip/46ec6a63.zip"]);
//! runner.finish()?;
//! println!("Extracted {} files", report.totals().extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod batch;
pub mod config;
pub mod copy;
pub mod error;
pub mod filter;
pub mod key;
pub mod repo_index;
pub mod report;
pub mod store;
#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub mod test_utils;
pub mod unpack;

// Re-export main API types
pub use api::flatten_archive;
pub use api::run_batch;
pub use batch::BatchConfig;
pub use batch::BatchRunner;
pub use config::UnpackConfig;
pub use error::FlattenError;
pub use error::QuotaResource;
pub use error::Result;
pub use filter::EntryFilter;
pub use filter::FilterRule;
pub use key::FlatName;
pub use key::derive_key;
pub use repo_index::CommitRef;
pub use repo_index::RepoIndex;
pub use report::ArchiveOutcome;
pub use report::ArchiveReport;
pub use report::BatchReport;
pub use report::UnpackSummary;
pub use store::NewProvenanceRecord;
pub use store::ProvenanceRecord;
pub use store::ProvenanceStore;
pub use unpack::Provenance;
