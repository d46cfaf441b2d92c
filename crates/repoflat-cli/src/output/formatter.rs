//! Output formatter trait for CLI results.

use anyhow::Result;
use repoflat_core::BatchReport;
use repoflat_core::ProvenanceRecord;
use serde::Serialize;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of an unpack batch
    fn format_batch_report(&self, report: &BatchReport) -> Result<()>;

    /// Format provenance rows found for a flat name
    fn format_lookup(&self, flat_name: &str, records: &[ProvenanceRecord]) -> Result<()>;
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    /// Some archives of the batch failed.
    Partial,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn partial(operation: impl Into<String>, data: T, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Partial,
            data: Some(data),
            error: Some(error.into()),
        }
    }
}
