//! Error taxonomy shared by the artifact loaders and the analytics modules

use std::path::{Path, PathBuf};

use polars::prelude::PolarsError;

/// Errors surfaced by artifact access and the summary transforms.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Required artifact file is missing. Recoverable by fixing the path.
    #[error("artifact not found: {}", path.display())]
    ArtifactNotFound { path: PathBuf },

    #[error("failed to read artifact {}: {reason}", path.display())]
    MalformedArtifact { path: PathBuf, reason: String },

    /// Expected columns are absent or hold the wrong kind of values.
    #[error("schema mismatch: {details}")]
    SchemaMismatch { details: String },

    #[error("cluster '{id}' not found in summary table")]
    ClusterNotFound { id: String },

    #[error("table operation failed: {0}")]
    Table(#[from] PolarsError),
}

impl DashboardError {
    pub fn schema(details: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            details: details.into(),
        }
    }

    pub fn malformed(path: &Path, reason: impl ToString) -> Self {
        Self::MalformedArtifact {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// True when the failure is a missing file rather than a processing error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ArtifactNotFound { .. })
    }
}

/// Fail with `ArtifactNotFound` unless `path` points at a regular file.
pub(crate) fn require_file(path: &Path) -> Result<(), DashboardError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(DashboardError::ArtifactNotFound {
            path: path.to_path_buf(),
        })
    }
}
