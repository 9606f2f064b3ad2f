use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Errors raised while turning a file on disk into a [`Spectrum`](crate::data::model::Spectrum).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The extension or the content matches none of the known encodings.
    #[error("Unsupported spectrum format for '{path}': {reason}")]
    UnsupportedFormat { path: PathBuf, reason: String },

    /// The encoding was recognised but a required field is missing or broken.
    #[error("Malformed spectrum '{path}': {reason}")]
    MalformedData { path: PathBuf, reason: String },

    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn unsupported(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        LoadError::UnsupportedFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        LoadError::MalformedData {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the file was recognised as some known encoding.
    pub fn is_recognised(&self) -> bool {
        matches!(self, LoadError::MalformedData { .. })
    }
}

// ---------------------------------------------------------------------------
// Fitting
// ---------------------------------------------------------------------------

/// Precondition failures of the continuum spline fit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("Need at least {required} distinct control points to fit a cubic spline, got {distinct}")]
    InsufficientPoints { distinct: usize, required: usize },

    #[error("Control points do not define a spline: {reason}")]
    DegenerateFit { reason: String },
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("No normalized spectrum to save")]
    NothingToSave,

    #[error("Failed to write '{path}': {source}")]
    Write { path: PathBuf, source: csv::Error },
}
