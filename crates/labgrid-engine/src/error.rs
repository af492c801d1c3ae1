//! Error types for the expansion engine.

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the engine and its orchestrators.
#[derive(Debug, Error)]
pub enum Error {
    /// Grid-level failure, including `RegionNotFound`
    #[error(transparent)]
    Grid(#[from] labgrid_core::Error),

    /// Nonsensical caller input; surfaced before any mutation is attempted
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The document host rejected a structural or write operation
    #[error("Host operation failed: {0}")]
    HostOperationFailed(String),

    /// Copying or staging a document on disk failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The external document host could not be reached or closed
    #[error("Document host unavailable: {0}")]
    HostUnavailable(String),

    /// A rewrite base cell holds no expression
    #[error("Missing base cell expression in region '{0}'")]
    MissingBaseCell(String),
}

impl Error {
    /// Whether this error is a missing-region signal, which callers usually
    /// treat as "skip this step" rather than surfacing.
    pub fn is_region_not_found(&self) -> bool {
        matches!(self, Error::Grid(labgrid_core::Error::RegionNotFound(_)))
    }
}
