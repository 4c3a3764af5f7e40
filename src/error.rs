//! Host-side errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors that end the host program
#[derive(Debug, Error)]
pub enum HostError {
    /// Writing the save artifact failed
    #[error("failed to write {path:?}: {source}")]
    Artifact {
        /// Artifact path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// FlashRAM does not hold exactly one dump image
    #[error("FlashRAM holds {found} bytes, expected {expected}")]
    ArtifactSize {
        /// Required size
        expected: usize,
        /// Actual size
        found: usize,
    },
}
