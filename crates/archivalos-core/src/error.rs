use thiserror::Error;

use crate::whiten::WhitenCallError;

pub type ArchivalOSResult<T> = Result<T, ArchivalOSError>;

#[derive(Debug, Error)]
pub enum ArchivalOSError {
    /// Execution context cannot satisfy archival requirements.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// One or more live dependency versions diverge from their pins.
    /// Aggregated: the message lists every mismatched entry.
    #[error("dependency version mismatch:\n{0}")]
    VersionMismatch(String),

    /// Live configuration no longer matches the frozen commitment.
    #[error("preregistration violation: {0}")]
    Preregistration(String),

    /// The pinned processing path was rejected and strict mode forbids
    /// fallback.
    #[error("determinism violation: {0}")]
    Determinism(String),

    /// Non-signature failure of the whitening step, passed through.
    #[error("whitening step failed: {0}")]
    Whiten(#[from] WhitenCallError),

    #[error("artifact write failed: {0}")]
    Artifact(String),
}
