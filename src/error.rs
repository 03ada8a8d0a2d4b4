//! Error types of the annotation core.

/// Failure to map a genome position into transcript coordinates.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("position {pos} lies in intron {intron} of transcript {tx_id}")]
    Intronic {
        tx_id: String,
        pos: i32,
        intron: usize,
    },
    #[error("position {pos} lies outside of transcript {tx_id}")]
    OutsideTranscript { tx_id: String, pos: i32 },
    #[error("transcript position {pos} is outside of transcript {tx_id} (length {len})")]
    OutsideSequence { tx_id: String, pos: i32, len: i32 },
}

/// Errors of the annotation core.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The variant does not have the shape expected by the builder.
    #[error("invalid genome change: {0}")]
    InvalidGenomeChange(String),
    /// A position could not be projected.
    #[error("projection failed: {0}")]
    Projection(#[from] ProjectionError),
    /// A transcript model turned out to be internally inconsistent.
    #[error("inconsistent transcript: {0}")]
    InconsistentTranscript(String),
    /// Construction of a transcript model failed.
    #[error("invalid transcript: {0}")]
    InvalidTranscript(String),
    /// A variant could not be parsed.
    #[error("invalid variant: {0}")]
    InvalidVariant(String),
    /// The variant kind has no annotation builder.
    #[error("unsupported variant: {0}")]
    UnsupportedVariant(String),
}
