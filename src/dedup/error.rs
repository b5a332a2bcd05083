use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the dedup engine.
#[derive(Debug, Error)]
pub enum DedupError {
    /// The byte budget must be a positive number of bytes.
    #[error("invalid buffer size: must be a positive number of bytes")]
    InvalidBufferSize,

    #[error("invalid skip pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The merge phase needs at least two chunks; one chunk is already the answer.
    #[error("merge requires at least two chunks, got {0}")]
    TooFewChunks(usize),

    /// A chunk handed to the merger holds no lines. This is a splitter bug.
    #[error("internal error: chunk {0} is empty")]
    EmptyChunk(usize),

    /// A chunk store could not be created in the spill directory.
    #[error(
        "cannot create temporary file in '{}': {}",
        .dir.display(),
        crate::common::io_error_msg(.source)
    )]
    TempStore { dir: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, DedupError>;
