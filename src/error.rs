//src/error.rs

use std::io;
use thiserror::Error;

use crate::config::MAX_K;

/// Everything that can go wrong in scanning, taxonomy loading or resolution.
///
/// Running off the end of a sequence and ambiguous windows are not errors;
/// the scanner reports those through `None` and `is_ambiguous()`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("k-mer length {0} outside 1..={max}", max = MAX_K)]
    InvalidK(u8),

    #[error("invalid spaced seed: {0}")]
    InvalidSeed(String),

    #[error("malformed taxonomy record at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("taxonomy I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unknown taxon {0}")]
    UnknownTaxon(u32),

    #[error("taxonomy contains a cycle through taxon {0}")]
    Cycle(u32),

    #[error("taxa {0} and {1} have no common ancestor")]
    DisjointTaxa(u32, u32),
}

pub type Result<T> = std::result::Result<T, Error>;
