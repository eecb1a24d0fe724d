//! Error types shared across the crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run.
///
/// Out-of-bounds fragments are not errors; see [`crate::filter::Rejection`].
#[derive(Error, Debug)]
pub enum FfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid {field} '{value}': {reason}")]
    InvalidName {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Malformed chrom sizes file {} at line {line}: {message}", path.display())]
    ChromSizes {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Compression failed: {0}")]
    Compression(String),
}

pub type Result<T> = std::result::Result<T, FfError>;
