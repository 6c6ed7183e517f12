// isopack/src/error.rs

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while scanning a source tree, planning an image, or
/// reading/writing ISO 9660 structures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("invalid ISO9660 name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("'{0}' conflicts with an existing file entry")]
    DestinationConflict(String),

    #[error("'{path}' is nested {depth} levels deep, over the ISO9660 limit of 8")]
    NestingTooDeep { path: String, depth: usize },

    #[error("path '{path}' is {len} bytes long, over the ISO9660 limit of 255")]
    PathTooLong { path: String, len: usize },

    #[error("file '{path}' is too large for ISO9660 ({size} bytes exceeds u32::MAX)")]
    FileTooLarge { path: PathBuf, size: u64 },

    #[error("image too large: {0}")]
    ImageTooLarge(String),

    #[error("not an ISO9660 image: {0}")]
    InvalidImage(String),
}
