// isopack/src/scan.rs

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// One regular file found below the source root.
#[derive(Clone, Debug)]
pub struct SourceFile {
    /// Host path the content is read from.
    pub source: PathBuf,
    /// Path relative to the scanned root.
    pub relative: PathBuf,
    pub size: u64,
}

/// A scanned source directory: every directory and regular file below it,
/// in one deterministic order (siblings sorted by name, parents before
/// children). Symlinks are not followed and non-regular files are skipped.
#[derive(Debug)]
pub struct SourceTree {
    /// Canonicalized root path.
    pub root: PathBuf,
    /// Base name of the root, used as the image's top-level directory.
    pub root_name: String,
    pub directories: Vec<PathBuf>,
    pub files: Vec<SourceFile>,
}

/// Counts the regular files below `path`, for progress totals. An empty
/// tree counts zero.
pub fn count_files(path: &Path) -> Result<u64> {
    let mut count = 0;
    for entry in WalkDir::new(path) {
        let entry = entry?;
        if entry.file_type().is_file() {
            count += 1;
        }
    }
    Ok(count)
}

impl SourceTree {
    /// Walks `root` once and records its directories and files.
    pub fn scan(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::NotADirectory(root.to_path_buf()));
        }
        let canonical = root.canonicalize()?;
        let root_name = canonical
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidName {
                name: canonical.display().to_string(),
                reason: "source root has no usable base name".to_string(),
            })?
            .to_string();

        let mut directories = Vec::new();
        let mut files = Vec::new();
        for entry in WalkDir::new(&canonical).sort_by_file_name() {
            let entry = entry?;
            if entry.depth() == 0 {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&canonical)
                .map_err(|e| Error::Io(io::Error::other(e)))?
                .to_path_buf();
            let file_type = entry.file_type();
            if file_type.is_dir() {
                directories.push(relative);
            } else if file_type.is_file() {
                let size = entry.metadata()?.len();
                files.push(SourceFile {
                    source: entry.path().to_path_buf(),
                    relative,
                    size,
                });
            } else {
                log::debug!("skipping non-regular entry {}", entry.path().display());
            }
        }
        log::debug!(
            "scanned {}: {} directories, {} files",
            canonical.display(),
            directories.len(),
            files.len()
        );

        Ok(Self {
            root: canonical,
            root_name,
            directories,
            files,
        })
    }

    /// Total bytes of file content below the root.
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}
