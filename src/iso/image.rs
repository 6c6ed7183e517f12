// isopack/src/iso/image.rs

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::name::{self, FILE_VERSION_SUFFIX, InterchangeLevel, NameCasing};
use crate::pack::PackOptions;
use crate::scan::SourceTree;

/// Configuration for a file to be added to the ISO.
#[derive(Clone, Debug)]
pub struct IsoImageFile {
    pub source: PathBuf,
    /// Full ISO path, including the `;1` version suffix.
    pub destination: String,
}

/// The complete plan for an ISO image: volume settings plus every
/// directory and file entry in write order, mapped to final identifiers.
#[derive(Debug)]
pub struct IsoImage {
    /// Normalized volume identifier; empty when unlabeled.
    pub volume_id: String,
    pub level: InterchangeLevel,
    pub casing: NameCasing,
    /// The top-level directory everything nests under, e.g. `/PHOTOS`.
    pub root_dir: String,
    /// Absolute ISO directory paths, parents before children. The first
    /// entry is always `root_dir`.
    pub directories: Vec<String>,
    pub files: Vec<IsoImageFile>,
}

impl IsoImage {
    /// Maps a scanned source tree to an image plan: everything lands under
    /// one top-level directory named after the source root, with names
    /// folded per the configured casing and validated against the
    /// interchange level.
    pub fn from_tree(tree: &SourceTree, options: &PackOptions) -> Result<Self> {
        let level = options.level;
        let casing = options.casing;
        let volume_id = options
            .volume_label
            .as_deref()
            .map(name::normalize_label)
            .unwrap_or_default();

        let root_name = name::map_component(&tree.root_name, level, casing, true)?;
        let root_dir = format!("/{root_name}");

        let mut directories = Vec::with_capacity(tree.directories.len() + 1);
        directories.push(root_dir.clone());
        for dir in &tree.directories {
            let mapped = map_relative(dir, level, casing, true)?;
            directories.push(format!("{root_dir}/{mapped}"));
        }

        let mut files = Vec::with_capacity(tree.files.len());
        for file in &tree.files {
            let mapped = map_relative(&file.relative, level, casing, false)?;
            files.push(IsoImageFile {
                source: file.source.clone(),
                destination: format!("{root_dir}/{mapped}{FILE_VERSION_SUFFIX}"),
            });
        }

        log::debug!(
            "planned image under {root_dir}: {} directories, {} files",
            directories.len(),
            files.len()
        );

        Ok(Self {
            volume_id,
            level,
            casing,
            root_dir,
            directories,
            files,
        })
    }
}

/// Maps a host-relative path to a `/`-joined ISO path. Intermediate
/// components are directories; the last one is too when `last_is_dir` is
/// set.
fn map_relative(
    relative: &Path,
    level: InterchangeLevel,
    casing: NameCasing,
    last_is_dir: bool,
) -> Result<String> {
    let components: Vec<&str> = relative
        .components()
        .map(|c| match c {
            Component::Normal(os) => os.to_str().ok_or_else(|| Error::InvalidName {
                name: relative.display().to_string(),
                reason: "not valid UTF-8".to_string(),
            }),
            _ => Err(Error::InvalidName {
                name: relative.display().to_string(),
                reason: "unexpected path component".to_string(),
            }),
        })
        .collect::<Result<_>>()?;

    let last = components.len().saturating_sub(1);
    let mut mapped = Vec::with_capacity(components.len());
    for (i, component) in components.iter().enumerate() {
        let is_dir = last_is_dir || i < last;
        mapped.push(name::map_component(component, level, casing, is_dir)?);
    }
    Ok(mapped.join("/"))
}
