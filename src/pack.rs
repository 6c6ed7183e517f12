// isopack/src/pack.rs

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::iso::{IsoBuilder, IsoImage, VolumeOptions};
use crate::name::{InterchangeLevel, NameCasing};
use crate::progress::Progress;
use crate::scan::SourceTree;

/// Settings for one pack run.
#[derive(Clone, Debug, Default)]
pub struct PackOptions {
    /// Volume label, uppercased and truncated to 32 characters before it
    /// is written. `None` leaves the volume unlabeled.
    pub volume_label: Option<String>,
    pub level: InterchangeLevel,
    pub casing: NameCasing,
}

/// What a completed pack produced.
#[derive(Clone, Debug)]
pub struct PackSummary {
    /// Absolute path of the written image.
    pub output: PathBuf,
    /// Normalized volume identifier; empty when unlabeled.
    pub volume_id: String,
    pub file_count: usize,
    pub directory_count: usize,
    pub total_sectors: u32,
}

/// Default image name for a source directory: its basename plus `.iso`.
pub fn default_image_name(source: &Path) -> String {
    let canonical = fs::canonicalize(source).ok();
    canonical
        .as_deref()
        .unwrap_or(source)
        .file_name()
        .and_then(|name| name.to_str())
        .map(|base| format!("{base}.iso"))
        .unwrap_or_else(|| "image.iso".to_string())
}

/// Appends `.iso` unless the name already ends with it, in any case.
pub fn ensure_iso_extension(name: &str) -> String {
    if name.to_lowercase().ends_with(".iso") {
        name.to_string()
    } else {
        format!("{name}.iso")
    }
}

/// Packs `source` into an ISO image at `output`.
///
/// The image is written to a temporary file next to the target and renamed
/// into place once it is complete, so a failed run never leaves a partial
/// image behind.
pub fn pack_directory(
    source: &Path,
    output: &Path,
    options: &PackOptions,
    progress: &mut dyn Progress,
) -> Result<PackSummary> {
    let tree = SourceTree::scan(source)?;
    let image = IsoImage::from_tree(&tree, options)?;

    log::info!(
        "packing {} ({} files, {} bytes) into {}",
        tree.root.display(),
        image.files.len(),
        tree.total_bytes(),
        output.display()
    );

    let mut builder = IsoBuilder::new(VolumeOptions {
        volume_id: image.volume_id.clone(),
        level: image.level,
    });

    progress.begin_populate(image.files.len() as u64);
    for dir in &image.directories {
        builder.add_directory(dir)?;
    }
    for file in &image.files {
        builder.add_file(&file.destination, &file.source)?;
        progress.file_added(&file.destination);
    }

    let parent = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent)?;

    progress.begin_write();
    let written = builder.build(tmp.as_file_mut());
    progress.finish_write();
    written?;

    tmp.persist(output).map_err(|e| Error::Io(e.error))?;
    let output = fs::canonicalize(output)?;
    log::info!(
        "wrote {} sectors to {}",
        builder.total_sectors(),
        output.display()
    );

    Ok(PackSummary {
        output,
        volume_id: image.volume_id,
        file_count: image.files.len(),
        directory_count: image.directories.len(),
        total_sectors: builder.total_sectors(),
    })
}
