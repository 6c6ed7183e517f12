// isopack/src/iso/writer.rs

use std::fs::File;
use std::io::{self, Seek, Write};

use crate::error::{Error, Result};
use crate::iso::dir_record::{FLAG_DIRECTORY, FLAG_FILE, IsoDirEntry, RecordingDate};
use crate::iso::fs_node::{IsoDirectory, IsoFsNode};
use crate::iso::path_table::{PathTableRecord, TableEndian, table_bytes};
use crate::utils::{ISO_SECTOR_SIZE, pad_to_lba};

/// Writes the L and M path tables at their assigned LBAs.
pub fn write_path_tables<W: Write + Seek>(
    iso: &mut W,
    records: &[PathTableRecord],
    l_lba: u32,
    m_lba: u32,
) -> Result<()> {
    pad_to_lba(iso, l_lba)?;
    iso.write_all(&table_bytes(records, TableEndian::Little))?;
    pad_to_lba(iso, m_lba)?;
    iso.write_all(&table_bytes(records, TableEndian::Big))?;
    log::debug!("wrote path tables ({} records) at LBA {l_lba}/{m_lba}", records.len());
    Ok(())
}

/// Writes a directory extent and recurses into subdirectories: dot and
/// dotdot first, then the children in identifier order. A record never
/// crosses a sector boundary; when one would, the remainder of the sector
/// is zero padding and the record starts on the next sector.
pub fn write_directories<W: Write + Seek>(
    iso: &mut W,
    dir: &IsoDirectory,
    parent_lba: u32,
    parent_size: u32,
    recorded: RecordingDate,
) -> Result<()> {
    pad_to_lba(iso, dir.lba)?;

    let sorted_children = dir.sorted_children();

    let mut dir_entries = Vec::with_capacity(sorted_children.len() + 2);
    // Self-reference
    dir_entries.push(IsoDirEntry {
        lba: dir.lba,
        size: dir.size,
        flags: FLAG_DIRECTORY,
        name: ".",
        recorded,
    });
    // Parent directory
    dir_entries.push(IsoDirEntry {
        lba: parent_lba,
        size: parent_size,
        flags: FLAG_DIRECTORY,
        name: "..",
        recorded,
    });

    for (name, node) in &sorted_children {
        let entry = match node {
            IsoFsNode::File(file) => {
                let file_size_u32 = u32::try_from(file.size).map_err(|_| Error::FileTooLarge {
                    path: file.path.clone(),
                    size: file.size,
                })?;
                IsoDirEntry {
                    lba: file.lba,
                    size: file_size_u32,
                    flags: FLAG_FILE,
                    name: name.as_str(),
                    recorded,
                }
            }
            IsoFsNode::Directory(subdir) => IsoDirEntry {
                lba: subdir.lba,
                size: subdir.size,
                flags: FLAG_DIRECTORY,
                name: name.as_str(),
                recorded,
            },
        };
        dir_entries.push(entry);
    }

    let mut extent = vec![0u8; dir.size as usize];
    let mut offset = 0usize;
    for entry in &dir_entries {
        let entry_bytes = entry.to_bytes();
        let sector_used = offset % ISO_SECTOR_SIZE;
        if sector_used + entry_bytes.len() > ISO_SECTOR_SIZE {
            offset += ISO_SECTOR_SIZE - sector_used;
        }
        if offset + entry_bytes.len() > extent.len() {
            return Err(Error::Io(io::Error::other(format!(
                "directory extent overflow at LBA {}",
                dir.lba
            ))));
        }
        extent[offset..offset + entry_bytes.len()].copy_from_slice(&entry_bytes);
        offset += entry_bytes.len();
    }
    iso.write_all(&extent)?;
    log::debug!(
        "wrote directory extent at LBA {} ({} records, {} bytes)",
        dir.lba,
        dir_entries.len(),
        extent.len()
    );

    for (_, node) in sorted_children {
        if let IsoFsNode::Directory(subdir) = node {
            write_directories(iso, subdir, dir.lba, dir.size, recorded)?;
        }
    }

    Ok(())
}

/// Copies all file contents to the image at their assigned LBAs.
pub fn copy_files<W: Write + Seek>(iso: &mut W, dir: &IsoDirectory) -> Result<()> {
    for (name, node) in dir.sorted_children() {
        match node {
            IsoFsNode::File(file) => {
                pad_to_lba(iso, file.lba)?;
                let mut real_file = File::open(&file.path)?;
                let written = io::copy(&mut real_file, iso)?;
                if written != file.size {
                    return Err(Error::Io(io::Error::other(format!(
                        "'{}' changed size while packing ({} bytes, recorded {})",
                        file.path.display(),
                        written,
                        file.size
                    ))));
                }
                log::debug!("copied {name} ({written} bytes) to LBA {}", file.lba);
            }
            IsoFsNode::Directory(subdir) => copy_files(iso, subdir)?,
        }
    }

    Ok(())
}
