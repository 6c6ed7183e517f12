// isopack/src/iso/builder.rs

use std::fs;
use std::io::{Seek, Write};
use std::path::Path;

use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::iso::dir_record::{FLAG_DIRECTORY, FLAG_FILE, IsoDirEntry, RecordingDate};
use crate::iso::fs_node::{IsoDirectory, IsoFile, IsoFsNode};
use crate::iso::path_table::{build_path_table, table_size};
use crate::iso::volume_descriptor::{
    PrimaryVolumeDescriptor, update_total_sectors_in_pvd, write_primary_volume_descriptor,
    write_volume_descriptor_terminator,
};
use crate::iso::writer::{copy_files, write_directories, write_path_tables};
use crate::name::{self, InterchangeLevel, MAX_NESTING_DEPTH, MAX_PATH_LEN, NameCasing};
use crate::utils::{ISO_SECTOR_SIZE, pad_to_lba, pad_to_sector_boundary};

/// LBA of the primary volume descriptor; sectors 0-15 are the system area.
pub const PVD_LBA: u32 = 16;
const TERMINATOR_LBA: u32 = 17;
/// First LBA past the volume descriptors, where the path tables start.
const FIRST_CONTENT_LBA: u32 = 18;

/// Volume-level configuration for a build.
#[derive(Clone, Debug, Default)]
pub struct VolumeOptions {
    /// Normalized volume identifier; empty means unlabeled.
    pub volume_id: String,
    /// Identifiers handed to `add_file`/`add_directory` are validated
    /// against this level. Level 4 accepts most printable names.
    pub level: InterchangeLevel,
}

/// The main builder for creating an ISO 9660 image: entries are registered
/// first, then the whole tree is serialized in one pass.
pub struct IsoBuilder {
    root: IsoDirectory,
    options: VolumeOptions,
    current_lba: u32,
    total_sectors: u32,
}

impl Default for IsoBuilder {
    fn default() -> Self {
        Self::new(VolumeOptions::default())
    }
}

fn iso_components(path_in_iso: &str) -> impl Iterator<Item = &str> {
    path_in_iso.split('/').filter(|c| !c.is_empty())
}

impl IsoBuilder {
    pub fn new(options: VolumeOptions) -> Self {
        Self {
            root: IsoDirectory::new(),
            options,
            current_lba: 0,
            total_sectors: 0,
        }
    }

    /// Total sectors of the last build.
    pub fn total_sectors(&self) -> u32 {
        self.total_sectors
    }

    /// Registers a directory, creating parents as needed. The path uses
    /// `/` separators; a leading slash is allowed.
    pub fn add_directory(&mut self, path_in_iso: &str) -> Result<()> {
        self.check_limits(path_in_iso)?;
        self.ensure_directory(path_in_iso).map(|_| ())
    }

    /// Registers a file entry. The destination may carry the `;1` version
    /// suffix; it is stripped here and re-appended when records are
    /// written.
    pub fn add_file(&mut self, destination: &str, source: &Path) -> Result<()> {
        let dest = name::strip_version_suffix(destination);
        self.check_limits(dest)?;

        let (dir_path, file_name) = match dest.rsplit_once('/') {
            Some((dir, file_name)) => (dir, file_name),
            None => ("", dest),
        };
        name::map_component(file_name, self.options.level, NameCasing::Preserve, false)?;

        let file_size = fs::metadata(source)?.len();
        if u32::try_from(file_size).is_err() {
            return Err(Error::FileTooLarge {
                path: source.to_path_buf(),
                size: file_size,
            });
        }

        let parent = self.ensure_directory(dir_path)?;
        let file = IsoFile {
            path: source.to_path_buf(),
            size: file_size,
            lba: 0,
        };
        parent
            .children
            .insert(file_name.to_string(), IsoFsNode::File(file));

        Ok(())
    }

    /// Walks to (and creates) the directory at `path_in_iso`.
    fn ensure_directory(&mut self, path_in_iso: &str) -> Result<&mut IsoDirectory> {
        let level = self.options.level;
        let mut current_dir = &mut self.root;
        for component in iso_components(path_in_iso) {
            name::map_component(component, level, NameCasing::Preserve, true)?;
            current_dir = match current_dir
                .children
                .entry(component.to_string())
                .or_insert_with(|| IsoFsNode::Directory(IsoDirectory::new()))
            {
                IsoFsNode::Directory(dir) => dir,
                _ => return Err(Error::DestinationConflict(path_in_iso.to_string())),
            };
        }
        Ok(current_dir)
    }

    /// Structural limits enforced at strict interchange levels.
    fn check_limits(&self, path_in_iso: &str) -> Result<()> {
        if !self.options.level.is_strict() {
            return Ok(());
        }
        let depth = iso_components(path_in_iso).count();
        if depth > MAX_NESTING_DEPTH {
            return Err(Error::NestingTooDeep {
                path: path_in_iso.to_string(),
                depth,
            });
        }
        let len = path_in_iso.trim_start_matches('/').len();
        if len > MAX_PATH_LEN {
            return Err(Error::PathTooLong {
                path: path_in_iso.to_string(),
                len,
            });
        }
        Ok(())
    }

    /// Computes each directory's extent size: dot, dotdot, then children
    /// in identifier order, with records moved past any sector boundary
    /// they would cross. Sizes come out as whole sectors.
    fn compute_extent_sizes(dir: &mut IsoDirectory) {
        let mut offset = IsoDirEntry::record_len(".", FLAG_DIRECTORY)
            + IsoDirEntry::record_len("..", FLAG_DIRECTORY);

        for (name, node) in dir.sorted_children() {
            let flags = match node {
                IsoFsNode::Directory(_) => FLAG_DIRECTORY,
                IsoFsNode::File(_) => FLAG_FILE,
            };
            let len = IsoDirEntry::record_len(name, flags);
            let sector_used = offset % ISO_SECTOR_SIZE;
            if sector_used + len > ISO_SECTOR_SIZE {
                offset += ISO_SECTOR_SIZE - sector_used;
            }
            offset += len;
        }
        let sectors = offset.div_ceil(ISO_SECTOR_SIZE).max(1);
        dir.size = (sectors * ISO_SECTOR_SIZE) as u32;

        for node in dir.children.values_mut() {
            if let IsoFsNode::Directory(subdir) = node {
                Self::compute_extent_sizes(subdir);
            }
        }
    }

    /// Calculates the Logical Block Addresses (LBAs) for all directories
    /// and files. Every directory extent is assigned first, then every
    /// file extent; the writer only streams forward, so the two write
    /// passes must each advance in ascending LBA order.
    fn calculate_lbas(current_lba: &mut u32, root: &mut IsoDirectory) {
        Self::assign_directory_lbas(current_lba, root);
        Self::assign_file_lbas(current_lba, root);
    }

    /// Directory extents depth first, children in identifier order, the
    /// order `write_directories` emits them.
    fn assign_directory_lbas(current_lba: &mut u32, dir: &mut IsoDirectory) {
        dir.lba = *current_lba;
        *current_lba += dir.size / ISO_SECTOR_SIZE as u32;

        let mut sorted_children: Vec<_> = dir.children.iter_mut().collect();
        sorted_children.sort_by_key(|(name, _)| *name);

        for (_, node) in sorted_children {
            if let IsoFsNode::Directory(subdir) = node {
                Self::assign_directory_lbas(current_lba, subdir);
            }
        }
    }

    /// File extents in the order `copy_files` visits them: each
    /// directory's children in identifier order, recursing into
    /// subdirectories as they appear.
    fn assign_file_lbas(current_lba: &mut u32, dir: &mut IsoDirectory) {
        let mut sorted_children: Vec<_> = dir.children.iter_mut().collect();
        sorted_children.sort_by_key(|(name, _)| *name);

        for (_, node) in sorted_children {
            match node {
                IsoFsNode::File(file) => {
                    file.lba = *current_lba;
                    *current_lba += file.size.div_ceil(ISO_SECTOR_SIZE as u64) as u32;
                }
                IsoFsNode::Directory(subdir) => {
                    Self::assign_file_lbas(current_lba, subdir);
                }
            }
        }
    }

    /// Serializes the configured tree into `iso`, which must be a fresh
    /// output positioned at the start. Layout: zeroed system area, PVD,
    /// set terminator, L and M path tables, directory extents, file data,
    /// final padding, and a PVD fixup with the real sector count.
    pub fn build<W: Write + Seek>(&mut self, iso: &mut W) -> Result<()> {
        let now = OffsetDateTime::now_utc();
        let recorded = RecordingDate::from_datetime(now);

        Self::compute_extent_sizes(&mut self.root);

        // Path table sizes depend only on names, so the tables can be
        // placed before any directory LBA is known.
        let template = build_path_table(&self.root);
        if template.len() > u16::MAX as usize {
            return Err(Error::ImageTooLarge(format!(
                "{} directories exceeds the path table limit of 65535",
                template.len()
            )));
        }
        let path_table_size = table_size(&template);
        let table_sectors = (path_table_size as usize).div_ceil(ISO_SECTOR_SIZE) as u32;
        let l_path_table_lba = FIRST_CONTENT_LBA;
        let m_path_table_lba = l_path_table_lba + table_sectors;

        self.current_lba = m_path_table_lba + table_sectors;
        Self::calculate_lbas(&mut self.current_lba, &mut self.root);
        let path_table = build_path_table(&self.root);

        log::info!(
            "serializing image: root at LBA {}, {} path table records, data through LBA {}",
            self.root.lba,
            path_table.len(),
            self.current_lba
        );

        // Zero the system area, then write everything in layout order.
        pad_to_lba(iso, PVD_LBA)?;
        let descriptor = PrimaryVolumeDescriptor {
            volume_id: &self.options.volume_id,
            total_sectors: self.current_lba,
            path_table_size,
            l_path_table_lba,
            m_path_table_lba,
            root_entry: IsoDirEntry {
                lba: self.root.lba,
                size: self.root.size,
                flags: FLAG_DIRECTORY,
                name: ".",
                recorded,
            },
            created: now,
        };
        write_primary_volume_descriptor(iso, &descriptor, PVD_LBA)?;
        write_volume_descriptor_terminator(iso, TERMINATOR_LBA)?;
        write_path_tables(iso, &path_table, l_path_table_lba, m_path_table_lba)?;
        write_directories(iso, &self.root, self.root.lba, self.root.size, recorded)?;
        copy_files(iso, &self.root)?;
        self.finalize(iso)?;

        log::info!("image serialized: {} sectors", self.total_sectors);
        Ok(())
    }

    /// Finalizes the image by padding to a sector boundary and updating
    /// the total sector count in the PVD.
    fn finalize<W: Write + Seek>(&mut self, iso: &mut W) -> Result<()> {
        pad_to_sector_boundary(iso)?;
        let final_pos = iso.stream_position()?;
        let total_sectors_u64 = final_pos.div_ceil(ISO_SECTOR_SIZE as u64);
        self.total_sectors = u32::try_from(total_sectors_u64).map_err(|_| {
            Error::ImageTooLarge(format!("{total_sectors_u64} sectors exceeds u32::MAX"))
        })?;
        update_total_sectors_in_pvd(iso, PVD_LBA, self.total_sectors)?;

        Ok(())
    }
}
