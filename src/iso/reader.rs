// isopack/src/iso/reader.rs

use std::io::{Read, Seek, SeekFrom};

use crate::error::{Error, Result};
use crate::iso::builder::PVD_LBA;
use crate::iso::dir_record::FLAG_DIRECTORY;
use crate::iso::volume_descriptor::{
    ISO_ID, ISO_VOLUME_DESCRIPTOR_PRIMARY, PVD_LOGICAL_BLOCK_SIZE_OFFSET,
    PVD_ROOT_DIR_RECORD_OFFSET, PVD_TOTAL_SECTORS_OFFSET, PVD_VOLUME_ID_OFFSET,
};
use crate::utils::ISO_SECTOR_SIZE;

/// One entry listed from an image. File identifiers keep their `;1`
/// version suffix, exactly as recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IsoEntry {
    /// Absolute ISO path, `/`-separated.
    pub path: String,
    pub is_dir: bool,
    pub size: u32,
    pub lba: u32,
}

/// Minimal ISO9660 reader: validates the primary volume descriptor and
/// lists the directory hierarchy. Enough to verify freshly written images
/// and to round-trip directory listings.
pub struct IsoReader<R> {
    inner: R,
    volume_id: String,
    total_sectors: u32,
    root_lba: u32,
    root_size: u32,
}

fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn read_u16_le(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

impl<R: Read + Seek> IsoReader<R> {
    /// Parses and validates the PVD at LBA 16.
    pub fn open(mut inner: R) -> Result<Self> {
        let mut pvd = [0u8; ISO_SECTOR_SIZE];
        inner.seek(SeekFrom::Start(PVD_LBA as u64 * ISO_SECTOR_SIZE as u64))?;
        inner.read_exact(&mut pvd)?;

        if pvd[0] != ISO_VOLUME_DESCRIPTOR_PRIMARY || &pvd[1..6] != ISO_ID {
            return Err(Error::InvalidImage(
                "missing primary volume descriptor".to_string(),
            ));
        }
        let block_size = read_u16_le(&pvd, PVD_LOGICAL_BLOCK_SIZE_OFFSET);
        if block_size as usize != ISO_SECTOR_SIZE {
            return Err(Error::InvalidImage(format!(
                "unsupported logical block size {block_size}"
            )));
        }

        let volume_id =
            String::from_utf8_lossy(&pvd[PVD_VOLUME_ID_OFFSET..PVD_VOLUME_ID_OFFSET + 32])
                .trim_end()
                .to_string();
        let total_sectors = read_u32_le(&pvd, PVD_TOTAL_SECTORS_OFFSET);
        let root = &pvd[PVD_ROOT_DIR_RECORD_OFFSET..PVD_ROOT_DIR_RECORD_OFFSET + 34];
        let root_lba = read_u32_le(root, 2);
        let root_size = read_u32_le(root, 10);

        log::debug!(
            "opened image: volume '{volume_id}', {total_sectors} sectors, root at LBA {root_lba}"
        );

        Ok(Self {
            inner,
            volume_id,
            total_sectors,
            root_lba,
            root_size,
        })
    }

    /// Volume identifier with the space padding trimmed; empty when the
    /// image is unlabeled.
    pub fn volume_id(&self) -> &str {
        &self.volume_id
    }

    pub fn total_sectors(&self) -> u32 {
        self.total_sectors
    }

    /// Lists every entry below the root, depth first, dot and dotdot
    /// skipped.
    pub fn list_entries(&mut self) -> Result<Vec<IsoEntry>> {
        let mut entries = Vec::new();
        let (lba, size) = (self.root_lba, self.root_size);
        self.walk_directory(lba, size, "", &mut entries, 0)?;
        Ok(entries)
    }

    fn walk_directory(
        &mut self,
        lba: u32,
        size: u32,
        prefix: &str,
        entries: &mut Vec<IsoEntry>,
        depth: usize,
    ) -> Result<()> {
        // ISO9660 nests at most 8 deep at strict levels; anything past a
        // generous bound is a cycle or corruption.
        if depth > 64 {
            return Err(Error::InvalidImage(
                "directory nesting too deep".to_string(),
            ));
        }
        let mut data = vec![0u8; size as usize];
        self.inner
            .seek(SeekFrom::Start(lba as u64 * ISO_SECTOR_SIZE as u64))?;
        self.inner.read_exact(&mut data)?;

        let mut subdirs = Vec::new();
        let mut offset = 0usize;
        while offset < data.len() {
            let record_len = data[offset] as usize;
            if record_len == 0 {
                // Rest of this sector is padding; records never cross
                // sector boundaries.
                offset = (offset / ISO_SECTOR_SIZE + 1) * ISO_SECTOR_SIZE;
                continue;
            }
            if record_len < 34 || offset + record_len > data.len() {
                return Err(Error::InvalidImage(format!(
                    "malformed directory record at LBA {lba}"
                )));
            }
            let record = &data[offset..offset + record_len];
            let id_len = record[32] as usize;
            if 33 + id_len > record_len {
                return Err(Error::InvalidImage(format!(
                    "directory record identifier overruns the record at LBA {lba}"
                )));
            }
            let id = &record[33..33 + id_len];
            let entry_lba = read_u32_le(record, 2);
            let entry_size = read_u32_le(record, 10);
            let flags = record[25];
            offset += record_len;

            // Dot and dotdot.
            if matches!(id, [0] | [1]) {
                continue;
            }
            let name = String::from_utf8_lossy(id).to_string();
            let path = format!("{prefix}/{name}");
            let is_dir = flags & FLAG_DIRECTORY != 0;
            entries.push(IsoEntry {
                path: path.clone(),
                is_dir,
                size: entry_size,
                lba: entry_lba,
            });
            if is_dir {
                subdirs.push((entry_lba, entry_size, path));
            }
        }

        for (sub_lba, sub_size, path) in subdirs {
            self.walk_directory(sub_lba, sub_size, &path, entries, depth + 1)?;
        }
        Ok(())
    }
}
