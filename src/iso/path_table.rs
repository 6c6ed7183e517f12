// isopack/src/iso/path_table.rs

use std::collections::VecDeque;

use crate::iso::fs_node::{IsoDirectory, IsoFsNode};

/// Byte order of a path table. ISO9660 images carry one of each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableEndian {
    Little,
    Big,
}

/// One path table record (ECMA-119 9.4). An empty identifier stands for
/// the root directory and serializes as a single 0x00 byte.
#[derive(Clone, Debug)]
pub struct PathTableRecord {
    pub identifier: String,
    pub lba: u32,
    /// 1-based table number of the parent directory's record.
    pub parent: u16,
}

impl PathTableRecord {
    /// Serialized record length, including the pad byte after odd-length
    /// identifiers.
    pub fn record_len(identifier: &str) -> usize {
        let id_len = if identifier.is_empty() {
            1
        } else {
            identifier.len()
        };
        8 + id_len + id_len % 2
    }

    pub fn to_bytes(&self, endian: TableEndian) -> Vec<u8> {
        let id: &[u8] = if self.identifier.is_empty() {
            &[0u8]
        } else {
            self.identifier.as_bytes()
        };
        let id_len = id.len();
        let mut record = vec![0u8; 8 + id_len + id_len % 2];
        record[0] = id_len as u8;
        record[1] = 0; // Extended attribute record length
        match endian {
            TableEndian::Little => {
                record[2..6].copy_from_slice(&self.lba.to_le_bytes());
                record[6..8].copy_from_slice(&self.parent.to_le_bytes());
            }
            TableEndian::Big => {
                record[2..6].copy_from_slice(&self.lba.to_be_bytes());
                record[6..8].copy_from_slice(&self.parent.to_be_bytes());
            }
        }
        record[8..8 + id_len].copy_from_slice(id);
        record
    }
}

/// Builds the path table for a directory tree: breadth-first, children in
/// identifier order, so records are sorted by level, then parent number,
/// then identifier, as the format requires. The root is always record 1.
pub fn build_path_table(root: &IsoDirectory) -> Vec<PathTableRecord> {
    let mut records = vec![PathTableRecord {
        identifier: String::new(),
        lba: root.lba,
        parent: 1,
    }];
    let mut queue: VecDeque<(&IsoDirectory, u16)> = VecDeque::new();
    queue.push_back((root, 1));

    while let Some((dir, number)) = queue.pop_front() {
        for (name, node) in dir.sorted_children() {
            if let IsoFsNode::Directory(subdir) = node {
                records.push(PathTableRecord {
                    identifier: name.clone(),
                    lba: subdir.lba,
                    parent: number,
                });
                let assigned = records.len() as u16;
                queue.push_back((subdir, assigned));
            }
        }
    }
    records
}

/// Serializes a whole table in the given byte order.
pub fn table_bytes(records: &[PathTableRecord], endian: TableEndian) -> Vec<u8> {
    let mut out = Vec::new();
    for record in records {
        out.extend_from_slice(&record.to_bytes(endian));
    }
    out
}

/// Table size in bytes, identical for both byte orders.
pub fn table_size(records: &[PathTableRecord]) -> u32 {
    records
        .iter()
        .map(|r| PathTableRecord::record_len(&r.identifier) as u32)
        .sum()
}
