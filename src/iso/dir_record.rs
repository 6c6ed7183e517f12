// isopack/src/iso/dir_record.rs

use time::OffsetDateTime;

use crate::name::FILE_VERSION_SUFFIX;

/// Fixed part of a directory record, up to and including the identifier
/// length byte (ECMA-119 9.1).
pub const DIR_RECORD_BASE_LEN: usize = 33;
/// A record with a one-byte identifier, as embedded for the root directory
/// in the primary volume descriptor.
pub const ROOT_DIR_RECORD_LEN: usize = 34;

pub const FLAG_DIRECTORY: u8 = 0x02;
pub const FLAG_FILE: u8 = 0x00;

/// 7-byte recording date: years since 1900, month, day, hour, minute,
/// second, GMT offset in quarter hours.
#[derive(Clone, Copy, Debug)]
pub struct RecordingDate([u8; 7]);

impl RecordingDate {
    pub fn from_datetime(t: OffsetDateTime) -> Self {
        let year = (t.year() - 1900).clamp(0, 255) as u8;
        Self([
            year,
            u8::from(t.month()),
            t.day(),
            t.hour(),
            t.minute(),
            t.second(),
            0,
        ])
    }

    pub fn as_bytes(&self) -> &[u8; 7] {
        &self.0
    }
}

/// ISO9660 directory record. The names `.` and `..` stand for the dot and
/// dotdot entries and serialize as the 0x00 and 0x01 identifiers; every
/// other name is written as handed in, with the `;1` version suffix
/// appended to files.
pub struct IsoDirEntry<'a> {
    pub lba: u32,
    pub size: u32,
    pub flags: u8,
    pub name: &'a str,
    pub recorded: RecordingDate,
}

impl<'a> IsoDirEntry<'a> {
    /// Serialized record length for `name`, including the pad byte that
    /// keeps records even-sized.
    pub fn record_len(name: &str, flags: u8) -> usize {
        let id_len = match name {
            "." | ".." => 1,
            _ if flags & FLAG_DIRECTORY != 0 => name.len(),
            _ => name.len() + FILE_VERSION_SUFFIX.len(),
        };
        let total = DIR_RECORD_BASE_LEN + id_len;
        total + total % 2
    }

    /// Creates ISO9660 directory record bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let file_id: Vec<u8> = match self.name {
            "." => vec![0u8],
            ".." => vec![1u8],
            _ if self.flags & FLAG_DIRECTORY != 0 => self.name.as_bytes().to_vec(),
            _ => format!("{}{}", self.name, FILE_VERSION_SUFFIX).into_bytes(),
        };
        let file_id_len = file_id.len();
        let total_len = DIR_RECORD_BASE_LEN + file_id_len;
        let pad_len = total_len % 2;
        let record_len = total_len + pad_len;

        let mut record = vec![0u8; record_len];
        record[0] = record_len as u8;
        record[1] = 0; // Extended attribute record length
        record[2..6].copy_from_slice(&self.lba.to_le_bytes());
        record[6..10].copy_from_slice(&self.lba.to_be_bytes());
        record[10..14].copy_from_slice(&self.size.to_le_bytes());
        record[14..18].copy_from_slice(&self.size.to_be_bytes());
        record[18..25].copy_from_slice(self.recorded.as_bytes());
        record[25] = self.flags;
        record[26] = 0; // File unit size
        record[27] = 0; // Interleave gap size
        record[28..30].copy_from_slice(&1u16.to_le_bytes());
        record[30..32].copy_from_slice(&1u16.to_be_bytes());
        record[32] = file_id_len as u8;
        record[DIR_RECORD_BASE_LEN..DIR_RECORD_BASE_LEN + file_id_len].copy_from_slice(&file_id);

        record
    }
}
