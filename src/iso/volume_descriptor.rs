// isopack/src/iso/volume_descriptor.rs

use std::io::{self, Seek, SeekFrom, Write};

use time::OffsetDateTime;

use crate::iso::dir_record::{IsoDirEntry, ROOT_DIR_RECORD_LEN};
use crate::utils::{ISO_SECTOR_SIZE, pad_to_lba};

pub const ISO_VOLUME_DESCRIPTOR_TERMINATOR: u8 = 255;
pub const ISO_VOLUME_DESCRIPTOR_PRIMARY: u8 = 1;
pub const ISO_ID: &[u8] = b"CD001";
pub const ISO_VERSION: u8 = 1;

pub const PVD_SYSTEM_ID_OFFSET: usize = 8;
pub const PVD_VOLUME_ID_OFFSET: usize = 40;
pub const PVD_TOTAL_SECTORS_OFFSET: usize = 80;
pub const PVD_VOL_SET_SIZE_OFFSET: usize = 120;
pub const PVD_VOL_SEQ_NUM_OFFSET: usize = 124;
pub const PVD_LOGICAL_BLOCK_SIZE_OFFSET: usize = 128;
pub const PVD_PATH_TABLE_SIZE_OFFSET: usize = 132;
pub const PVD_L_PATH_TABLE_OFFSET: usize = 140;
pub const PVD_M_PATH_TABLE_OFFSET: usize = 148;
pub const PVD_ROOT_DIR_RECORD_OFFSET: usize = 156;
pub const PVD_APPLICATION_ID_OFFSET: usize = 574;
pub const PVD_CREATION_DATE_OFFSET: usize = 813;
pub const PVD_MODIFICATION_DATE_OFFSET: usize = 830;
pub const PVD_EXPIRATION_DATE_OFFSET: usize = 847;
pub const PVD_EFFECTIVE_DATE_OFFSET: usize = 864;
pub const PVD_FILE_STRUCTURE_VERSION_OFFSET: usize = 881;

/// Fields of the primary volume descriptor that vary per image.
pub struct PrimaryVolumeDescriptor<'a> {
    /// Normalized volume identifier; empty leaves the field space-padded.
    pub volume_id: &'a str,
    pub total_sectors: u32,
    pub path_table_size: u32,
    pub l_path_table_lba: u32,
    pub m_path_table_lba: u32,
    pub root_entry: IsoDirEntry<'a>,
    pub created: OffsetDateTime,
}

/// A helper function to update two 4-byte fields at different offsets
/// within a single ISO sector (2048 bytes).
fn update_4byte_fields<W: Write + Seek>(
    iso: &mut W,
    base_lba: u32,
    offset1: usize,
    offset2: usize,
    value: u32,
) -> io::Result<()> {
    let base_offset = base_lba as u64 * ISO_SECTOR_SIZE as u64;

    iso.seek(SeekFrom::Start(base_offset + offset1 as u64))?;
    iso.write_all(&value.to_le_bytes())?;

    iso.seek(SeekFrom::Start(base_offset + offset2 as u64))?;
    iso.write_all(&value.to_be_bytes())?;

    Ok(())
}

/// 17-byte "dec-datetime" field: ASCII digits down to centiseconds plus a
/// GMT offset byte (8.4.26.1).
fn dec_datetime(t: OffsetDateTime) -> [u8; 17] {
    let mut field = [b'0'; 17];
    let formatted = format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}{:02}",
        t.year().clamp(0, 9999),
        u8::from(t.month()),
        t.day(),
        t.hour(),
        t.minute(),
        t.second(),
        t.millisecond() / 10
    );
    field[..16].copy_from_slice(formatted.as_bytes());
    field[16] = 0;
    field
}

/// The all-zero-digit dec-datetime that marks an unspecified date.
fn zero_dec_datetime() -> [u8; 17] {
    let mut field = [b'0'; 17];
    field[16] = 0;
    field
}

pub fn write_primary_volume_descriptor<W: Write + Seek>(
    iso: &mut W,
    desc: &PrimaryVolumeDescriptor,
    base_lba: u32,
) -> io::Result<()> {
    pad_to_lba(iso, base_lba)?;
    let mut pvd = [0u8; ISO_SECTOR_SIZE];
    pvd[0] = ISO_VOLUME_DESCRIPTOR_PRIMARY;
    pvd[1..6].copy_from_slice(ISO_ID);
    pvd[6] = ISO_VERSION;

    // Space-fill the text fields: system/volume identifiers, the id block
    // from volume set through application, and the three file identifiers.
    for range in [PVD_SYSTEM_ID_OFFSET..72, 190..PVD_CREATION_DATE_OFFSET] {
        pvd[range].fill(b' ');
    }

    let label = desc.volume_id.as_bytes();
    let label_len = label.len().min(32);
    pvd[PVD_VOLUME_ID_OFFSET..PVD_VOLUME_ID_OFFSET + label_len]
        .copy_from_slice(&label[..label_len]);

    pvd[PVD_TOTAL_SECTORS_OFFSET..PVD_TOTAL_SECTORS_OFFSET + 4]
        .copy_from_slice(&desc.total_sectors.to_le_bytes());
    pvd[PVD_TOTAL_SECTORS_OFFSET + 4..PVD_TOTAL_SECTORS_OFFSET + 8]
        .copy_from_slice(&desc.total_sectors.to_be_bytes());

    pvd[PVD_VOL_SET_SIZE_OFFSET..PVD_VOL_SET_SIZE_OFFSET + 2].copy_from_slice(&1u16.to_le_bytes());
    pvd[PVD_VOL_SET_SIZE_OFFSET + 2..PVD_VOL_SET_SIZE_OFFSET + 4]
        .copy_from_slice(&1u16.to_be_bytes());

    pvd[PVD_VOL_SEQ_NUM_OFFSET..PVD_VOL_SEQ_NUM_OFFSET + 2].copy_from_slice(&1u16.to_le_bytes());
    pvd[PVD_VOL_SEQ_NUM_OFFSET + 2..PVD_VOL_SEQ_NUM_OFFSET + 4]
        .copy_from_slice(&1u16.to_be_bytes());

    pvd[PVD_LOGICAL_BLOCK_SIZE_OFFSET..PVD_LOGICAL_BLOCK_SIZE_OFFSET + 2]
        .copy_from_slice(&(ISO_SECTOR_SIZE as u16).to_le_bytes());
    pvd[PVD_LOGICAL_BLOCK_SIZE_OFFSET + 2..PVD_LOGICAL_BLOCK_SIZE_OFFSET + 4]
        .copy_from_slice(&(ISO_SECTOR_SIZE as u16).to_be_bytes());

    pvd[PVD_PATH_TABLE_SIZE_OFFSET..PVD_PATH_TABLE_SIZE_OFFSET + 4]
        .copy_from_slice(&desc.path_table_size.to_le_bytes());
    pvd[PVD_PATH_TABLE_SIZE_OFFSET + 4..PVD_PATH_TABLE_SIZE_OFFSET + 8]
        .copy_from_slice(&desc.path_table_size.to_be_bytes());

    pvd[PVD_L_PATH_TABLE_OFFSET..PVD_L_PATH_TABLE_OFFSET + 4]
        .copy_from_slice(&desc.l_path_table_lba.to_le_bytes());
    pvd[PVD_M_PATH_TABLE_OFFSET..PVD_M_PATH_TABLE_OFFSET + 4]
        .copy_from_slice(&desc.m_path_table_lba.to_be_bytes());

    let root_entry_bytes = desc.root_entry.to_bytes();
    debug_assert_eq!(root_entry_bytes.len(), ROOT_DIR_RECORD_LEN);
    pvd[PVD_ROOT_DIR_RECORD_OFFSET..PVD_ROOT_DIR_RECORD_OFFSET + root_entry_bytes.len()]
        .copy_from_slice(&root_entry_bytes);

    let app = b"ISOPACK";
    pvd[PVD_APPLICATION_ID_OFFSET..PVD_APPLICATION_ID_OFFSET + app.len()].copy_from_slice(app);

    let stamp = dec_datetime(desc.created);
    pvd[PVD_CREATION_DATE_OFFSET..PVD_CREATION_DATE_OFFSET + 17].copy_from_slice(&stamp);
    pvd[PVD_MODIFICATION_DATE_OFFSET..PVD_MODIFICATION_DATE_OFFSET + 17].copy_from_slice(&stamp);
    let unspecified = zero_dec_datetime();
    pvd[PVD_EXPIRATION_DATE_OFFSET..PVD_EXPIRATION_DATE_OFFSET + 17]
        .copy_from_slice(&unspecified);
    pvd[PVD_EFFECTIVE_DATE_OFFSET..PVD_EFFECTIVE_DATE_OFFSET + 17].copy_from_slice(&unspecified);

    pvd[PVD_FILE_STRUCTURE_VERSION_OFFSET] = 1;

    iso.write_all(&pvd)?;
    Ok(())
}

/// Rewrites the both-endian volume space size once the real sector count
/// is known.
pub fn update_total_sectors_in_pvd<W: Write + Seek>(
    iso: &mut W,
    base_lba: u32,
    total_sectors: u32,
) -> io::Result<()> {
    update_4byte_fields(
        iso,
        base_lba,
        PVD_TOTAL_SECTORS_OFFSET,
        PVD_TOTAL_SECTORS_OFFSET + 4,
        total_sectors,
    )
}

pub fn write_volume_descriptor_terminator<W: Write + Seek>(
    iso: &mut W,
    base_lba: u32,
) -> io::Result<()> {
    pad_to_lba(iso, base_lba)?;
    let mut term = [0u8; ISO_SECTOR_SIZE];
    term[0] = ISO_VOLUME_DESCRIPTOR_TERMINATOR;
    term[1..6].copy_from_slice(ISO_ID);
    term[6] = ISO_VERSION;
    iso.write_all(&term)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iso::dir_record::{FLAG_DIRECTORY, RecordingDate};
    use std::io::Cursor;

    fn sample_descriptor(created: OffsetDateTime) -> PrimaryVolumeDescriptor<'static> {
        PrimaryVolumeDescriptor {
            volume_id: "MYDISC",
            total_sectors: 100,
            path_table_size: 10,
            l_path_table_lba: 18,
            m_path_table_lba: 19,
            root_entry: IsoDirEntry {
                lba: 20,
                size: 2048,
                flags: FLAG_DIRECTORY,
                name: ".",
                recorded: RecordingDate::from_datetime(created),
            },
            created,
        }
    }

    fn sample_datetime() -> OffsetDateTime {
        time::Date::from_calendar_date(2024, time::Month::May, 17)
            .unwrap()
            .with_hms(12, 34, 56)
            .unwrap()
            .assume_utc()
    }

    #[test]
    fn test_primary_volume_descriptor_layout() -> io::Result<()> {
        let created = sample_datetime();
        let mut cursor = Cursor::new(Vec::new());
        write_primary_volume_descriptor(&mut cursor, &sample_descriptor(created), 0)?;
        let pvd = cursor.into_inner();
        assert_eq!(pvd.len(), ISO_SECTOR_SIZE);

        assert_eq!(pvd[0], ISO_VOLUME_DESCRIPTOR_PRIMARY);
        assert_eq!(&pvd[1..6], ISO_ID);
        assert_eq!(pvd[6], ISO_VERSION);
        assert!(pvd[PVD_SYSTEM_ID_OFFSET..40].iter().all(|&b| b == b' '));

        assert_eq!(&pvd[40..46], b"MYDISC");
        assert!(pvd[46..72].iter().all(|&b| b == b' '));

        assert_eq!(&pvd[80..84], &100u32.to_le_bytes());
        assert_eq!(&pvd[84..88], &100u32.to_be_bytes());
        assert_eq!(&pvd[128..130], &2048u16.to_le_bytes());
        assert_eq!(&pvd[130..132], &2048u16.to_be_bytes());
        assert_eq!(&pvd[132..136], &10u32.to_le_bytes());
        assert_eq!(&pvd[136..140], &10u32.to_be_bytes());
        assert_eq!(&pvd[140..144], &18u32.to_le_bytes());
        assert_eq!(&pvd[148..152], &19u32.to_be_bytes());

        // Root directory record: 34 bytes, one-byte 0x00 identifier.
        assert_eq!(pvd[PVD_ROOT_DIR_RECORD_OFFSET], 34);
        assert_eq!(pvd[PVD_ROOT_DIR_RECORD_OFFSET + 32], 1);
        assert_eq!(pvd[PVD_ROOT_DIR_RECORD_OFFSET + 33], 0);

        assert_eq!(&pvd[PVD_APPLICATION_ID_OFFSET..PVD_APPLICATION_ID_OFFSET + 7], b"ISOPACK");

        assert_eq!(
            &pvd[PVD_CREATION_DATE_OFFSET..PVD_CREATION_DATE_OFFSET + 16],
            b"2024051712345600"
        );
        assert_eq!(
            &pvd[PVD_EXPIRATION_DATE_OFFSET..PVD_EXPIRATION_DATE_OFFSET + 16],
            b"0000000000000000"
        );
        assert_eq!(pvd[PVD_FILE_STRUCTURE_VERSION_OFFSET], 1);
        Ok(())
    }

    #[test]
    fn test_update_total_sectors() -> io::Result<()> {
        let created = sample_datetime();
        let mut cursor = Cursor::new(Vec::new());
        write_primary_volume_descriptor(&mut cursor, &sample_descriptor(created), 0)?;
        update_total_sectors_in_pvd(&mut cursor, 0, 777)?;
        let pvd = cursor.into_inner();
        assert_eq!(&pvd[80..84], &777u32.to_le_bytes());
        assert_eq!(&pvd[84..88], &777u32.to_be_bytes());
        Ok(())
    }

    #[test]
    fn test_terminator() -> io::Result<()> {
        let mut cursor = Cursor::new(Vec::new());
        write_volume_descriptor_terminator(&mut cursor, 1)?;
        let data = cursor.into_inner();
        assert_eq!(data.len(), 2 * ISO_SECTOR_SIZE);
        assert_eq!(data[ISO_SECTOR_SIZE], ISO_VOLUME_DESCRIPTOR_TERMINATOR);
        assert_eq!(&data[ISO_SECTOR_SIZE + 1..ISO_SECTOR_SIZE + 6], ISO_ID);
        Ok(())
    }
}
