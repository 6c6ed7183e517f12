use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
};

use isopack::{IsoReader, NoProgress, PackOptions, Result, pack_directory};
use tempfile::tempdir;

use crate::integration_tests::common::{ISO_SECTOR_SIZE, write_tree};

fn read_sector(iso_file: &mut File, lba: u64) -> std::io::Result<[u8; 2048]> {
    let mut sector = [0u8; 2048];
    iso_file.seek(SeekFrom::Start(lba * ISO_SECTOR_SIZE))?;
    iso_file.read_exact(&mut sector)?;
    Ok(sector)
}

fn u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap())
}

fn u32_be(buf: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap())
}

#[test]
fn test_pvd_fields_agree_in_both_byte_orders() -> Result<()> {
    let temp_dir = tempdir()?;
    let source = temp_dir.path().join("stuff");
    write_tree(&source, &[("a.txt", b"a")])?;

    let iso_path = temp_dir.path().join("stuff.iso");
    let summary = pack_directory(&source, &iso_path, &PackOptions::default(), &mut NoProgress)?;

    let mut iso_file = File::open(&iso_path)?;
    let file_len = iso_file.metadata()?.len();
    let pvd = read_sector(&mut iso_file, 16)?;

    // Total sectors, recorded little endian then big endian, must agree
    // with each other and with the file length.
    let total_le = u32_le(&pvd, 80);
    let total_be = u32_be(&pvd, 84);
    assert_eq!(total_le, total_be);
    assert_eq!(file_len, total_le as u64 * ISO_SECTOR_SIZE);
    assert_eq!(total_le, summary.total_sectors);

    // Volume set size and sequence number are both 1.
    assert_eq!(&pvd[120..124], &[1, 0, 0, 1]);
    assert_eq!(&pvd[124..128], &[1, 0, 0, 1]);

    // Logical block size is 2048.
    assert_eq!(&pvd[128..132], &[0x00, 0x08, 0x08, 0x00]);

    // Two directories (root and STUFF) make a 24 byte path table.
    assert_eq!(u32_le(&pvd, 132), 24);
    assert_eq!(u32_be(&pvd, 136), 24);
    assert_eq!(u32_le(&pvd, 140), 18, "L path table LBA");
    assert_eq!(u32_be(&pvd, 148), 19, "M path table LBA");

    assert_eq!(pvd[881], 1, "file structure version");
    Ok(())
}

#[test]
fn test_unlabeled_volume_id_is_blank() -> Result<()> {
    let temp_dir = tempdir()?;
    let source = temp_dir.path().join("stuff");
    write_tree(&source, &[("a.txt", b"a")])?;

    let iso_path = temp_dir.path().join("stuff.iso");
    pack_directory(&source, &iso_path, &PackOptions::default(), &mut NoProgress)?;

    let mut iso_file = File::open(&iso_path)?;
    let pvd = read_sector(&mut iso_file, 16)?;
    assert_eq!(&pvd[40..72], [b' '; 32].as_slice());

    let mut reader = IsoReader::open(File::open(&iso_path)?)?;
    assert_eq!(reader.volume_id(), "");
    assert_eq!(reader.list_entries()?.len(), 2);
    Ok(())
}

#[test]
fn test_long_label_truncated_to_32_on_disk() -> Result<()> {
    let temp_dir = tempdir()?;
    let source = temp_dir.path().join("stuff");
    write_tree(&source, &[("a.txt", b"a")])?;

    let iso_path = temp_dir.path().join("stuff.iso");
    let options = PackOptions {
        volume_label: Some("my backup disc with a very long label".to_string()),
        ..PackOptions::default()
    };
    let summary = pack_directory(&source, &iso_path, &options, &mut NoProgress)?;
    assert_eq!(summary.volume_id.len(), 32);

    let mut iso_file = File::open(&iso_path)?;
    let pvd = read_sector(&mut iso_file, 16)?;
    assert_eq!(&pvd[40..72], b"MY BACKUP DISC WITH A VERY LONG ");

    // The reader trims the field's space padding.
    let reader = IsoReader::open(File::open(&iso_path)?)?;
    assert_eq!(reader.volume_id(), "MY BACKUP DISC WITH A VERY LONG");
    Ok(())
}

#[test]
fn test_path_tables_mirror_each_other() -> Result<()> {
    let temp_dir = tempdir()?;
    let source = temp_dir.path().join("stuff");
    write_tree(&source, &[("a.txt", b"a")])?;

    let iso_path = temp_dir.path().join("stuff.iso");
    pack_directory(&source, &iso_path, &PackOptions::default(), &mut NoProgress)?;

    let mut iso_file = File::open(&iso_path)?;
    let l_table = read_sector(&mut iso_file, 18)?;
    let m_table = read_sector(&mut iso_file, 19)?;

    // Root record: identifier length 1, a single zero byte identifier,
    // parent 1, extent at LBA 20, padded to an even length.
    assert_eq!(&l_table[0..10], &[1, 0, 20, 0, 0, 0, 1, 0, 0, 0]);
    assert_eq!(&m_table[0..10], &[1, 0, 0, 0, 0, 20, 0, 1, 0, 0]);

    // The STUFF record follows, parented to the root.
    assert_eq!(
        &l_table[10..24],
        &[5, 0, 21, 0, 0, 0, 1, 0, b'S', b'T', b'U', b'F', b'F', 0]
    );
    assert_eq!(
        &m_table[10..24],
        &[5, 0, 0, 0, 0, 21, 0, 1, b'S', b'T', b'U', b'F', b'F', 0]
    );
    Ok(())
}

#[test]
fn test_large_directory_spans_multiple_sectors() -> Result<()> {
    let temp_dir = tempdir()?;
    let source = temp_dir.path().join("bulk");
    let names: Vec<String> = (0..80).map(|i| format!("file{i:02}.txt")).collect();
    let files: Vec<(&str, &[u8])> = names
        .iter()
        .map(|name| (name.as_str(), b"x".as_slice()))
        .collect();
    write_tree(&source, &files)?;

    let iso_path = temp_dir.path().join("bulk.iso");
    pack_directory(&source, &iso_path, &PackOptions::default(), &mut NoProgress)?;

    let mut reader = IsoReader::open(File::open(&iso_path)?)?;
    let entries = reader.list_entries()?;

    let bulk = entries.iter().find(|e| e.path == "/BULK").unwrap();
    assert!(bulk.is_dir);
    assert_eq!(bulk.size, 4096, "80 records need a second sector");

    let files_listed: Vec<&str> = entries
        .iter()
        .filter(|e| !e.is_dir)
        .map(|e| e.path.as_str())
        .collect();
    assert_eq!(files_listed.len(), 80);
    assert_eq!(files_listed[0], "/BULK/FILE00.TXT;1");
    assert_eq!(files_listed[79], "/BULK/FILE79.TXT;1");
    Ok(())
}
