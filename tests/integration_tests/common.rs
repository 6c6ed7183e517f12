use std::{
    fs::{self, File},
    io::{self, Read, Seek, SeekFrom},
    path::Path,
};

pub const ISO_SECTOR_SIZE: u64 = 2048;

/// Creates `files` under `root`, making parent directories as needed.
pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) -> io::Result<()> {
    fs::create_dir_all(root)?;
    for (relative, contents) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
    }
    Ok(())
}

/// Verifies critical binary structures within the generated ISO file.
pub fn verify_iso_binary_structures(iso_file: &mut File) -> io::Result<()> {
    // 1. Verify Primary Volume Descriptor (PVD) at LBA 16
    iso_file.seek(SeekFrom::Start(16 * ISO_SECTOR_SIZE))?;
    let mut pvd_header = [0u8; 6];
    iso_file.read_exact(&mut pvd_header)?;
    assert_eq!(
        &pvd_header,
        &[0x01, b'C', b'D', b'0', b'0', b'1'],
        "PVD identifier 'CD001' not found at LBA 16"
    );

    // 2. Verify the volume descriptor set terminator at LBA 17
    iso_file.seek(SeekFrom::Start(17 * ISO_SECTOR_SIZE))?;
    let mut terminator = [0u8; 7];
    iso_file.read_exact(&mut terminator)?;
    assert_eq!(
        &terminator,
        &[0xFF, b'C', b'D', b'0', b'0', b'1', 0x01],
        "volume descriptor set terminator not found at LBA 17"
    );

    Ok(())
}

/// Reads `size` bytes starting at sector `lba`.
pub fn read_file_at(iso_file: &mut File, lba: u32, size: u32) -> io::Result<Vec<u8>> {
    iso_file.seek(SeekFrom::Start(lba as u64 * ISO_SECTOR_SIZE))?;
    let mut data = vec![0u8; size as usize];
    iso_file.read_exact(&mut data)?;
    Ok(data)
}
