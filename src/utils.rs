// isopack/src/utils.rs

pub const ISO_SECTOR_SIZE: usize = 2048;

use std::io::{self, Read, Seek, Write};

/// Pads the image with zeros to align the write position to a specific LBA.
/// Extents are always written in ascending order; a position already past
/// the target means an extent was assigned out of order.
pub fn pad_to_lba<W: Write + Seek>(iso: &mut W, lba: u32) -> io::Result<()> {
    let target_pos = lba as u64 * ISO_SECTOR_SIZE as u64;
    let current_pos = iso.stream_position()?;
    if current_pos > target_pos {
        return Err(io::Error::other(format!(
            "write position {current_pos} is already past LBA {lba}"
        )));
    }
    io::copy(&mut io::repeat(0).take(target_pos - current_pos), iso)?;
    Ok(())
}

/// Pads the image with zeros up to the next sector boundary, if it is not
/// already on one.
pub fn pad_to_sector_boundary<W: Write + Seek>(iso: &mut W) -> io::Result<()> {
    let current_pos = iso.stream_position()?;
    let remainder = current_pos % ISO_SECTOR_SIZE as u64;
    if remainder != 0 {
        let padding_bytes = ISO_SECTOR_SIZE as u64 - remainder;
        io::copy(&mut io::repeat(0).take(padding_bytes), iso)?;
    }
    Ok(())
}
