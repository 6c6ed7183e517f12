// isopack/src/lib.rs

//! Pack a directory tree into a plain ISO 9660 disc image.
//!
//! The library walks a source directory, plans the image layout under a
//! single top-level directory named after the source, and writes a
//! conformant ISO 9660 volume: primary volume descriptor, little and big
//! endian path tables, directory extents, and file data. [`pack_directory`]
//! runs the whole pipeline; the pieces under [`iso`] are public for callers
//! that need finer control or want to inspect an image with [`IsoReader`].

pub mod error;
pub mod iso;
pub mod name;
pub mod pack;
pub mod progress;
pub mod scan;
pub mod utils;

pub use crate::error::{Error, Result};
pub use crate::iso::{
    IsoBuilder, IsoEntry, IsoImage, IsoImageFile, IsoReader, VolumeOptions,
};
pub use crate::name::{InterchangeLevel, NameCasing};
pub use crate::pack::{
    PackOptions, PackSummary, default_image_name, ensure_iso_extension, pack_directory,
};
pub use crate::progress::{NoProgress, Progress};
pub use crate::scan::{SourceTree, count_files};
