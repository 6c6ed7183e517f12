// isopack/src/iso/mod.rs
pub mod builder;
pub mod dir_record;
pub mod fs_node;
pub mod image;
pub mod path_table;
pub mod reader;
pub mod volume_descriptor;
pub mod writer;

pub use self::builder::{IsoBuilder, VolumeOptions};
pub use self::image::{IsoImage, IsoImageFile};
pub use self::reader::{IsoEntry, IsoReader};
