use std::collections::HashMap;
use std::path::PathBuf;

/// Represents a file within the ISO filesystem.
#[derive(Clone, Debug)]
pub struct IsoFile {
    /// Host path the content is copied from.
    pub path: PathBuf,
    pub size: u64,
    pub lba: u32,
}

/// Represents a directory within the ISO filesystem. The extent size is
/// computed before LBA assignment; a fresh directory has none.
pub struct IsoDirectory {
    pub children: HashMap<String, IsoFsNode>,
    pub lba: u32,
    /// Extent size in bytes, always a whole number of sectors once computed.
    pub size: u32,
}

impl Default for IsoDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl IsoDirectory {
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            lba: 0,
            size: 0,
        }
    }

    /// Children in identifier order, the order records and extents are laid
    /// out on disk.
    pub fn sorted_children(&self) -> Vec<(&String, &IsoFsNode)> {
        let mut children: Vec<_> = self.children.iter().collect();
        children.sort_by_key(|(name, _)| *name);
        children
    }
}

/// A node in the ISO filesystem tree, either a file or a directory.
pub enum IsoFsNode {
    File(IsoFile),
    Directory(IsoDirectory),
}

impl IsoFsNode {
    /// Returns the LBA of the node.
    pub fn lba(&self) -> u32 {
        match self {
            IsoFsNode::File(file) => file.lba,
            IsoFsNode::Directory(dir) => dir.lba,
        }
    }

    /// Returns the size of the node in bytes.
    pub fn size(&self) -> u64 {
        match self {
            IsoFsNode::File(file) => file.size,
            IsoFsNode::Directory(dir) => dir.size as u64,
        }
    }
}
