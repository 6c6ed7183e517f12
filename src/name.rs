// isopack/src/name.rs

use crate::error::{Error, Result};

/// Volume identifiers are a 32-byte field in the primary volume descriptor.
pub const MAX_LABEL_LEN: usize = 32;
/// ISO9660 limits the directory hierarchy to 8 levels below the root.
pub const MAX_NESTING_DEPTH: usize = 8;
/// ISO9660 limits a full path to 255 bytes.
pub const MAX_PATH_LEN: usize = 255;
/// Version suffix appended to every file identifier. Directories carry none.
pub const FILE_VERSION_SUFFIX: &str = ";1";

/// ISO9660 interchange level. Levels 1-3 restrict identifiers to
/// d-characters with classic length limits; level 4 relaxes both, the way
/// most mastering tools do for "ISO9660:1999" images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InterchangeLevel {
    Level1,
    Level2,
    Level3,
    #[default]
    Level4,
}

impl InterchangeLevel {
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Level1),
            2 => Some(Self::Level2),
            3 => Some(Self::Level3),
            4 => Some(Self::Level4),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::Level1 => 1,
            Self::Level2 => 2,
            Self::Level3 => 3,
            Self::Level4 => 4,
        }
    }

    /// Strict levels validate identifiers against the d-character set and
    /// the classic length limits.
    pub fn is_strict(self) -> bool {
        !matches!(self, Self::Level4)
    }
}

/// How host file names are folded into ISO identifiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NameCasing {
    /// Fold every name to upper case (the classic ISO9660 convention).
    #[default]
    Uppercase,
    /// Keep host casing. Only meaningful at interchange level 4; strict
    /// levels reject lower-case identifiers outright.
    Preserve,
}

/// Normalizes a volume label: upper-cased and truncated to 32 bytes, cut on
/// a character boundary. Oversized labels are truncated, never rejected.
pub fn normalize_label(label: &str) -> String {
    let upper = label.to_uppercase();
    let mut out = String::new();
    for ch in upper.chars() {
        if out.len() + ch.len_utf8() > MAX_LABEL_LEN {
            break;
        }
        out.push(ch);
    }
    out
}

/// Strips the `;1` version suffix from a file identifier, if present.
pub fn strip_version_suffix(name: &str) -> &str {
    name.strip_suffix(FILE_VERSION_SUFFIX).unwrap_or(name)
}

fn is_d_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
}

fn invalid(name: &str, reason: &str) -> Error {
    Error::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Maps one host path component to an ISO identifier (without any version
/// suffix), folding case and validating against the interchange level.
pub fn map_component(
    name: &str,
    level: InterchangeLevel,
    casing: NameCasing,
    is_dir: bool,
) -> Result<String> {
    if name.is_empty() {
        return Err(invalid(name, "empty name"));
    }
    let mapped = match casing {
        NameCasing::Uppercase => name.to_uppercase(),
        NameCasing::Preserve => name.to_string(),
    };
    if mapped.contains(';') || mapped.contains('/') || mapped.contains('\0') {
        return Err(invalid(name, "contains a reserved character"));
    }

    if !level.is_strict() {
        // Level 4: printable ASCII, generous length.
        if !mapped.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
            return Err(invalid(name, "contains a non-printable or non-ASCII character"));
        }
        if mapped.len() > 207 {
            return Err(invalid(name, "longer than 207 characters"));
        }
        return Ok(mapped);
    }

    // Levels 1-3: d-characters, at most one dot, and classic length limits.
    if is_dir {
        if !mapped.chars().all(is_d_char) {
            return Err(invalid(name, "directory names allow only A-Z, 0-9 and _"));
        }
        let max = if level == InterchangeLevel::Level1 { 8 } else { 31 };
        if mapped.len() > max {
            return Err(invalid(name, "directory name too long for this level"));
        }
        return Ok(mapped);
    }

    let (base, ext) = match mapped.split_once('.') {
        Some((base, ext)) => (base, ext),
        None => (mapped.as_str(), ""),
    };
    if ext.contains('.') {
        return Err(invalid(name, "more than one dot"));
    }
    if !base.chars().all(is_d_char) || !ext.chars().all(is_d_char) {
        return Err(invalid(name, "file names allow only A-Z, 0-9, _ and one dot"));
    }
    match level {
        InterchangeLevel::Level1 => {
            if base.len() > 8 || ext.len() > 3 {
                return Err(invalid(name, "does not fit the 8.3 convention"));
            }
        }
        _ => {
            if mapped.len() > 31 {
                return Err(invalid(name, "file name too long for this level"));
            }
        }
    }
    Ok(mapped)
}
