use std::collections::BTreeSet;
use std::fs::File;

use isopack::{
    InterchangeLevel, IsoReader, NameCasing, NoProgress, PackOptions, Result, pack_directory,
};
use tempfile::tempdir;

use crate::integration_tests::common::write_tree;

fn list_paths(iso_path: &std::path::Path) -> Result<BTreeSet<(String, bool)>> {
    let mut reader = IsoReader::open(File::open(iso_path)?)?;
    Ok(reader
        .list_entries()?
        .into_iter()
        .map(|entry| (entry.path, entry.is_dir))
        .collect())
}

#[test]
fn test_round_trip_lists_every_entry() -> Result<()> {
    let temp_dir = tempdir()?;
    let source = temp_dir.path().join("archive");
    write_tree(
        &source,
        &[
            ("docs/readme.md", b"hello".as_slice()),
            ("docs/img/logo.png", b"\x89PNG".as_slice()),
            ("notes.txt", b"note".as_slice()),
        ],
    )?;

    let iso_path = temp_dir.path().join("archive.iso");
    pack_directory(&source, &iso_path, &PackOptions::default(), &mut NoProgress)?;

    let expected: BTreeSet<(String, bool)> = [
        ("/ARCHIVE", true),
        ("/ARCHIVE/DOCS", true),
        ("/ARCHIVE/DOCS/IMG", true),
        ("/ARCHIVE/DOCS/IMG/LOGO.PNG;1", false),
        ("/ARCHIVE/DOCS/README.MD;1", false),
        ("/ARCHIVE/NOTES.TXT;1", false),
    ]
    .into_iter()
    .map(|(path, is_dir)| (path.to_string(), is_dir))
    .collect();

    assert_eq!(list_paths(&iso_path)?, expected);
    Ok(())
}

#[test]
fn test_empty_directory_round_trips() -> Result<()> {
    let temp_dir = tempdir()?;
    let source = temp_dir.path().join("empty");
    std::fs::create_dir(&source)?;

    let iso_path = temp_dir.path().join("empty.iso");
    let summary = pack_directory(&source, &iso_path, &PackOptions::default(), &mut NoProgress)?;

    assert_eq!(summary.file_count, 0);
    assert_eq!(summary.directory_count, 1);
    // System area, two descriptors, two path tables, root and the one
    // empty directory extent.
    assert_eq!(summary.total_sectors, 22);

    let expected: BTreeSet<(String, bool)> =
        [("/EMPTY".to_string(), true)].into_iter().collect();
    assert_eq!(list_paths(&iso_path)?, expected);
    Ok(())
}

#[test]
fn test_same_tree_packs_identical_listings() -> Result<()> {
    let temp_dir = tempdir()?;
    let source = temp_dir.path().join("stuff");
    write_tree(&source, &[("a.txt", b"a"), ("sub/b.txt", b"b")])?;

    let first = temp_dir.path().join("first.iso");
    let second = temp_dir.path().join("second.iso");
    pack_directory(&source, &first, &PackOptions::default(), &mut NoProgress)?;
    pack_directory(&source, &second, &PackOptions::default(), &mut NoProgress)?;

    assert_eq!(list_paths(&first)?, list_paths(&second)?);
    Ok(())
}

#[test]
fn test_preserve_case_keeps_source_names() -> Result<()> {
    let temp_dir = tempdir()?;
    let source = temp_dir.path().join("Mixed");
    write_tree(&source, &[("Docs/ReadMe.md", b"hi".as_slice())])?;

    let iso_path = temp_dir.path().join("mixed.iso");
    let options = PackOptions {
        level: InterchangeLevel::Level4,
        casing: NameCasing::Preserve,
        ..PackOptions::default()
    };
    pack_directory(&source, &iso_path, &options, &mut NoProgress)?;

    let expected: BTreeSet<(String, bool)> = [
        ("/Mixed".to_string(), true),
        ("/Mixed/Docs".to_string(), true),
        ("/Mixed/Docs/ReadMe.md;1".to_string(), false),
    ]
    .into_iter()
    .collect();
    assert_eq!(list_paths(&iso_path)?, expected);
    Ok(())
}

#[test]
fn test_strict_level_rejects_long_names() -> Result<()> {
    let temp_dir = tempdir()?;
    let source = temp_dir.path().join("stuff");
    write_tree(&source, &[("averylongfilename.txt", b"x".as_slice())])?;

    let iso_path = temp_dir.path().join("stuff.iso");
    let options = PackOptions {
        level: InterchangeLevel::Level1,
        ..PackOptions::default()
    };
    let result = pack_directory(&source, &iso_path, &options, &mut NoProgress);

    assert!(result.is_err());
    assert!(!iso_path.exists());
    Ok(())
}
