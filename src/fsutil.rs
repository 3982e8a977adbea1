//! Crash-safe file writes.
//!
//! Data goes to a temporary file in the destination's directory, is synced,
//! and only then renamed into place, so readers see either the old contents
//! or the new ones and never a torn write.

use std::{io::Write, path::Path};

use tempfile::NamedTempFile;

fn staged_temp(path: &Path, data: &[u8]) -> std::io::Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

/// Atomically replaces the contents of `path`.
pub fn replace(path: &Path, data: &[u8]) -> std::io::Result<()> {
    staged_temp(path, data)?
        .persist(path)
        .map_err(|err| err.error)?;
    Ok(())
}

/// Atomically creates `path`, failing with [`std::io::ErrorKind::AlreadyExists`]
/// if something is already there.
pub fn create_new(path: &Path, data: &[u8]) -> std::io::Result<()> {
    staged_temp(path, data)?
        .persist_noclobber(path)
        .map_err(|err| err.error)?;
    Ok(())
}

#[test]
fn test_replace_overwrites() {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("HEAD");
    replace(&path, b"main").unwrap();
    replace(&path, b"dev").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "dev");
}

#[test]
fn test_create_new_refuses_existing() {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("object");
    create_new(&path, b"one").unwrap();
    let err = create_new(&path, b"two").unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::AlreadyExists);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "one");
}
