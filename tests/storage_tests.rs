// SPDX-License-Identifier: MPL-2.0

//! Integration tests for gallery storage

use astrocam::storage;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_scan_sorts_numerically() {
    let dir = TempDir::new().expect("tempdir");
    for name in ["DSCF0100.JPG", "DSCF0002.JPG", "DSCF0010.JPG"] {
        fs::write(dir.path().join(name), b"x").expect("seed");
    }
    // Non-matching names are ignored
    for name in ["IMG_0001.JPG", "DSCF02.JPG", "DSCF0003.jpeg", "notes.txt"] {
        fs::write(dir.path().join(name), b"x").expect("seed");
    }

    let photos = storage::scan_gallery(dir.path());
    let names: Vec<_> = photos
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .collect();
    assert_eq!(names, vec!["DSCF0002.JPG", "DSCF0010.JPG", "DSCF0100.JPG"]);
}

#[test]
fn test_next_sequence() {
    let dir = TempDir::new().expect("tempdir");
    assert_eq!(storage::next_sequence(dir.path()), 0);

    fs::write(dir.path().join("DSCF0041.JPG"), b"x").expect("seed");
    assert_eq!(storage::next_sequence(dir.path()), 42);

    fs::write(dir.path().join("DSCF9999.JPG"), b"x").expect("seed");
    assert_eq!(storage::next_sequence(dir.path()), 0);
}

#[test]
fn test_missing_directory_is_empty() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("nope");
    assert!(storage::scan_gallery(&missing).is_empty());
    assert_eq!(storage::next_sequence(&missing), 0);
}

#[test]
fn test_import_capture() {
    let dir = TempDir::new().expect("tempdir");
    let temp = dir.path().join("capture.jpg");
    fs::write(&temp, b"jpeg bytes").expect("temp");

    let dest = storage::import_capture(&temp, dir.path(), 7).expect("import");
    assert_eq!(dest, dir.path().join("DSCF0007.JPG"));
    assert_eq!(fs::read(dest).expect("read"), b"jpeg bytes");
    // The temporary file stays in place for the next overwrite
    assert!(temp.exists());
}

#[test]
fn test_delete_photo() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("DSCF0001.JPG");
    fs::write(&path, b"x").expect("seed");

    storage::delete_photo(&path).expect("delete");
    assert!(!path.exists());
    assert!(storage::delete_photo(&path).is_err());
}
