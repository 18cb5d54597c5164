// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for the photo gallery
//!
//! Gallery files are named `DSCF####.JPG` with a four-digit sequence
//! number that wraps 9999 -> 0000. The sequence is discovered by scanning
//! the media directory and sorting numerically; no index file exists.

use crate::constants::capture;
use crate::errors::AppResult;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default media directory for captured photos
pub fn default_media_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("astrocam")
}

/// Parse the sequence number out of a gallery file name
fn sequence_of(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_prefix(capture::FILE_PREFIX)?;
    let digits = stem.strip_suffix(&format!(".{}", capture::FILE_EXTENSION))?;
    if digits.len() != 4 {
        return None;
    }
    digits.parse().ok()
}

/// List the gallery photos in numeric sequence order
///
/// Files that do not match the `DSCF####.JPG` pattern are ignored.
pub fn scan_gallery(dir: &Path) -> Vec<PathBuf> {
    let mut photos: Vec<(u32, PathBuf)> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .filter_map(|e| {
                let path = e.path();
                sequence_of(&path).map(|seq| (seq, path))
            })
            .collect(),
        Err(_) => Vec::new(),
    };

    photos.sort_by_key(|(seq, _)| *seq);
    photos.into_iter().map(|(_, path)| path).collect()
}

/// Next free sequence number for the media directory
///
/// One past the highest existing number, wrapping at 10000. An empty
/// directory starts the sequence at 0.
pub fn next_sequence(dir: &Path) -> u32 {
    let next = scan_gallery(dir)
        .iter()
        .filter_map(|p| sequence_of(p))
        .max()
        .map(|max| (max + 1) % capture::SEQUENCE_MODULO)
        .unwrap_or(0);

    debug!(dir = %dir.display(), next, "Seeded gallery sequence");
    next
}

/// Gallery path for a sequence number
pub fn photo_path(dir: &Path, sequence: u32) -> PathBuf {
    dir.join(format!(
        "{}{:04}.{}",
        capture::FILE_PREFIX,
        sequence,
        capture::FILE_EXTENSION
    ))
}

/// Copy a finished temporary capture into the gallery
pub fn import_capture(temp: &Path, dir: &Path, sequence: u32) -> AppResult<PathBuf> {
    let dest = photo_path(dir, sequence);
    std::fs::copy(temp, &dest)?;
    Ok(dest)
}

/// Delete a gallery photo
pub fn delete_photo(path: &Path) -> AppResult<()> {
    std::fs::remove_file(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_parsing() {
        assert_eq!(sequence_of(Path::new("/m/DSCF0042.JPG")), Some(42));
        assert_eq!(sequence_of(Path::new("/m/DSCF9999.JPG")), Some(9999));
        assert_eq!(sequence_of(Path::new("/m/DSCF042.JPG")), None);
        assert_eq!(sequence_of(Path::new("/m/IMG_0042.JPG")), None);
        assert_eq!(sequence_of(Path::new("/m/DSCF0042.jpeg")), None);
    }

    #[test]
    fn test_photo_path_format() {
        let path = photo_path(Path::new("/media"), 7);
        assert_eq!(path, PathBuf::from("/media/DSCF0007.JPG"));
    }
}
