//! Directory-mode file discovery.
//!
//! Catalog mode gets its file list from the rekordbox collection instead —
//! see `catalog::track_paths`.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Extensions of the two supported tag containers.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["flac", "mp3"];

/// Case-insensitive extension check against the supported containers.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Every supported audio file under `root`, recursively. Unreadable entries
/// are skipped; an empty result is valid.
pub fn from_directory(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_supported(path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_supported(Path::new("/m/a.flac")));
        assert!(is_supported(Path::new("/m/a.FLAC")));
        assert!(is_supported(Path::new("/m/a.Mp3")));
        assert!(!is_supported(Path::new("/m/a.wav")));
        assert!(!is_supported(Path::new("/m/noext")));
    }

    #[test]
    fn walk_finds_supported_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.flac"), b"x").unwrap();
        std::fs::write(dir.path().join("sub/b.MP3"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let mut found = from_directory(dir.path());
        found.sort();
        assert_eq!(
            found,
            vec![dir.path().join("a.flac"), dir.path().join("sub/b.MP3")]
        );
    }

    #[test]
    fn empty_directory_yields_no_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(from_directory(dir.path()).is_empty());
    }
}
