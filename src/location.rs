//! Conversion between filesystem paths and rekordbox Location URIs.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Host prefix rekordbox uses for local files.
pub const LOCATION_PREFIX: &str = "file://localhost";

// Spaces are the only character this pipeline escapes; the decoder reverses
// exactly that subset, keeping the round-trip lossless.
const LOCATION_SET: &AsciiSet = &CONTROLS.add(b' ');

/// Convert a filesystem path to a rekordbox Location URI.
/// e.g. `/My Music/Song One.mp3` → `file://localhost/My%20Music/Song%20One.mp3`
pub fn path_to_location(path: &str) -> String {
    let encoded = utf8_percent_encode(path, LOCATION_SET).to_string();
    format!("{LOCATION_PREFIX}{encoded}")
}

/// Convert a rekordbox Location URI back to a filesystem path.
/// Only the documented `%20` escape is decoded.
pub fn location_to_path(location: &str) -> String {
    let stripped = location
        .strip_prefix(LOCATION_PREFIX)
        .or_else(|| location.strip_prefix("file://"))
        .unwrap_or(location);
    stripped.replace("%20", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_spaces() {
        assert_eq!(
            path_to_location("/My Music/Song One.mp3"),
            "file://localhost/My%20Music/Song%20One.mp3"
        );
    }

    #[test]
    fn path_without_spaces_is_prefixed_verbatim() {
        assert_eq!(
            path_to_location("/music/track.flac"),
            "file://localhost/music/track.flac"
        );
    }

    #[test]
    fn decodes_only_the_space_escape() {
        assert_eq!(
            location_to_path("file://localhost/My%20Music/a%26b.mp3"),
            "/My Music/a%26b.mp3"
        );
    }

    #[test]
    fn round_trip_is_exact() {
        let path = "/My Music/Song One.mp3";
        assert_eq!(location_to_path(&path_to_location(path)), path);
    }

    #[test]
    fn bare_file_scheme_is_stripped() {
        assert_eq!(location_to_path("file:///music/track.mp3"), "/music/track.mp3");
    }
}
