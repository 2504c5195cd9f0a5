//! Audio metadata access via `lofty`: comment extraction for the parser and
//! per-category field writes for the two supported containers (FLAC Vorbis
//! Comments, MP3 ID3v2).

use std::path::Path;

use lofty::config::{ParseOptions, ParsingMode, WriteOptions};
use lofty::file::TaggedFileExt;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag};

use crate::categorize::CategorizedTags;
use crate::config::Category;

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// lofty open/read/write failures.
    #[error("{0}")]
    Io(String),
    /// Missing file or a container outside flac/mp3.
    #[error("{0}")]
    Unsupported(String),
}

/// Map a configured metadata field name to the `ItemKey` it is written
/// under. Names are matched case-insensitively; `publisher` and `label`
/// both land on the publisher frame (TPUB on MP3).
///
/// Names outside the table become `ItemKey::Unknown`, which lofty stores as
/// a verbatim key on FLAC and a TXXX name/value frame on MP3 — an
/// unmappable field is degraded to a custom field, never a failure.
pub fn field_to_item_key(field: &str) -> ItemKey {
    match field.to_ascii_lowercase().as_str() {
        "artist" => ItemKey::TrackArtist,
        "title" => ItemKey::TrackTitle,
        "album" => ItemKey::AlbumTitle,
        "album_artist" | "albumartist" => ItemKey::AlbumArtist,
        "genre" => ItemKey::Genre,
        "comment" => ItemKey::Comment,
        "publisher" | "label" => ItemKey::Label,
        "composer" => ItemKey::Composer,
        "remixer" => ItemKey::Remixer,
        "grouping" => ItemKey::ContentGroup,
        "mood" => ItemKey::Mood,
        "key" => ItemKey::InitialKey,
        _ => ItemKey::Unknown(field.to_string()),
    }
}

/// Build `ParseOptions` with sensible defaults. Cover art must be read so
/// existing pictures survive the write round-trip.
fn parse_options() -> ParseOptions {
    ParseOptions::new()
        .read_cover_art(true)
        .parsing_mode(ParsingMode::BestAttempt)
}

fn open(path: &Path) -> Result<lofty::file::TaggedFile, TagError> {
    Probe::open(path)
        .map_err(|e| TagError::Io(format!("Failed to open {}: {e}", path.display())))?
        .options(parse_options())
        .read()
        .map_err(|e| TagError::Io(format!("Failed to read {}: {e}", path.display())))
}

/// All comment values carried by the file, flattened in tag order.
///
/// FLAC stores a list of COMMENT values in one Vorbis tag; an MP3 may carry
/// any number of COMM frames. Both surface here as one ordered list. A file
/// with no tags at all yields an empty list.
pub fn read_comments(path: &Path) -> Result<Vec<String>, TagError> {
    let tagged_file = open(path)?;
    let mut comments = Vec::new();
    for tag in tagged_file.tags() {
        comments.extend(tag.get_strings(&ItemKey::Comment).map(str::to_string));
    }
    Ok(comments)
}

/// Write each category's joined tags into its configured metadata field,
/// then save the file once.
///
/// Categories with no configured field or no tags this run leave the file
/// untouched, and values under other keys are preserved. Writing the
/// comment field replaces all prior comment values. Returns the number of
/// fields written.
pub fn write_category_fields(
    path: &Path,
    categorized: &CategorizedTags,
    categories: &[Category],
    delimiter: &str,
) -> Result<usize, TagError> {
    let mut tagged_file = open(path)?;
    let tag_type = tagged_file.file_type().primary_tag_type();
    let tag = match tagged_file.tag_mut(tag_type) {
        Some(t) => t,
        None => {
            // Files with no tags at all get a fresh primary tag.
            tagged_file.insert_tag(Tag::new(tag_type));
            tagged_file.tag_mut(tag_type).ok_or_else(|| {
                TagError::Unsupported(format!(
                    "{} does not support {tag_type:?} tags",
                    path.display()
                ))
            })?
        }
    };

    let mut written = 0;
    for category in categories {
        let Some(field) = category.metadata_field.as_deref() else {
            continue;
        };
        let Some(value) = categorized.joined(&category.name, delimiter) else {
            continue;
        };
        tag.insert_text(field_to_item_key(field), value);
        written += 1;
    }

    if written > 0 {
        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| TagError::Io(format!("Failed to write {}: {e}", path.display())))?;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorize::categorize;
    use lofty::tag::TagType;

    /// `fLaC` marker plus a lone STREAMINFO block (44.1 kHz, stereo,
    /// 16-bit, no audio frames) — the smallest file lofty will parse.
    fn write_minimal_flac(path: &Path) {
        let mut data = Vec::new();
        data.extend_from_slice(b"fLaC");
        data.push(0x80); // last-metadata-block flag, block type 0
        data.extend_from_slice(&[0x00, 0x00, 0x22]);
        data.extend_from_slice(&[0x10, 0x00, 0x10, 0x00]); // min/max block size 4096
        data.extend_from_slice(&[0x00; 6]); // frame sizes unknown
        data.extend_from_slice(&[0x0A, 0xC4, 0x42, 0xF0]); // 44100 Hz, 2 ch, 16 bps
        data.extend_from_slice(&[0x00; 4]); // total samples unknown
        data.extend_from_slice(&[0x00; 16]); // md5 unset
        std::fs::write(path, data).unwrap();
    }

    #[test]
    fn well_known_fields_map_to_frames() {
        assert_eq!(field_to_item_key("GENRE"), ItemKey::Genre);
        assert_eq!(field_to_item_key("genre"), ItemKey::Genre);
        assert_eq!(field_to_item_key("COMMENT"), ItemKey::Comment);
        assert_eq!(field_to_item_key("Artist"), ItemKey::TrackArtist);
    }

    #[test]
    fn publisher_and_label_share_the_publisher_frame() {
        assert_eq!(field_to_item_key("PUBLISHER"), ItemKey::Label);
        assert_eq!(field_to_item_key("LABEL"), ItemKey::Label);
    }

    #[test]
    fn unknown_field_falls_back_to_custom_key() {
        assert_eq!(
            field_to_item_key("SITUATION"),
            ItemKey::Unknown("SITUATION".to_string())
        );
    }

    #[test]
    fn unreadable_file_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.mp3");
        std::fs::write(&path, b"not an audio file").unwrap();
        assert!(read_comments(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_comments(Path::new("/nonexistent/a.flac")).is_err());
    }

    #[test]
    fn genre_tag_round_trips_through_a_flac_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.flac");
        write_minimal_flac(&path);

        // Seed the comment field the way a user tags in rekordbox.
        let mut seeded = Tag::new(TagType::VorbisComments);
        seeded.insert_text(ItemKey::Comment, "/* House */".to_string());
        seeded.save_to_path(&path, WriteOptions::default()).unwrap();

        assert_eq!(read_comments(&path).unwrap(), vec!["/* House */"]);

        let schema = vec![Category {
            name: "Genre".to_string(),
            tags: vec!["House".to_string()],
            metadata_field: Some("GENRE".to_string()),
            rekordbox_field: None,
        }];
        let categorized = categorize(&["House".to_string()], &schema);
        let written = write_category_fields(&path, &categorized, &schema, " / ").unwrap();
        assert_eq!(written, 1);

        let reread = open(&path).unwrap();
        let tag = reread.primary_tag().unwrap();
        assert_eq!(tag.get_string(&ItemKey::Genre), Some("House"));
        // Writing the genre must not clobber the seeded comment.
        assert_eq!(tag.get_string(&ItemKey::Comment), Some("/* House */"));
    }

    #[test]
    fn unknown_field_is_written_as_a_custom_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.flac");
        write_minimal_flac(&path);

        // No tags yet, so the writer has to create the primary tag itself.
        let schema = vec![Category {
            name: "Situation".to_string(),
            tags: vec!["Peak Time".to_string()],
            metadata_field: Some("SITUATION".to_string()),
            rekordbox_field: None,
        }];
        let categorized = categorize(&["Peak Time".to_string()], &schema);
        let written = write_category_fields(&path, &categorized, &schema, " / ").unwrap();
        assert_eq!(written, 1);

        let reread = open(&path).unwrap();
        let tag = reread.primary_tag().unwrap();
        assert_eq!(
            tag.get_string(&ItemKey::Unknown("SITUATION".to_string())),
            Some("Peak Time")
        );
    }
}
