//! The per-file synchronization pipeline.
//!
//! Loads both stores once, then for each file: read comments → extract
//! tokens → classify → write metadata fields → union into the tag database
//! → mirror into the rekordbox collection (catalog mode only). Each store is
//! rewritten after a file that touched it, so an interrupted run leaves
//! every flushed store valid and a rerun is safe by idempotence.

use std::path::{Path, PathBuf};

use xmltree::Element;

use crate::catalog;
use crate::categorize;
use crate::comment;
use crate::config::Config;
use crate::locate;
use crate::tagdb;
use crate::tags::{self, TagError};
use crate::xmlstore::{self, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid or missing rekordbox XML file: (unset)")]
    MissingCatalogPath,
    #[error("Invalid or missing music directory path: (unset)")]
    MissingMusicDir,
}

/// Per-file failure vs. run-fatal store failure; the caller skips on the
/// former and aborts on the latter.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error(transparent)]
    File(#[from] TagError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What one file contributed, for progress reporting.
#[derive(Debug)]
pub struct FileReport {
    pub fields_written: usize,
    pub db_tags_added: usize,
    pub catalog_updated: bool,
}

pub struct Pipeline<'a> {
    config: &'a Config,
    db_root: Element,
    catalog: Option<(PathBuf, Element)>,
}

impl<'a> Pipeline<'a> {
    /// Open both stores. The catalog is only loaded in catalog mode.
    pub fn new(config: &'a Config) -> Result<Self, SyncError> {
        let db_root = tagdb::load_or_create(&config.tag_db_path)?;
        let catalog = if config.use_rekordbox_xml {
            let path = config
                .rekordbox_xml_path
                .clone()
                .ok_or(SyncError::MissingCatalogPath)?;
            let root = xmlstore::load(&path)?;
            Some((path, root))
        } else {
            None
        };
        Ok(Self {
            config,
            db_root,
            catalog,
        })
    }

    /// The files this run will visit: every TRACK location in catalog mode,
    /// a recursive directory walk otherwise. Empty is valid.
    pub fn files(&self) -> Result<Vec<PathBuf>, SyncError> {
        match &self.catalog {
            Some((_, root)) => Ok(catalog::track_paths(root)),
            None => {
                let music_dir = self
                    .config
                    .music_dir
                    .as_deref()
                    .ok_or(SyncError::MissingMusicDir)?;
                Ok(locate::from_directory(music_dir))
            }
        }
    }

    /// Run the full pipeline for one file.
    ///
    /// A `ProcessError::File` means this file is skipped and the batch
    /// continues; a `ProcessError::Store` aborts the run.
    pub fn process_file(&mut self, path: &Path) -> Result<FileReport, ProcessError> {
        if !path.is_file() || !locate::is_supported(path) {
            return Err(TagError::Unsupported(format!(
                "Not a supported audio file: {}",
                path.display()
            ))
            .into());
        }

        let comments = tags::read_comments(path)?;
        let tokens = comment::extract_tokens(&comments, &self.config.tag_delimiter);
        let categorized = categorize::categorize(&tokens, &self.config.categories);

        let fields_written = tags::write_category_fields(
            path,
            &categorized,
            &self.config.categories,
            &self.config.tag_delimiter,
        )?;

        // The merge key is the located path string verbatim — catalog
        // locations decode to the same string they re-encode from.
        let path_str = path.display().to_string();
        let db_tags_added = tagdb::merge_file_tags(
            &mut self.db_root,
            &path_str,
            &categorized,
            &self.config.categories,
        );
        xmlstore::save(&self.db_root, &self.config.tag_db_path)?;

        let mut catalog_updated = false;
        if let Some((catalog_path, root)) = &mut self.catalog {
            catalog_updated = catalog::update_track(
                root,
                &path_str,
                &categorized,
                &self.config.categories,
                &self.config.tag_delimiter,
            );
            if catalog_updated {
                xmlstore::save(root, catalog_path)?;
            }
        }

        Ok(FileReport {
            fields_written,
            db_tags_added,
            catalog_updated,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.config.tag_db_path
    }

    pub fn catalog_path(&self) -> Option<&Path> {
        self.catalog.as_ref().map(|(path, _)| path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Category;

    fn config_for(dir: &Path) -> Config {
        Config {
            categories: vec![Category {
                name: "Genre".to_string(),
                tags: vec!["House".to_string()],
                metadata_field: Some("GENRE".to_string()),
                rekordbox_field: Some("Genre".to_string()),
            }],
            tag_delimiter: " / ".to_string(),
            use_rekordbox_xml: false,
            rekordbox_xml_path: None,
            music_dir: Some(dir.to_path_buf()),
            tag_db_path: dir.join("mytags.xml"),
        }
    }

    #[test]
    fn empty_music_dir_is_nothing_to_do() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let pipeline = Pipeline::new(&config).unwrap();
        assert!(pipeline.files().unwrap().is_empty());
    }

    #[test]
    fn unparseable_file_is_a_per_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let junk = dir.path().join("broken.mp3");
        std::fs::write(&junk, b"definitely not mpeg data").unwrap();

        let config = config_for(dir.path());
        let mut pipeline = Pipeline::new(&config).unwrap();
        assert_eq!(pipeline.files().unwrap(), vec![junk.clone()]);
        assert!(matches!(
            pipeline.process_file(&junk),
            Err(ProcessError::File(_))
        ));
        // The bad file must not have produced a tag database record.
        assert!(!config.tag_db_path.exists());
    }

    #[test]
    fn missing_file_from_catalog_is_a_per_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let mut pipeline = Pipeline::new(&config).unwrap();
        assert!(matches!(
            pipeline.process_file(Path::new("/nonexistent/a.flac")),
            Err(ProcessError::File(TagError::Unsupported(_)))
        ));
    }

    #[test]
    fn catalog_mode_lists_files_from_the_collection() {
        let dir = tempfile::tempdir().unwrap();
        let xml_path = dir.path().join("rekordbox.xml");
        std::fs::write(
            &xml_path,
            r#"<DJ_PLAYLISTS Version="1.0.0">
  <COLLECTION Entries="1">
    <TRACK TrackID="1" Location="file://localhost/My%20Music/Song%20One.mp3"/>
  </COLLECTION>
</DJ_PLAYLISTS>"#,
        )
        .unwrap();

        let mut config = config_for(dir.path());
        config.use_rekordbox_xml = true;
        config.rekordbox_xml_path = Some(xml_path);

        let pipeline = Pipeline::new(&config).unwrap();
        assert_eq!(
            pipeline.files().unwrap(),
            vec![PathBuf::from("/My Music/Song One.mp3")]
        );
        assert!(pipeline.catalog_path().is_some());
    }

    #[test]
    fn malformed_catalog_aborts_construction() {
        let dir = tempfile::tempdir().unwrap();
        let xml_path = dir.path().join("rekordbox.xml");
        std::fs::write(&xml_path, "<DJ_PLAYLISTS><COLLECTION>").unwrap();

        let mut config = config_for(dir.path());
        config.use_rekordbox_xml = true;
        config.rekordbox_xml_path = Some(xml_path);

        assert!(matches!(
            Pipeline::new(&config),
            Err(SyncError::Store(StoreError::Parse { .. }))
        ));
    }
}
