//! Run configuration: the ordered category schema plus store locations,
//! loaded from JSON and validated before any file is touched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::tagdb;

pub const DEFAULT_DELIMITER: &str = " / ";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("No categories defined")]
    NoCategories,
    #[error("Tag delimiter must not be empty")]
    EmptyDelimiter,
    #[error("Category name {0:?} is not a valid XML element name")]
    InvalidCategoryName(String),
    #[error("Category name {0:?} is reserved")]
    ReservedCategoryName(String),
    #[error("Rekordbox field {0:?} is not a valid XML attribute name")]
    InvalidRekordboxField(String),
    #[error("Invalid or missing rekordbox XML file: {0}")]
    MissingRekordboxXml(String),
    #[error("Invalid or missing music directory path: {0}")]
    MissingMusicDir(String),
}

/// Element names the tag database uses for its own structure; a category
/// with one of these names would merge into the wrong element.
const RESERVED_CATEGORY_NAMES: [&str; 2] = [tagdb::PATH_ELEMENT, tagdb::NO_CATEGORY_ELEMENT];

/// One category of the schema. Schema order is classification order:
/// a token present in two categories always lands in the earlier one.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub name: String,
    /// Exact, case-sensitive tag vocabulary.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Audio metadata field the joined tags are written to, if any.
    #[serde(default)]
    pub metadata_field: Option<String>,
    /// TRACK attribute the joined tags are mirrored to, if any.
    #[serde(default)]
    pub rekordbox_field: Option<String>,
}

/// Immutable run configuration, passed by reference into the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Ordered category schema.
    pub categories: Vec<Category>,
    /// Separator used both to split comment blocks and to join tags on write.
    #[serde(default = "default_delimiter")]
    pub tag_delimiter: String,
    /// Catalog mode: take the file list from the rekordbox XML and mirror
    /// tags back into it. Off: walk `music_dir` and leave the XML alone.
    #[serde(default)]
    pub use_rekordbox_xml: bool,
    #[serde(default)]
    pub rekordbox_xml_path: Option<PathBuf>,
    #[serde(default)]
    pub music_dir: Option<PathBuf>,
    /// Local tag database location.
    #[serde(default = "tagdb::default_path")]
    pub tag_db_path: PathBuf,
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

/// Load and validate a config file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config: Config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Check everything the run needs up front — a bad path aborts before
    /// any file processing begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        if self.tag_delimiter.is_empty() {
            return Err(ConfigError::EmptyDelimiter);
        }
        for category in &self.categories {
            // Category names become element names in the tag database and
            // rekordbox fields become TRACK attribute names; a bad one would
            // leave either store unparseable.
            if !is_valid_xml_name(&category.name) {
                return Err(ConfigError::InvalidCategoryName(category.name.clone()));
            }
            if RESERVED_CATEGORY_NAMES.contains(&category.name.as_str()) {
                return Err(ConfigError::ReservedCategoryName(category.name.clone()));
            }
            if let Some(field) = &category.rekordbox_field {
                if !is_valid_xml_name(field) {
                    return Err(ConfigError::InvalidRekordboxField(field.clone()));
                }
            }
        }
        if self.use_rekordbox_xml {
            match &self.rekordbox_xml_path {
                Some(path) if path.is_file() => {}
                other => {
                    return Err(ConfigError::MissingRekordboxXml(display_or_unset(
                        other.as_deref(),
                    )));
                }
            }
        } else {
            match &self.music_dir {
                Some(path) if path.is_dir() => {}
                other => {
                    return Err(ConfigError::MissingMusicDir(display_or_unset(
                        other.as_deref(),
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Conservative XML Name check: letters or `_` to start, then letters,
/// digits, `-`, `_`, or `.`.
fn is_valid_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn display_or_unset(path: Option<&Path>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "(unset)".to_string(),
    }
}
