//! Shared load/save plumbing for the two XML stores (local tag database and
//! rekordbox collection): parse the whole tree, mutate in memory, rewrite
//! with stable two-space indentation.

use std::fs::{self, File};
use std::path::Path;

use xmltree::{Element, EmitterConfig};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed XML in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: xmltree::ParseError,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: xmltree::Error,
    },
}

/// Parse the store at `path` into an element tree.
pub fn load(path: &Path) -> Result<Element, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Element::parse(file).map_err(|source| StoreError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Rewrite the whole store, creating parent directories if needed.
///
/// Indentation and attribute order are deterministic, so saving an
/// unchanged tree reproduces the previous bytes exactly.
pub fn save(root: &Element, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = EmitterConfig::new().perform_indent(true);
    root.write_with_config(file, config)
        .map_err(|source| StoreError::Write {
            path: path.display().to_string(),
            source,
        })
}
