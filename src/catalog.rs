//! Rekordbox XML collection updates.
//!
//! The collection file is owned by rekordbox; this module only matches TRACK
//! elements by their Location attribute and overwrites the configured
//! per-category attributes. Records are never created or deleted, and
//! unrelated structure is left untouched.

use std::path::PathBuf;

use xmltree::{Element, XMLNode};

use crate::categorize::CategorizedTags;
use crate::config::Category;
use crate::location;

const TRACK_ELEMENT: &str = "TRACK";
const LOCATION_ATTR: &str = "Location";

/// One decoded filesystem path per TRACK element carrying a Location,
/// in document order. Used as the file list in catalog mode.
pub fn track_paths(root: &Element) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    collect_paths(root, &mut paths);
    paths
}

fn collect_paths(element: &Element, out: &mut Vec<PathBuf>) {
    if element.name == TRACK_ELEMENT {
        if let Some(loc) = element.attributes.get(LOCATION_ATTR) {
            out.push(PathBuf::from(location::location_to_path(loc)));
        }
    }
    for child in &element.children {
        if let XMLNode::Element(el) = child {
            collect_paths(el, out);
        }
    }
}

/// Overwrite the configured category attributes on the TRACK whose Location
/// matches `file_path` (first match in document order).
///
/// Each configured attribute is a full overwrite with the joined tag list,
/// not a union — the collection has no per-tag history to merge against.
/// Returns `true` only if a record matched and at least one attribute value
/// actually changed; no match is a no-op, not an error.
pub fn update_track(
    root: &mut Element,
    file_path: &str,
    categorized: &CategorizedTags,
    categories: &[Category],
    delimiter: &str,
) -> bool {
    let target = location::path_to_location(file_path);
    update_first_match(root, &target, categorized, categories, delimiter).unwrap_or(false)
}

/// `Some(changed)` once a TRACK with the target Location is found.
fn update_first_match(
    element: &mut Element,
    target: &str,
    categorized: &CategorizedTags,
    categories: &[Category],
    delimiter: &str,
) -> Option<bool> {
    if element.name == TRACK_ELEMENT
        && element
            .attributes
            .get(LOCATION_ATTR)
            .is_some_and(|loc| loc == target)
    {
        let mut changed = false;
        for category in categories {
            let Some(field) = category.rekordbox_field.as_deref() else {
                continue;
            };
            let Some(value) = categorized.joined(&category.name, delimiter) else {
                continue;
            };
            if element.attributes.get(field) != Some(&value) {
                element.attributes.insert(field.to_string(), value);
                changed = true;
            }
        }
        return Some(changed);
    }
    for child in &mut element.children {
        if let XMLNode::Element(el) = child {
            if let Some(changed) =
                update_first_match(el, target, categorized, categories, delimiter)
            {
                return Some(changed);
            }
        }
    }
    None
}
