//! Local MyTag database: `<MusicTags>` → `<Song>` records keyed by file
//! path, each holding one child element per category with `<Tag>` entries.
//!
//! Merging is a monotonic union — tags are only ever added, so rerunning the
//! pipeline on unchanged files leaves the store byte-identical.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use xmltree::{Element, XMLNode};

use crate::categorize::{CategorizedTags, NO_CATEGORY};
use crate::config::Category;
use crate::xmlstore::{self, StoreError};

const ROOT_ELEMENT: &str = "MusicTags";
const SONG_ELEMENT: &str = "Song";
pub const PATH_ELEMENT: &str = "FilePath";
const TAG_ELEMENT: &str = "Tag";
/// Element name for the unclassified bucket. The bucket's display name
/// ([`NO_CATEGORY`]) contains a space, which is not a legal XML name.
pub const NO_CATEGORY_ELEMENT: &str = "NoCategory";

/// Default store location when the config doesn't name one.
pub fn default_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mytagbox")
        .join("mytags.xml")
}

/// Load the store, or start a fresh tree if the file doesn't exist yet.
pub fn load_or_create(path: &Path) -> Result<Element, StoreError> {
    if path.exists() {
        xmlstore::load(path)
    } else {
        Ok(Element::new(ROOT_ELEMENT))
    }
}

/// Merge one file's categorized tags into the tree.
///
/// Locates or creates the `<Song>` record for `file_path` (exact string
/// match on the stored path, first match wins if duplicates exist), then a
/// child per configured category, then appends a `<Tag>` for every value not
/// already present. Existing tags are never removed or reordered. Returns
/// the number of `<Tag>` elements added.
pub fn merge_file_tags(
    root: &mut Element,
    file_path: &str,
    categorized: &CategorizedTags,
    categories: &[Category],
) -> usize {
    let song = find_or_create_song(root, file_path);
    let mut added = 0;

    for category in categories {
        added += merge_category(song, &category.name, categorized.get(&category.name));
    }
    // Unclassified tags are kept here and nowhere else; the bucket element
    // only appears once something lands in it.
    let unmatched = categorized.get(NO_CATEGORY);
    if !unmatched.is_empty() {
        added += merge_category(song, NO_CATEGORY_ELEMENT, unmatched);
    }

    added
}

fn merge_category(song: &mut Element, name: &str, new_tags: &[String]) -> usize {
    let category_el = find_or_create_child(song, name);
    let mut present: HashSet<String> = category_el
        .children
        .iter()
        .filter_map(|node| match node {
            XMLNode::Element(el) if el.name == TAG_ELEMENT => {
                Some(el.get_text().map(|t| t.into_owned()).unwrap_or_default())
            }
            _ => None,
        })
        .collect();

    let mut added = 0;
    for tag in new_tags {
        // `insert` also catches the same value repeated within this run.
        if present.insert(tag.clone()) {
            let mut tag_el = Element::new(TAG_ELEMENT);
            if !tag.is_empty() {
                tag_el.children.push(XMLNode::Text(tag.clone()));
            }
            category_el.children.push(XMLNode::Element(tag_el));
            added += 1;
        }
    }
    added
}

fn find_or_create_song<'a>(root: &'a mut Element, file_path: &str) -> &'a mut Element {
    let idx = root.children.iter().position(|node| {
        matches!(node, XMLNode::Element(el)
            if el.name == SONG_ELEMENT
                && el
                    .get_child(PATH_ELEMENT)
                    .and_then(|p| p.get_text())
                    .is_some_and(|text| text == file_path))
    });
    let idx = match idx {
        Some(i) => i,
        None => {
            let mut path_el = Element::new(PATH_ELEMENT);
            path_el.children.push(XMLNode::Text(file_path.to_string()));
            let mut song = Element::new(SONG_ELEMENT);
            song.children.push(XMLNode::Element(path_el));
            root.children.push(XMLNode::Element(song));
            root.children.len() - 1
        }
    };
    match &mut root.children[idx] {
        XMLNode::Element(el) => el,
        _ => unreachable!("position matched an element node"),
    }
}

fn find_or_create_child<'a>(parent: &'a mut Element, name: &str) -> &'a mut Element {
    let idx = parent
        .children
        .iter()
        .position(|node| matches!(node, XMLNode::Element(el) if el.name == name));
    let idx = match idx {
        Some(i) => i,
        None => {
            parent.children.push(XMLNode::Element(Element::new(name)));
            parent.children.len() - 1
        }
    };
    match &mut parent.children[idx] {
        XMLNode::Element(el) => el,
        _ => unreachable!("position matched an element node"),
    }
}
