//! Tag classification against the ordered category schema.

use std::collections::HashMap;

use crate::config::Category;

/// Reserved bucket for tokens that match no category. These are recorded in
/// the local tag database but never written to file metadata or rekordbox.
pub const NO_CATEGORY: &str = "No Category";

/// One file's tags, bucketed by category name plus the reserved
/// [`NO_CATEGORY`] bucket. Bucket contents keep appearance order.
#[derive(Debug, Default)]
pub struct CategorizedTags {
    buckets: HashMap<String, Vec<String>>,
}

impl CategorizedTags {
    /// Tags assigned to `category` this run, in appearance order.
    pub fn get(&self, category: &str) -> &[String] {
        self.buckets.get(category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tags for `category` joined with `delimiter`, or `None` when the
    /// bucket is empty (an empty bucket must leave destination fields
    /// untouched).
    pub fn joined(&self, category: &str, delimiter: &str) -> Option<String> {
        let tags = self.get(category);
        if tags.is_empty() {
            None
        } else {
            Some(tags.join(delimiter))
        }
    }
}

/// Assign each token to the first category in schema order whose tag set
/// contains an exact, case-sensitive match, or to [`NO_CATEGORY`].
///
/// Repeated tokens are appended repeatedly — deduplication against history
/// is the store synchronizers' job, not the classifier's.
pub fn categorize(tokens: &[String], categories: &[Category]) -> CategorizedTags {
    let mut out = CategorizedTags::default();
    for token in tokens {
        let bucket = categories
            .iter()
            .find(|category| category.tags.iter().any(|t| t == token))
            .map(|category| category.name.as_str())
            .unwrap_or(NO_CATEGORY);
        out.buckets
            .entry(bucket.to_string())
            .or_default()
            .push(token.clone());
    }
    out
}
