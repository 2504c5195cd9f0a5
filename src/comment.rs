//! Comment tag parsing: extracts `/* ... */` blocks from a file's comment
//! text and splits them into individual tag tokens.

const OPEN_MARKER: &str = "/*";
const CLOSE_MARKER: &str = "*/";

/// Extract every `/* ... */` block from `text`, in order of appearance.
///
/// A block may span newlines. An opener without a closer yields no block.
pub fn extract_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find(OPEN_MARKER) {
        let after = &rest[open + OPEN_MARKER.len()..];
        match after.find(CLOSE_MARKER) {
            Some(close) => {
                blocks.push(&after[..close]);
                rest = &after[close + CLOSE_MARKER.len()..];
            }
            None => break,
        }
    }
    blocks
}

/// Split a block on `separator` and trim each segment.
///
/// Empty segments are kept — a stray separator is user data, not an error.
fn split_tokens(block: &str, separator: &str) -> Vec<String> {
    block
        .split(separator)
        .map(|segment| segment.trim().to_string())
        .collect()
}

/// Tokenize all comment strings carried by one file.
///
/// Comments are flattened in their original order before block extraction,
/// so a tag block is found no matter which comment value it lives in.
/// No block found means an empty token list, not an error.
pub fn extract_tokens(comments: &[String], separator: &str) -> Vec<String> {
    let joined = comments.concat();
    let mut tokens = Vec::new();
    for block in extract_blocks(&joined) {
        tokens.extend(split_tokens(block, separator));
    }
    tokens
}
