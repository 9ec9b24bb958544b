//! Chunk identifiers and titles.

use super::segmenter::SentenceSegmenter;
use std::ffi::OsStr;
use std::path::Path;

/// First sentences at or above this many characters are not used as titles.
const TITLE_SENTENCE_LIMIT: usize = 100;

/// Titles longer than this are truncated.
const TITLE_MAX_CHARS: usize = 80;

const TITLE_ELLIPSIS: &str = "...";

/// Build the id for the chunk at 1-based `index` of `source_name`.
///
/// The extension is dropped and any remaining periods become underscores, so
/// `informe.v2.pdf` yields `informe_v2_1`, `informe_v2_2`, ...
pub fn chunk_id(source_name: &str, index: usize) -> String {
    format!("{}_{}", file_stem(source_name).replace('.', "_"), index)
}

/// Derive a human-readable title for a chunk.
///
/// Uses the chunk's first sentence when it is short enough, otherwise falls
/// back to `"<file name> - Part <index>"`.
pub fn chunk_title(
    content: &str,
    source_name: &str,
    index: usize,
    segmenter: &dyn SentenceSegmenter,
) -> String {
    match segmenter.split(content).into_iter().next() {
        Some(first) if !first.is_empty() && first.chars().count() < TITLE_SENTENCE_LIMIT => {
            truncate_title(first.replace('\n', " ").trim())
        }
        _ => fallback_title(source_name, index),
    }
}

fn fallback_title(source_name: &str, index: usize) -> String {
    format!("{} - Part {}", file_stem(source_name).replace('_', " "), index)
}

fn truncate_title(title: &str) -> String {
    if title.chars().count() <= TITLE_MAX_CHARS {
        return title.to_string();
    }
    let mut truncated: String = title.chars().take(TITLE_MAX_CHARS).collect();
    truncated.push_str(TITLE_ELLIPSIS);
    truncated
}

fn file_stem(source_name: &str) -> &str {
    Path::new(source_name)
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or(source_name)
}
