//! Sentence-aware chunking with character overlap.

use super::Chunk;
use super::cleaner::normalize_whitespace;
use super::naming::{chunk_id, chunk_title};
use super::segmenter::SentenceSegmenter;
use crate::config::ChunkConfig;

/// Split document text into titled chunks.
///
/// # Arguments
/// * `text` - Extracted document text (normalized here)
/// * `source_name` - File name of the document, used for ids and fallback titles
/// * `config` - Size and overlap limits
/// * `segmenter` - Sentence splitter for the document's language
///
/// # Returns
/// Chunks in document order, numbered from 1.
pub fn build_chunks(
    text: &str,
    source_name: &str,
    config: &ChunkConfig,
    segmenter: &dyn SentenceSegmenter,
) -> Vec<Chunk> {
    let text = normalize_whitespace(text);
    if text.is_empty() {
        return Vec::new();
    }

    let sentences = segmenter.split(&text);
    log::debug!("{}: {} sentences", source_name, sentences.len());

    split_into_windows(&sentences, config)
        .into_iter()
        .enumerate()
        .map(|(i, content)| {
            let index = i + 1;
            let title = chunk_title(&content, source_name, index, segmenter);
            Chunk::new(chunk_id(source_name, index), title, content, index)
        })
        .collect()
}

/// Group consecutive sentences into windows of at most `max_chunk_chars`.
///
/// When a sentence does not fit, the current window is closed and the next one
/// starts with the last `overlap_chars` characters of the closed window. A
/// sentence longer than the limit is kept whole in a window of its own.
pub fn split_into_windows(sentences: &[String], config: &ChunkConfig) -> Vec<String> {
    let mut windows = Vec::new();
    let mut current = String::new();
    // Length of `current` in characters
    let mut current_len = 0;

    for sentence in sentences {
        let sentence_len = sentence.chars().count();

        if !current.is_empty() && current_len + sentence_len + 1 > config.max_chunk_chars() {
            push_window(&mut windows, &current);

            let overlap = tail_chars(&current, config.overlap_chars());
            let mut next = String::with_capacity(overlap.len() + sentence.len() + 1);
            // The separator is kept even after an empty overlap and counts
            // toward the limit; windows are trimmed when closed.
            next.push_str(overlap);
            next.push(' ');
            next.push_str(sentence);

            current_len = next.chars().count();
            current = next;
        } else {
            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(sentence);
            current_len += sentence_len;
        }
    }

    if !current.is_empty() {
        push_window(&mut windows, &current);
    }

    windows
}

fn push_window(windows: &mut Vec<String>, window: &str) {
    let window = window.trim();
    if !window.is_empty() {
        windows.push(window.to_string());
    }
}

/// The last `count` characters of `text`.
fn tail_chars(text: &str, count: usize) -> &str {
    if count == 0 {
        return "";
    }
    match text.char_indices().rev().nth(count - 1) {
        Some((offset, _)) => &text[offset..],
        None => text,
    }
}
