//! Read-only queries over the knowledge file: fetch by id and keyword search.

use crate::store::Collection;
use serde_json::Value;

/// Upper bound on the combined formatted length of search results, in characters.
pub const MAX_CONTEXT_CHARS: usize = 3500;

/// Default number of records returned by a search.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

// Relevance weights: whole query found in a field, then per query word
const PHRASE_IN_TITLE: u32 = 50;
const PHRASE_IN_SUBTITLE: u32 = 40;
const PHRASE_IN_CONTENT: u32 = 20;
const WORD_IN_TITLE: u32 = 10;
const WORD_IN_SUBTITLE: u32 = 8;
const WORD_IN_CONTENT: u32 = 4;

/// Query words this short or shorter are ignored.
const MIN_WORD_CHARS: usize = 2;

/// A record selected by [`search`], already formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub score: u32,
    pub record: &'a Value,
    pub text: String,
}

/// Find the first record with the given id.
pub fn find_by_id<'a>(collection: &'a Collection, id: &str) -> Option<&'a Value> {
    collection
        .entries()
        .iter()
        .find(|entry| entry.get("id").and_then(Value::as_str) == Some(id))
}

/// Render a record as a titled block.
pub fn format_record(record: &Value) -> String {
    let title = non_empty_field(record, "titulo").unwrap_or("Sin título");
    let mut text = format!("--- Título: {}", title);
    if let Some(subtitle) = non_empty_field(record, "subtitulo") {
        text.push_str(" - ");
        text.push_str(subtitle);
    }
    let content = non_empty_field(record, "contenido").unwrap_or("Sin contenido");
    text.push('\n');
    text.push_str(content);
    text.push('\n');
    text
}

/// Rank records by keyword relevance and pack the best ones.
///
/// Records are taken in descending score order until `limit` are selected or
/// the next one would push the combined text past [`MAX_CONTEXT_CHARS`]. A
/// record whose formatted text already appears inside the selected text is
/// skipped.
pub fn search<'a>(collection: &'a Collection, query: &str, limit: usize) -> Vec<SearchHit<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }
    let words: Vec<&str> = query
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_WORD_CHARS)
        .collect();

    let mut scored: Vec<(u32, &Value)> = collection
        .entries()
        .iter()
        .map(|entry| (relevance(entry, &query, &words), entry))
        .filter(|(score, _)| *score > 0)
        .collect();
    // stable, so equal scores keep file order
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut hits: Vec<SearchHit<'a>> = Vec::new();
    let mut packed = String::new();
    let mut used = 0;
    for (score, record) in scored {
        let text = format_record(record);
        if packed.contains(&text) {
            continue;
        }

        let len = text.chars().count();
        if used + len > MAX_CONTEXT_CHARS {
            break;
        }
        used += len;
        packed.push_str(&text);
        hits.push(SearchHit {
            score,
            record,
            text,
        });
        if hits.len() >= limit {
            break;
        }
    }

    log::debug!("search {:?}: {} hit(s), {} chars", query, hits.len(), used);
    hits
}

fn relevance(record: &Value, query: &str, words: &[&str]) -> u32 {
    let title = lowercase_field(record, "titulo");
    let subtitle = lowercase_field(record, "subtitulo");
    let content = lowercase_field(record, "contenido");

    let mut score = 0;
    if title.contains(query) {
        score += PHRASE_IN_TITLE;
    }
    if subtitle.contains(query) {
        score += PHRASE_IN_SUBTITLE;
    }
    if content.contains(query) {
        score += PHRASE_IN_CONTENT;
    }

    for word in words {
        if title.contains(word) {
            score += WORD_IN_TITLE;
        }
        if subtitle.contains(word) {
            score += WORD_IN_SUBTITLE;
        }
        if content.contains(word) {
            score += WORD_IN_CONTENT;
        }
    }

    score
}

fn non_empty_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn lowercase_field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase()
}
