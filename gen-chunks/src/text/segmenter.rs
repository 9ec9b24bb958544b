//! Sentence splitting.
//!
//! Spanish (the default) goes through a rule-based splitter that knows the
//! language's abbreviations and opening marks. English uses the dialog-aware
//! detector from the seams library, falling back to the English rules when
//! the detector is unavailable.

use seams::sentence_detector::dialog_detector::SentenceDetectorDialog;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Characters that can end a sentence.
const TERMINALS: &[char] = &['.', '!', '?', '…'];

/// Closing quotes and brackets that stay attached to the sentence they close.
const CLOSERS: &[char] = &['"', '\'', ')', ']', '»', '”', '’'];

const SPANISH_ABBREVIATIONS: &[&str] = &[
    "sr", "sra", "srta", "sres", "sras", "dr", "dra", "drs", "lic", "ing", "arq", "prof", "profa",
    "ud", "uds", "vd", "vds", "etc", "pág", "págs", "núm", "nro", "art", "arts", "cap", "fig",
    "vol", "ed", "aprox", "av", "avda", "tel", "cía", "dpto", "depto", "ej", "máx", "mín", "vs",
    "cf", "gral", "cnel", "sto", "sta", "dir", "pdte", "atte", "admón", "hnos", "inc", "ee.uu",
    "s.a", "s.r.l", "a.c", "d.c",
];

const ENGLISH_ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "fig", "vol",
    "inc", "ltd", "co", "corp", "approx", "dept", "est", "mt", "jan", "feb", "aug", "sept", "oct",
    "nov", "dec", "u.s", "a.m", "p.m",
];

/// Language of the source documents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Spanish,
    English,
}

impl Language {
    /// Get the language name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Spanish => "spanish",
            Language::English => "english",
        }
    }

    fn abbreviations(&self) -> &'static [&'static str] {
        match self {
            Language::Spanish => SPANISH_ABBREVIATIONS,
            Language::English => ENGLISH_ABBREVIATIONS,
        }
    }
}

/// Splits text into sentences.
pub trait SentenceSegmenter {
    /// Split text into trimmed, non-empty sentences in document order.
    fn split(&self, text: &str) -> Vec<String>;
}

/// Create the segmenter for a language.
pub fn segmenter_for(language: Language) -> Box<dyn SentenceSegmenter> {
    match language {
        Language::Spanish => Box::new(RuleSegmenter::new(Language::Spanish)),
        Language::English => Box::new(SeamsSegmenter::new()),
    }
}

/// Punctuation-driven splitter with a per-language abbreviation list.
#[derive(Debug, Clone)]
pub struct RuleSegmenter {
    abbreviations: &'static [&'static str],
}

impl RuleSegmenter {
    pub fn new(language: Language) -> Self {
        Self {
            abbreviations: language.abbreviations(),
        }
    }

    /// Decide whether a terminal followed by whitespace closes the sentence.
    ///
    /// `preceding` is the sentence text up to (not including) the terminal and
    /// `next` is the first character after the whitespace.
    fn ends_sentence(&self, preceding: &str, terminal: char, next: char) -> bool {
        if next.is_lowercase() {
            return false;
        }
        if terminal != '.' {
            return true;
        }

        let word = preceding
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or("")
            .trim_start_matches(|c: char| !c.is_alphanumeric());

        if is_initial(word) {
            return false;
        }

        let word = word.to_lowercase();
        !self.abbreviations.contains(&word.as_str())
    }
}

impl SentenceSegmenter for RuleSegmenter {
    fn split(&self, text: &str) -> Vec<String> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut sentences = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < chars.len() {
            let (offset, c) = chars[i];
            if !TERMINALS.contains(&c) {
                i += 1;
                continue;
            }

            // "?!", "..." and '."' end together
            let mut end = i + 1;
            while end < chars.len()
                && (TERMINALS.contains(&chars[end].1) || CLOSERS.contains(&chars[end].1))
            {
                end += 1;
            }

            let mut next = end;
            while next < chars.len() && chars[next].1.is_whitespace() {
                next += 1;
            }

            if next > end
                && next < chars.len()
                && self.ends_sentence(&text[start..offset], c, chars[next].1)
            {
                push_sentence(&mut sentences, &text[start..chars[end].0]);
                start = chars[next].0;
                i = next;
            } else {
                i = end;
            }
        }

        push_sentence(&mut sentences, &text[start..]);
        sentences
    }
}

/// A single capital letter, as in "J. Pérez".
fn is_initial(word: &str) -> bool {
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase())
}

fn push_sentence(sentences: &mut Vec<String>, sentence: &str) {
    let sentence = sentence.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }
}

/// Global detector instance (lazy initialization).
static DETECTOR: OnceLock<Option<SentenceDetectorDialog>> = OnceLock::new();

/// Get or initialize the seams detector, `None` if it failed to initialize.
fn detector() -> Option<&'static SentenceDetectorDialog> {
    DETECTOR
        .get_or_init(|| match SentenceDetectorDialog::new() {
            Ok(detector) => Some(detector),
            Err(e) => {
                log::warn!("seams sentence detector unavailable, using rule-based splitting: {e:?}");
                None
            }
        })
        .as_ref()
}

/// Dialog-aware English splitting backed by seams.
#[derive(Debug, Clone)]
pub struct SeamsSegmenter {
    fallback: RuleSegmenter,
}

impl SeamsSegmenter {
    pub fn new() -> Self {
        Self {
            fallback: RuleSegmenter::new(Language::English),
        }
    }
}

impl Default for SeamsSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceSegmenter for SeamsSegmenter {
    fn split(&self, text: &str) -> Vec<String> {
        let Some(detector) = detector() else {
            return self.fallback.split(text);
        };

        match detector.detect_sentences_borrowed(text) {
            Ok(sentences) => sentences
                .iter()
                .map(|s| s.normalize())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(e) => {
                log::warn!("seams sentence detection failed, using rule-based splitting: {e:?}");
                self.fallback.split(text)
            }
        }
    }
}
