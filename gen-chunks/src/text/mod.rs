//! Text processing: whitespace normalization, sentence splitting, and chunking.

pub mod chunker;
mod cleaner;
mod naming;
pub mod segmenter;

pub use chunker::build_chunks;
pub use segmenter::{Language, SentenceSegmenter, segmenter_for};

/// A titled span of document text, the unit written to the knowledge file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    id: String,
    title: String,
    content: String,
    sequence_index: usize,
}

impl Chunk {
    /// Create a new chunk.
    pub(crate) fn new(id: String, title: String, content: String, sequence_index: usize) -> Self {
        Self {
            id,
            title,
            content,
            sequence_index,
        }
    }

    /// Identifier derived from the source file name and the chunk position.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// 1-based position of this chunk within its source document.
    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }
}
