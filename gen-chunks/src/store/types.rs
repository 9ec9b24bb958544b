//! Record types for the knowledge file.

use crate::text::Chunk;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chunk as written to the knowledge file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub titulo: String,
    pub contenido: String,
}

impl From<&Chunk> for ChunkRecord {
    fn from(chunk: &Chunk) -> Self {
        Self {
            id: chunk.id().to_string(),
            titulo: chunk.title().to_string(),
            contenido: chunk.content().to_string(),
        }
    }
}

/// The persisted collection.
///
/// Entries are kept as raw JSON so hand-written records (extra fields such as
/// `subtitulo`, entries without an id) survive a rewrite unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    entries: Vec<Value>,
}

impl Collection {
    pub fn new(entries: Vec<Value>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Value] {
        &self.entries
    }

    /// String ids of all entries, in order. Entries without one are skipped.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter_map(|entry| entry.get("id").and_then(Value::as_str))
    }

    /// Append a record at the end of the collection.
    pub fn push(&mut self, record: &ChunkRecord) {
        let mut entry = serde_json::Map::new();
        entry.insert("id".to_string(), Value::String(record.id.clone()));
        entry.insert("titulo".to_string(), Value::String(record.titulo.clone()));
        entry.insert(
            "contenido".to_string(),
            Value::String(record.contenido.clone()),
        );
        self.entries.push(Value::Object(entry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chunk_record_from_chunk() {
        let chunk = Chunk::new(
            "doc_1".to_string(),
            "Título.".to_string(),
            "Título. Contenido.".to_string(),
            1,
        );
        let record = ChunkRecord::from(&chunk);
        assert_eq!(record.id, "doc_1");
        assert_eq!(record.titulo, "Título.");
        assert_eq!(record.contenido, "Título. Contenido.");
    }

    #[test]
    fn test_ids_skip_entries_without_string_id() {
        let collection = Collection::new(vec![
            json!({"id": "a_1", "titulo": "A"}),
            json!({"titulo": "sin id"}),
            json!({"id": 7}),
            json!("suelto"),
            json!({"id": "b_1"}),
        ]);
        assert_eq!(collection.ids().collect::<Vec<_>>(), vec!["a_1", "b_1"]);
        assert_eq!(collection.len(), 5);
    }

    #[test]
    fn test_push_writes_fields_in_order() {
        let mut collection = Collection::default();
        assert!(collection.is_empty());
        collection.push(&ChunkRecord {
            id: "x_1".to_string(),
            titulo: "T".to_string(),
            contenido: "C".to_string(),
        });

        let serialized = serde_json::to_string(&collection).unwrap();
        assert_eq!(serialized, r#"[{"id":"x_1","titulo":"T","contenido":"C"}]"#);
    }
}
