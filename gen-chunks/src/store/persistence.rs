//! Knowledge file persistence: loading, merging, and atomic rewrites.

use super::StoreError;
use super::types::{ChunkRecord, Collection};
use crate::text::Chunk;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Outcome of merging a batch of chunks into a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub skipped: usize,
}

/// Load the collection stored at `path`.
///
/// A missing file is an empty collection. A file that is not a JSON array is
/// reported so the caller can decide whether to start over.
pub fn load_collection(path: &Path) -> Result<Collection, StoreError> {
    if !path.exists() {
        return Ok(Collection::default());
    }

    let bytes = fs::read(path)?;
    let value: Value = serde_json::from_slice(&bytes).map_err(StoreError::Malformed)?;

    match value {
        Value::Array(entries) => Ok(Collection::new(entries)),
        _ => Err(StoreError::NotAnArray),
    }
}

/// Append the chunks whose ids are not yet present, in order.
pub fn merge(collection: &mut Collection, chunks: &[Chunk]) -> MergeReport {
    let stored: HashSet<String> = collection.ids().map(str::to_string).collect();
    let mut accepted: HashSet<String> = HashSet::new();
    let mut report = MergeReport::default();

    for chunk in chunks {
        let id = chunk.id();
        if stored.contains(id) {
            report.skipped += 1;
            continue;
        }
        if !accepted.insert(id.to_string()) {
            log::warn!("Duplicate chunk id in this run, keeping the first: {}", id);
            report.skipped += 1;
            continue;
        }
        collection.push(&ChunkRecord::from(chunk));
        report.added += 1;
    }

    report
}

/// Write the collection as pretty-printed JSON, replacing `path` atomically.
pub fn save_collection(path: &Path, collection: &Collection) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, collection).map_err(StoreError::Serialize)?;
        writer.flush()?;
    }
    temp.persist(path).map_err(|e| StoreError::Persist(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn chunk(id: &str, title: &str, content: &str) -> Chunk {
        Chunk::new(id.to_string(), title.to_string(), content.to_string(), 1)
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let collection = load_collection(&temp_dir.path().join("nada.json")).unwrap();
        assert!(collection.is_empty());
    }

    #[test]
    fn test_load_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("roto.json");
        fs::write(&path, "[{\"id\": ").unwrap();

        let err = load_collection(&path).unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_load_invalid_utf8_is_malformed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bin.json");
        fs::write(&path, [b'[', b'"', 0xff, 0xfe, b'"', b']']).unwrap();

        assert!(matches!(load_collection(&path), Err(StoreError::Malformed(_))));
    }

    #[test]
    fn test_load_object_is_not_an_array() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("obj.json");
        fs::write(&path, r#"{"id": "a_1"}"#).unwrap();

        let err = load_collection(&path).unwrap_err();
        assert!(matches!(err, StoreError::NotAnArray));
        assert!(err.is_corrupt());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nuevo").join("info.json");

        let mut collection = Collection::default();
        merge(
            &mut collection,
            &[
                chunk("guia_1", "Prevención.", "Prevención. Uso de EPI."),
                chunk("guia_2", "guia - Part 2", "EPI. Señalización."),
            ],
        );
        save_collection(&path, &collection).unwrap();

        let loaded = load_collection(&path).unwrap();
        assert_eq!(loaded, collection);
        assert_eq!(loaded.ids().collect::<Vec<_>>(), vec!["guia_1", "guia_2"]);
    }

    #[test]
    fn test_save_format_is_pretty_and_unescaped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("info.json");

        let mut collection = Collection::default();
        merge(&mut collection, &[chunk("a_1", "Señal", "Año")]);
        save_collection(&path, &collection).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "[\n  {\n    \"id\": \"a_1\",\n    \"titulo\": \"Señal\",\n    \"contenido\": \"Año\"\n  }\n]"
        );
    }

    #[test]
    fn test_save_empty_collection() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.json");
        save_collection(&path, &Collection::default()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_merge_skips_existing_ids() {
        let mut collection = Collection::new(vec![json!({"id": "doc_1", "titulo": "Viejo", "contenido": "x"})]);

        let report = merge(
            &mut collection,
            &[chunk("doc_1", "Nuevo", "y"), chunk("doc_2", "Dos", "z")],
        );

        assert_eq!(report, MergeReport { added: 1, skipped: 1 });
        assert_eq!(collection.ids().collect::<Vec<_>>(), vec!["doc_1", "doc_2"]);
        assert_eq!(collection.entries()[0]["titulo"], "Viejo");
    }

    #[test]
    fn test_merge_drops_duplicates_within_batch() {
        let mut collection = Collection::default();
        let report = merge(
            &mut collection,
            &[chunk("informe_1", "PDF", "a"), chunk("informe_1", "DOCX", "b")],
        );

        assert_eq!(report, MergeReport { added: 1, skipped: 1 });
        assert_eq!(collection.entries()[0]["titulo"], "PDF");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let batch = [chunk("a_1", "A", "a"), chunk("a_2", "B", "b")];
        let mut collection = Collection::default();
        merge(&mut collection, &batch);
        let before = collection.clone();

        let report = merge(&mut collection, &batch);
        assert_eq!(report, MergeReport { added: 0, skipped: 2 });
        assert_eq!(collection, before);
    }

    #[test]
    fn test_extra_fields_survive_rewrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("info.json");
        fs::write(
            &path,
            r#"[{"titulo": "Manual", "subtitulo": "Anexo", "contenido": "Texto", "id": "m_1"}, {"nota": 3}]"#,
        )
        .unwrap();

        let mut collection = load_collection(&path).unwrap();
        merge(&mut collection, &[chunk("n_1", "N", "n")]);
        save_collection(&path, &collection).unwrap();

        let reloaded = load_collection(&path).unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded.entries()[0]["subtitulo"], "Anexo");
        assert_eq!(reloaded.entries()[1], json!({"nota": 3}));

        // key order of hand-written records is kept
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.find("\"titulo\"").unwrap() < written.find("\"subtitulo\"").unwrap());
        assert!(written.find("\"contenido\": \"Texto\"").unwrap() < written.find("\"id\": \"m_1\"").unwrap());
    }
}
