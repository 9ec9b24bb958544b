//! DOCX text extraction.
//!
//! A DOCX file is a ZIP archive; the body text lives in `word/document.xml`
//! as WordprocessingML. Text runs (`<w:t>`) inside a paragraph are joined
//! directly, paragraphs, tabs and breaks become spaces.

use super::ExtractionError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::io::{Cursor, Read};
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// A text run, or one of the elements that separates runs.
static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>|</w:p>|<w:tab\s*/>|<w:br\s*/>|<w:cr\s*/>")
        .expect("static regex")
});

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").expect("static regex")
});

pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Docx(format!("not a valid DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Docx(format!("missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)?;

    Ok(document_text(&xml))
}

/// Pull the visible text out of a WordprocessingML document.
fn document_text(xml: &str) -> String {
    let mut text = String::with_capacity(xml.len() / 4);

    for caps in TOKEN.captures_iter(xml) {
        match caps.get(1) {
            Some(run) => text.push_str(&decode_entities(run.as_str())),
            None => text.push(' '),
        }
    }

    text
}

fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            match entity {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                _ => numeric_reference(entity)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string()),
            }
        })
        .into_owned()
}

/// Decode `#123` or `#x7B` into the referenced character.
fn numeric_reference(entity: &str) -> Option<char> {
    let code = match entity.strip_prefix("#x") {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.strip_prefix('#')?.parse().ok()?,
    };
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::test_support::{document_xml, write_docx_xml};
    use tempfile::TempDir;

    #[test]
    fn test_runs_join_within_paragraph() {
        let xml = document_xml(
            "<w:p><w:r><w:t>Preven</w:t></w:r><w:r><w:t>ción</w:t></w:r></w:p>\
             <w:p><w:r><w:t xml:space=\"preserve\">Segundo </w:t></w:r></w:p>",
        );
        assert_eq!(document_text(&xml), "Prevención Segundo  ");
    }

    #[test]
    fn test_tabs_and_breaks_become_spaces() {
        let xml = document_xml("<w:p><w:r><w:t>Uno</w:t><w:tab/><w:t>Dos</w:t><w:br/><w:t>Tres</w:t></w:r></w:p>");
        assert_eq!(document_text(&xml), "Uno Dos Tres ");
    }

    #[test]
    fn test_table_tags_are_not_text_runs() {
        let xml = document_xml(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Celda</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
        );
        assert_eq!(document_text(&xml), "Celda ");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("Salud &amp; bienestar"), "Salud & bienestar");
        assert_eq!(decode_entities("&lt;b&gt; &quot;x&quot; &apos;y&apos;"), "<b> \"x\" 'y'");
        assert_eq!(decode_entities("&#233;xito &#xF1;"), "éxito ñ");
        assert_eq!(decode_entities("&#xFFFFFFFF;"), "&#xFFFFFFFF;");
    }

    #[test]
    fn test_extract_docx_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.docx");
        write_docx_xml(
            &path,
            &document_xml("<w:p><w:r><w:t>Día preventivo.</w:t></w:r></w:p>"),
        );

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(extract_docx(&bytes).unwrap(), "Día preventivo. ");
    }

    #[test]
    fn test_invalid_archive() {
        let result = extract_docx(b"plain bytes");
        assert!(matches!(result, Err(ExtractionError::Docx(msg)) if msg.contains("not a valid DOCX")));
    }

    #[test]
    fn test_missing_document_part() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("b.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("word/styles.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.finish().unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let result = extract_docx(&bytes);
        assert!(matches!(result, Err(ExtractionError::Docx(msg)) if msg.contains("word/document.xml")));
    }
}
