//! Plain-text extraction from PDF and DOCX documents.

mod docx;
mod pdf;

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    Unsupported(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
    #[error("No text found in document")]
    Empty,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(OsStr::to_str)?;
        if ext.eq_ignore_ascii_case("pdf") {
            Some(DocumentKind::Pdf)
        } else if ext.eq_ignore_ascii_case("docx") {
            Some(DocumentKind::Docx)
        } else {
            None
        }
    }

    /// Get the format name for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::Docx => "DOCX",
        }
    }
}

/// Extract the raw text of a document.
///
/// Whitespace is left as the extractor produced it.
pub fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_path(path).ok_or_else(|| {
        let ext = path.extension().and_then(OsStr::to_str).unwrap_or("");
        ExtractionError::Unsupported(ext.to_string())
    })?;

    let bytes = fs::read(path)?;
    let text = match kind {
        DocumentKind::Pdf => pdf::extract_pdf(&bytes)?,
        DocumentKind::Docx => docx::extract_docx(&bytes)?,
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }

    Ok(text)
}


#[cfg(test)]
mod tests {
    use super::test_support::{document_xml, write_docx, write_docx_xml};
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_document_kind_from_path() {
        assert_eq!(
            DocumentKind::from_path(Path::new("guia.pdf")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("GUIA.PDF")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("notas.Docx")),
            Some(DocumentKind::Docx)
        );
        assert_eq!(DocumentKind::from_path(Path::new("notas.doc")), None);
        assert_eq!(DocumentKind::from_path(Path::new("README")), None);
        assert_eq!(DocumentKind::from_path(&PathBuf::from("pdf")), None);
    }

    #[test]
    fn test_extract_unsupported_extension() {
        let result = extract_text(Path::new("tabla.xlsx"));
        assert!(matches!(result, Err(ExtractionError::Unsupported(ext)) if ext == "xlsx"));
    }

    #[test]
    fn test_extract_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = extract_text(&temp_dir.path().join("nada.pdf"));
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn test_extract_docx_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("guia.docx");
        write_docx(&path, &["Primer párrafo.", "Segundo párrafo."]);

        let text = extract_text(&path).unwrap();
        assert_eq!(text.split_whitespace().collect::<Vec<_>>().join(" "), "Primer párrafo. Segundo párrafo.");
    }

    #[test]
    fn test_extract_empty_docx() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vacio.docx");
        write_docx_xml(&path, &document_xml("<w:p/>"));

        assert!(matches!(extract_text(&path), Err(ExtractionError::Empty)));
    }

    #[test]
    fn test_extract_corrupt_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("roto.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        assert!(matches!(extract_text(&path), Err(ExtractionError::Pdf(_))));
    }
}
