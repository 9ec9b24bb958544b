//! The ingest run: discover documents, chunk them, merge into the knowledge file.

use crate::config::{ChunkConfig, IngestConfig};
use crate::extract::{self, DocumentKind, ExtractionError};
use crate::store::{self, Collection};
use crate::text::{self, Chunk, SentenceSegmenter};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a run did, for the final report and for callers that need the numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub input_found: bool,
    pub files_processed: usize,
    pub files_skipped: usize,
    pub chunks_built: usize,
    pub chunks_added: usize,
    pub chunks_already_present: usize,
    pub total_chunks: usize,
    pub written: bool,
}

/// Process every document in the input directory and merge the chunks into
/// the knowledge file.
pub fn run(config: &IngestConfig) -> Result<RunSummary> {
    let chunk_config = config
        .chunk_config()
        .context("Invalid chunking configuration")?;
    log::debug!("Ingest configuration: {:?}", config);

    let mut summary = RunSummary::default();

    if !config.input_dir.is_dir() {
        println!(
            "Input directory not found: {}. Nothing to do.",
            config.input_dir.display()
        );
        return Ok(summary);
    }
    summary.input_found = true;

    let (mut collection, loaded_cleanly) = open_store(&config.output_file)?;

    let files = discover_files(&config.input_dir, config.recursive)?;
    println!(
        "Found {} file(s) in {}",
        files.len(),
        config.input_dir.display()
    );

    let segmenter = text::segmenter_for(config.language);
    let mut new_chunks: Vec<Chunk> = Vec::new();

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    for path in &files {
        let name = source_name(&config.input_dir, path);
        pb.set_message(name.clone());

        let Some(kind) = DocumentKind::from_path(path) else {
            pb.suspend(|| println!("Skipping unsupported file: {}", name));
            summary.files_skipped += 1;
            pb.inc(1);
            continue;
        };

        match process_document(path, &name, &chunk_config, segmenter.as_ref()) {
            Ok(chunks) => {
                pb.suspend(|| {
                    println!("{} ({}): {} chunk(s)", name, kind.as_str(), chunks.len())
                });
                summary.files_processed += 1;
                summary.chunks_built += chunks.len();
                new_chunks.extend(chunks);
            }
            Err(e) => {
                pb.suspend(|| log::warn!("Skipping {}: {}", name, e));
                summary.files_skipped += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let report = store::merge(&mut collection, &new_chunks);
    summary.chunks_added = report.added;
    summary.chunks_already_present = report.skipped;
    summary.total_chunks = collection.len();

    if report.added > 0 || !loaded_cleanly {
        store::save_collection(&config.output_file, &collection).with_context(|| {
            format!(
                "Failed to write knowledge file {}",
                config.output_file.display()
            )
        })?;
        summary.written = true;
    }

    println!(
        "Added {} new chunk(s), {} already present. {} now holds {} chunk(s).",
        summary.chunks_added,
        summary.chunks_already_present,
        config.output_file.display(),
        summary.total_chunks
    );

    Ok(summary)
}

/// Extract and chunk a single document.
pub fn process_document(
    path: &Path,
    source_name: &str,
    config: &ChunkConfig,
    segmenter: &dyn SentenceSegmenter,
) -> Result<Vec<Chunk>, ExtractionError> {
    let raw = extract::extract_text(path)?;
    Ok(text::build_chunks(&raw, source_name, config, segmenter))
}

/// Load the knowledge file, starting over if its contents are unusable.
///
/// The flag is false when the stored file had to be discarded, so the caller
/// rewrites it even if the run adds nothing.
fn open_store(path: &Path) -> Result<(Collection, bool)> {
    match store::load_collection(path) {
        Ok(collection) => Ok((collection, true)),
        Err(e) if e.is_corrupt() => {
            log::warn!(
                "{} is not a usable chunk list ({}), starting with an empty one",
                path.display(),
                e
            );
            Ok((Collection::default(), false))
        }
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read knowledge file {}", path.display()))
        }
    }
}

/// List the regular files under `dir`, sorted by path.
///
/// Entries that cannot be read (symlink loops, unreadable subdirectories) are
/// logged and left out.
fn discover_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if recursive {
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() {
                files.push(entry.path().to_path_buf());
            }
        }
    } else {
        for entry in std::fs::read_dir(dir).context("Failed to read input directory")? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable directory entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Name used for ids and fallback titles.
///
/// Files in subdirectories get their relative path joined with `_`, so
/// `manuales/guia.pdf` becomes `manuales_guia.pdf`.
fn source_name(input_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(input_dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("_")
}
