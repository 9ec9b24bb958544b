//! gen-chunks - Split PDF and DOCX documents into overlapping chunks for a JSON knowledge file

mod config;
mod extract;
mod lookup;
mod pipeline;
mod store;
mod text;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::IngestConfig;
use std::path::{Path, PathBuf};
use text::Language;

#[derive(Parser, Debug)]
#[command(name = "gen-chunks")]
#[command(about = "Split PDF and DOCX documents into overlapping chunks for a JSON knowledge file", long_about = None)]
#[command(version)]
struct Args {
    /// Directory holding the PDF and DOCX files
    #[arg(long)]
    input: Option<PathBuf>,

    /// JSON knowledge file to merge chunks into
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum characters per chunk
    #[arg(long)]
    max_chars: Option<usize>,

    /// Characters repeated from the end of one chunk at the start of the next
    #[arg(long)]
    overlap: Option<usize>,

    /// Language used for sentence splitting
    #[arg(long, value_enum)]
    language: Option<Language>,

    /// Also process documents in subdirectories
    #[arg(short, long, default_value_t = false)]
    recursive: bool,

    /// Use this config file instead of ~/.config/cli-programs/gen-chunks.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Print a stored chunk by id
    Show {
        /// Chunk id, e.g. guia_3
        id: String,
    },
    /// Search stored chunks by keyword relevance
    Search {
        /// Words or phrase to look for
        query: String,

        /// Maximum number of results
        #[arg(long, default_value_t = lookup::DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Write a config file with the default values
    Init,
    /// Set the default input directory
    SetInput {
        /// Directory holding the documents
        path: PathBuf,
    },
    /// Set the default knowledge file
    SetOutput {
        /// Path of the JSON file
        path: PathBuf,
    },
    /// Set the default maximum chunk size
    SetMaxChars {
        /// Characters per chunk
        value: usize,
    },
    /// Set the default overlap
    SetOverlap {
        /// Characters carried into the next chunk
        value: usize,
    },
    /// Set the default document language
    SetLanguage {
        #[arg(value_enum)]
        language: Language,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => IngestConfig::config_path()?,
    };

    run_command(&args, &config_path)
}

fn run_command(args: &Args, config_path: &Path) -> Result<()> {
    match &args.command {
        Some(Commands::Config { action }) => handle_config_command(action, config_path),
        Some(Commands::Show { id }) => show_chunk(&resolve_config(args, config_path)?, id),
        Some(Commands::Search { query, limit }) => {
            search_chunks(&resolve_config(args, config_path)?, query, *limit)
        }
        None => {
            pipeline::run(&resolve_config(args, config_path)?)?;
            Ok(())
        }
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Defaults, then the config file, then command-line overrides.
fn resolve_config(args: &Args, config_path: &Path) -> Result<IngestConfig> {
    let mut config = IngestConfig::load_from(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    if let Some(input) = &args.input {
        config.input_dir = input.clone();
    }
    if let Some(output) = &args.output {
        config.output_file = output.clone();
    }
    if let Some(max_chars) = args.max_chars {
        config.max_chunk_chars = max_chars;
    }
    if let Some(overlap) = args.overlap {
        config.overlap_chars = overlap;
    }
    if let Some(language) = args.language {
        config.language = language;
    }
    if args.recursive {
        config.recursive = true;
    }

    Ok(config)
}

fn open_knowledge_file(config: &IngestConfig) -> Result<store::Collection> {
    store::load_collection(&config.output_file).with_context(|| {
        format!(
            "Failed to read knowledge file {}",
            config.output_file.display()
        )
    })
}

fn show_chunk(config: &IngestConfig, id: &str) -> Result<()> {
    let collection = open_knowledge_file(config)?;
    let record = lookup::find_by_id(&collection, id).ok_or_else(|| {
        anyhow::anyhow!(
            "No chunk with id '{}' in {}",
            id,
            config.output_file.display()
        )
    })?;
    print!("{}", lookup::format_record(record));
    Ok(())
}

fn search_chunks(config: &IngestConfig, query: &str, limit: usize) -> Result<()> {
    let collection = open_knowledge_file(config)?;
    let hits = lookup::search(&collection, query, limit);

    if hits.is_empty() {
        println!("No matching chunks for \"{}\"", query);
        return Ok(());
    }

    for hit in &hits {
        let id = hit.record.get("id").and_then(|v| v.as_str()).unwrap_or("-");
        println!("[{}] score {}", id, hit.score);
        print!("{}", hit.text);
        println!();
    }
    Ok(())
}

fn handle_config_command(action: &ConfigAction, config_path: &Path) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = IngestConfig::load_from(config_path)?;
            println!("Configuration file: {:?}", config_path);
            println!();
            println!("input_dir = \"{}\"", config.input_dir.display());
            println!("output_file = \"{}\"", config.output_file.display());
            println!("max_chunk_chars = {}", config.max_chunk_chars);
            println!("overlap_chars = {}", config.overlap_chars);
            println!("language = \"{}\"", config.language.as_str());
            println!("recursive = {}", config.recursive);
        }
        ConfigAction::Init => {
            if config_path.exists() {
                println!("Configuration file already exists: {}", config_path.display());
            } else {
                IngestConfig::default().save_to(config_path)?;
                println!("Wrote default configuration to: {}", config_path.display());
            }
        }
        ConfigAction::SetInput { path } => {
            let mut config = IngestConfig::load_from(config_path)?;
            config.input_dir = path.clone();
            config.save_to(config_path)?;
            println!("Default input directory set to: {}", path.display());
        }
        ConfigAction::SetOutput { path } => {
            let mut config = IngestConfig::load_from(config_path)?;
            config.output_file = path.clone();
            config.save_to(config_path)?;
            println!("Default knowledge file set to: {}", path.display());
        }
        ConfigAction::SetMaxChars { value } => {
            let mut config = IngestConfig::load_from(config_path)?;
            config.max_chunk_chars = *value;
            config.chunk_config()?;
            config.save_to(config_path)?;
            println!("Default max chunk size set to: {}", value);
        }
        ConfigAction::SetOverlap { value } => {
            let mut config = IngestConfig::load_from(config_path)?;
            config.overlap_chars = *value;
            config.chunk_config()?;
            config.save_to(config_path)?;
            println!("Default overlap set to: {}", value);
        }
        ConfigAction::SetLanguage { language } => {
            let mut config = IngestConfig::load_from(config_path)?;
            config.language = *language;
            config.save_to(config_path)?;
            println!("Default language set to: {}", language.as_str());
        }
    }
    Ok(())
}
