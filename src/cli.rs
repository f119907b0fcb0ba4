//! Command-line surface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "buchfink", version, about = "Sorts an ebook collection into a genre/author library")]
pub struct Cli {
    /// Path to a configuration file (default: ./buchfink.toml, if present).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan a collection and preview the reorganization plan (dry run).
    Plan(PlanArgs),
    /// Plan and then actually move the files.
    Apply(ApplyArgs),
    /// Extract EPUB metadata and enrich it via Google Books.
    Enrich(EnrichArgs),
    /// Find (and optionally delete) empty directories left behind.
    Prune(PruneArgs),
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// The collection to scan.
    pub directory: PathBuf,

    /// Where the reorganized library goes (default: `<dir>_neu` beside the
    /// collection, per configuration).
    #[arg(long, value_name = "DIR")]
    pub library_root: Option<PathBuf>,

    /// Where duplicate losers are parked.
    #[arg(long, value_name = "DIR")]
    pub quarantine_root: Option<PathBuf>,

    /// How many planned operations to show in the preview.
    #[arg(long, default_value_t = 10)]
    pub sample: usize,

    /// Also write the full per-genre report to this file.
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub plan: PlanArgs,

    /// Skip the interactive confirmation.
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct EnrichArgs {
    /// The collection to scan for EPUB files.
    pub directory: PathBuf,

    /// Only process the first N books (useful for testing the waters).
    #[arg(long, value_name = "N")]
    pub max_books: Option<usize>,

    /// Write the enriched metadata to this JSON file.
    #[arg(long, value_name = "FILE", default_value = "enriched_metadata.json")]
    pub output: PathBuf,

    /// Query cache directory (default: the per-user cache dir).
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PruneArgs {
    /// The directory tree to sweep.
    pub directory: PathBuf,

    /// Actually delete the empty directories (default is a dry run).
    #[arg(long)]
    pub delete: bool,
}
