mod cli;
mod config;

use crate::cli::{ApplyArgs, Cli, Command, EnrichArgs, PlanArgs, PruneArgs};
use crate::config::Config;
use buchfink_enrich::{CategoryMapper, Enricher, GoogleBooksClient, QueryCache, VolumeInfo};
use buchfink_extract::BookMetadata;
use buchfink_library::plan::{ReorganizationPlan, group, plan};
use buchfink_library::report::PlanReport;
use buchfink_library::scan::scan_records;
use buchfink_library::{BookFormat, EbookRecord, execute, prune};
use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr, bail, miette};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).into_diagnostic().wrap_err("cannot load configuration")?;
    match cli.command {
        Command::Plan(args) => run_plan(args, &config).await,
        Command::Apply(args) => run_apply(args, &config).await,
        Command::Enrich(args) => run_enrich(args, &config).await,
        Command::Prune(args) => run_prune(args).await,
    }
}

/// Scans the collection and builds the move plan without touching anything.
async fn build_plan(args: &PlanArgs, config: &Config) -> Result<(Vec<EbookRecord>, ReorganizationPlan)> {
    if !args.directory.is_dir() {
        bail!("not a directory: {}", args.directory.display());
    }
    let classifier = config.classifier();
    let records = scan_records(&args.directory, &classifier).await;
    let grouping = group(&records);
    let layout =
        config.target_layout(&args.directory, args.library_root.clone(), args.quarantine_root.clone());
    let built = plan(&args.directory, &records, &grouping, &layout);
    Ok((records, built))
}

fn print_and_persist_report(built: &ReorganizationPlan, args: &PlanArgs) -> Result<()> {
    let report = PlanReport::new(built).with_sample(args.sample);
    println!("{report}");
    if let Some(path) = &args.report {
        std::fs::write(path, report.detailed())
            .into_diagnostic()
            .wrap_err_with(|| format!("cannot write report to {}", path.display()))?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

async fn run_plan(args: PlanArgs, config: &Config) -> Result<()> {
    let (records, built) = build_plan(&args, config).await?;
    if records.is_empty() {
        println!("No ebooks found under {}", args.directory.display());
        return Ok(());
    }
    print_and_persist_report(&built, &args)?;
    println!("Dry run only. Use `buchfink apply` to move the files.");
    Ok(())
}

async fn run_apply(args: ApplyArgs, config: &Config) -> Result<()> {
    let (records, built) = build_plan(&args.plan, config).await?;
    if records.is_empty() {
        println!("No ebooks found under {}", args.plan.directory.display());
        return Ok(());
    }
    print_and_persist_report(&built, &args.plan)?;

    if !args.yes && !confirm()? {
        println!("Aborted, nothing was moved.");
        return Ok(());
    }

    let outcome = execute::apply(&built).await;
    println!("Moved {} of {} files.", outcome.succeeded, built.operations.len());
    if !outcome.is_clean() {
        println!("{} files failed:", outcome.failures.len());
        for failure in outcome.failures.iter().take(10) {
            println!("  {}: {}", failure.source.display(), failure.error);
        }
        if outcome.failures.len() > 10 {
            println!("  ... and {} more", outcome.failures.len() - 10);
        }
    }
    Ok(())
}

/// Asks on stdin before moving anything.
fn confirm() -> Result<bool> {
    print!("This will move files. Continue? [y/N] ");
    std::io::stdout().flush().into_diagnostic()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer).into_diagnostic()?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "j" | "ja"))
}

/// One line of the enrichment JSON export.
#[derive(Debug, Serialize)]
struct ExportEntry {
    filepath: String,
    relative_path: String,
    filename: String,
    /// Genre from the filename-keyword classifier.
    keyword_genre: String,
    /// Final genre after applying the enrichment preference rule.
    genre: String,
    metadata: BookMetadata,
    google: Option<VolumeInfo>,
}

async fn run_enrich(args: EnrichArgs, config: &Config) -> Result<()> {
    if !args.directory.is_dir() {
        bail!("not a directory: {}", args.directory.display());
    }
    let classifier = config.classifier();
    let records = scan_records(&args.directory, &classifier).await;
    let mut epubs: Vec<EbookRecord> = records.into_iter().filter(|r| r.format == BookFormat::Epub).collect();
    if let Some(max) = args.max_books {
        epubs.truncate(max);
    }
    if epubs.is_empty() {
        println!("No EPUB files found under {}", args.directory.display());
        return Ok(());
    }

    let cache_dir = args
        .cache_dir
        .or_else(QueryCache::default_dir)
        .ok_or_else(|| miette!("no usable cache directory; pass --cache-dir"))?;
    let cache = QueryCache::open(&cache_dir)
        .await
        .map_err(|e| miette!("cannot open query cache at {}: {e}", cache_dir.display()))?;
    let client = GoogleBooksClient::new(cache).map_err(|e| miette!("cannot build HTTP client: {e}"))?;
    let mapper = CategoryMapper::with_default_table(config.overrides.clone());
    let enricher = Enricher::new(client, mapper, config.labels.unclassified.clone());

    let total = epubs.len();
    let mut entries = Vec::with_capacity(total);
    for (index, record) in epubs.iter().enumerate() {
        println!("[{}/{}] {}", index + 1, total, record.file_name());
        let embedded = buchfink_extract::extract_or_default(&record.source_path);
        let enriched = match enricher.enrich(embedded).await {
            Ok(enriched) => enriched,
            Err(e) => {
                tracing::warn!(file = %record.file_name(), error = %e, "enrichment failed, keeping embedded metadata");
                continue;
            },
        };
        let genre = enricher.preferred_genre(&record.genre, &enriched.genre).to_string();
        entries.push(ExportEntry {
            filepath: record.source_path.display().to_string(),
            relative_path: record.relative_path.display().to_string(),
            filename: record.file_name(),
            keyword_genre: record.genre.clone(),
            genre,
            metadata: enriched.metadata,
            google: enriched.google,
        });
    }

    let json = serde_json::to_vec_pretty(&entries).into_diagnostic()?;
    std::fs::write(&args.output, json)
        .into_diagnostic()
        .wrap_err_with(|| format!("cannot write {}", args.output.display()))?;
    println!();
    print_genre_distribution(&entries);
    let with_data = entries.iter().filter(|entry| entry.google.is_some()).count();
    println!(
        "\nProcessed {} books, {} with Google Books data. Results in {}",
        entries.len(),
        with_data,
        args.output.display()
    );
    Ok(())
}

fn print_genre_distribution(entries: &[ExportEntry]) {
    let mut by_genre: BTreeMap<&str, Vec<&ExportEntry>> = BTreeMap::new();
    for entry in entries {
        by_genre.entry(entry.genre.as_str()).or_default().push(entry);
    }
    let mut genres: Vec<_> = by_genre.into_iter().collect();
    genres.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));

    println!("Genre distribution:");
    for (genre, books) in genres {
        let percentage = books.len() as f64 / entries.len() as f64 * 100.0;
        println!("  {genre:<30} {:>4} ({percentage:5.1}%)", books.len());
        for book in books.iter().take(10) {
            println!("    - {}", book.filename);
        }
        if books.len() > 10 {
            println!("    ... and {} more", books.len() - 10);
        }
    }
}

async fn run_prune(args: PruneArgs) -> Result<()> {
    if !args.directory.is_dir() {
        bail!("not a directory: {}", args.directory.display());
    }
    let report = prune::prune(&args.directory, args.delete).await;
    if report.empty.is_empty() {
        println!("No empty directories under {}", args.directory.display());
        return Ok(());
    }

    println!("Found {} empty directories:", report.empty.len());
    for (segment, count) in report.by_top_segment(&args.directory) {
        println!("  {segment:<30} {count:>4}");
    }
    for dir in report.empty.iter().take(20) {
        let relative = dir.strip_prefix(&args.directory).unwrap_or(dir);
        println!("    {}", relative.display());
    }
    if report.empty.len() > 20 {
        println!("    ... and {} more", report.empty.len() - 20);
    }

    if args.delete {
        println!("Deleted {} directories.", report.deleted);
        for (path, error) in report.failures.iter().take(10) {
            println!("  failed: {}: {error}", path.display());
        }
    } else {
        println!("Dry run only. Use --delete to remove them.");
    }
    Ok(())
}
