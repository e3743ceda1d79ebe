mod logging;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use ging_core::config::{Config, Settings};
use ging_core::traits::FetchTransport;
use ging_pipeline::{index_all, read_fetch_file, BatchReport, IndexQueue, SubmitError};
use ging_text::DocIndex;

#[derive(Debug, Parser)]
#[command(name = "ging", version, about = "Index and search Go package documentation")]
struct Options {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch, document and index Go packages.
    Index {
        /// Import paths, e.g. github.com/gorilla/mux.
        paths: Vec<String>,
        /// JSON file with an array of {"path": "..."} targets.
        #[arg(long, value_name = "FILE")]
        fetch_file: Option<PathBuf>,
        /// Read sources from $GOPATH/src instead of GitHub.
        #[arg(long)]
        local: bool,
        /// Delete the index and start over.
        #[arg(long)]
        rebuild: bool,
    },
    /// Read import paths from stdin, one per line, and index them in the background.
    Queue {
        #[arg(long)]
        local: bool,
    },
    /// Phrase search over names and documentation.
    Search {
        query: String,
        /// Maximum number of results (defaults to search.limit).
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
        limit: Option<u32>,
    },
}

fn main() -> Result<()> {
    let options = Options::parse();
    logging::init(options.verbose);
    let config = Config::load().context("loading configuration")?;
    let mut settings = config.settings()?;

    match options.command {
        Command::Index { paths, fetch_file, local, rebuild } => {
            settings.fetch.local |= local;
            let mut targets = paths;
            if let Some(file) = fetch_file {
                targets.extend(read_fetch_file(&file)?);
            }
            if targets.is_empty() {
                bail!("nothing to index: pass import paths or --fetch-file");
            }
            let index = open_index(&settings, rebuild)?;
            let transport = ging_source::transport_from_settings(&settings)?;
            run_index(transport.as_ref(), &index, &targets)
        }
        Command::Queue { local } => {
            settings.fetch.local |= local;
            let index = Arc::new(open_index(&settings, false)?);
            let transport: Arc<dyn FetchTransport> = Arc::from(ging_source::transport_from_settings(&settings)?);
            let runtime = tokio::runtime::Runtime::new()?;
            let report = runtime.block_on(run_queue(Arc::clone(&transport), index, settings.queue.capacity))?;
            drop(runtime);
            print_report(&report);
            finish(&report)
        }
        Command::Search { query, limit } => {
            let query = query.trim();
            if query.is_empty() {
                bail!("empty query");
            }
            let path = settings.index_path(&std::env::current_dir()?);
            let index = DocIndex::open_read_only(&path)?;
            let limit = limit.map_or(settings.search.limit, |n| n as usize);
            let page = ging_text::search(&index, query, limit, &settings.search.link_base)?;
            println!("🔍 {}", page.summary());
            for (i, result) in page.results.iter().enumerate() {
                println!("\n  {}. [{}] {}  score={:.4}", i + 1, result.kind, result.name, result.score);
                println!("     {}", result.link);
                if !result.highlights.doc.is_empty() {
                    println!("     {}", result.highlights.doc);
                }
            }
            Ok(())
        }
    }
}

fn open_index(settings: &Settings, rebuild: bool) -> Result<DocIndex> {
    let path = settings.index_path(&std::env::current_dir()?);
    let index = if rebuild {
        info!(path = %path.display(), "rebuilding index");
        DocIndex::recreate(&path, settings.index.writer_memory)?
    } else {
        DocIndex::open_or_create(&path, settings.index.writer_memory)?
    };
    Ok(index)
}

fn run_index(transport: &dyn FetchTransport, index: &DocIndex, targets: &[String]) -> Result<()> {
    let bar = ProgressBar::new(targets.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    let report = index_all(transport, index, targets, |path, _| {
        bar.set_message(path.to_string());
        bar.inc(1);
    });
    bar.finish_and_clear();
    print_report(&report);
    finish(&report)
}

async fn run_queue(transport: Arc<dyn FetchTransport>, index: Arc<DocIndex>, capacity: usize) -> Result<BatchReport> {
    let mut queue = IndexQueue::start(transport, index, capacity);
    let lines = tokio::task::spawn_blocking(|| std::io::stdin().lock().lines().collect::<std::io::Result<Vec<_>>>()).await??;
    for path in lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty()) {
        loop {
            match queue.submit(path) {
                Ok(()) => break,
                Err(SubmitError::Full(_)) => tokio::time::sleep(Duration::from_millis(200)).await,
                Err(e) => {
                    warn!(error = %e, "submission skipped");
                    break;
                }
            }
        }
    }
    Ok(queue.shutdown().await)
}

fn print_report(report: &BatchReport) {
    for ok in &report.indexed {
        println!("✅ {} ({} documents)", ok.path, ok.documents);
    }
    for failure in &report.failed {
        let hint = if failure.retryable { " (retryable)" } else { "" };
        println!("❌ {} [{}]{}: {}", failure.path, failure.kind, hint, failure.message);
    }
    println!("\n📊 {}", report);
}

fn finish(report: &BatchReport) -> Result<()> {
    if report.is_success() {
        Ok(())
    } else {
        bail!("{} of {} targets failed", report.failed.len(), report.failed.len() + report.indexed.len())
    }
}
