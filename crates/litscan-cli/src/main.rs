//! litscan: literature counts for lists of search terms.
//! Entry point for the command line binary.
//!
//!   litscan info     database description and request provenance, as JSON
//!   litscan counts   load the configured term files, scrape, print reports

mod config;

use anyhow::Context;
use litscan_collect::info::collect_info;
use litscan_common::{Dim, FileStructure, TermKind};
use litscan_objects::Counts;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::RunConfig;

const USAGE: &str = "Usage: litscan <info|counts>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("litscan=debug,info")),
        )
        .init();

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let command = std::env::args().nth(1).unwrap_or_default();
    match command.as_str() {
        "info" => {
            // Database info needs no terms, so a missing config is fine here
            let config = RunConfig::load().unwrap_or_else(|e| {
                warn!("{e}");
                warn!("Using default collection settings.");
                RunConfig::default()
            });
            run_info(&config).await
        }
        "counts" => run_counts(&RunConfig::load()?).await,
        _ => {
            eprintln!("{USAGE}");
            Ok(())
        }
    }
}

async fn run_info(config: &RunConfig) -> anyhow::Result<()> {
    let files = FileStructure::new(&config.project);
    let meta = collect_info(&config.collection_config(&files)?).await?;
    println!("{}", meta.to_json()?);
    Ok(())
}

async fn run_counts(config: &RunConfig) -> anyhow::Result<()> {
    let files = FileStructure::create(&config.project)?;
    info!("Project folder:\n{}", files.check_file_structure()?);

    let mut counts = Counts::new();
    for (dim, dim_files) in config.terms.dims() {
        counts
            .add_terms_file(&dim_files.terms, TermKind::Terms, dim, &files)
            .with_context(|| format!("Loading terms for dimension {dim}"))?;
        if let Some(name) = &dim_files.inclusions {
            counts.add_terms_file(name, TermKind::Inclusions, dim, &files)?;
        }
        if let Some(name) = &dim_files.exclusions {
            counts.add_terms_file(name, TermKind::Exclusions, dim, &files)?;
        }
    }
    print!("{}", counts.check_terms(None));

    let scrape = counts.run_scrape(&config.collection_config(&files)?).await;
    if let Err(e) = &scrape {
        warn!("{e}");
    }

    // Report whatever completed, even after a partial failure
    for dim in counts.terms().dims() {
        if let Ok(report) = counts.check_counts(dim) {
            println!("{report}");
        }
        if let Ok(report) = counts.check_top(dim, config.report.top) {
            println!("{report}");
        }
    }
    let cooc_dims = if counts.is_square() { vec![Dim::A] } else { Dim::ALL.to_vec() };
    for &dim in &cooc_dims {
        if let Ok(report) = counts.check_cooc(dim) {
            println!("{report}");
        }
    }
    if let Some(score_type) = config.report.score {
        if counts.compute_score(score_type).is_ok() {
            for &dim in &cooc_dims {
                println!("{}", counts.check_score(dim)?);
            }
        }
    }

    if let Some(meta) = counts.meta_data() {
        let path = files.get_folder_path("data")?.join("meta_data.json");
        std::fs::write(&path, meta.to_json()?)?;
        info!("Saved collection record to {}", path.display());
    }

    scrape.context("Collection did not complete")?;
    Ok(())
}
