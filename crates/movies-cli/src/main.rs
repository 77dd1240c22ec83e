//! `movies` — load the TMDB 5000 movies CSV into SQLite and print reports.
//!
//! # Usage
//!
//! ```text
//! movies                         # load, then run all five reports
//! movies --query 3               # load, then run report 3 only
//! movies --skip-load --query 1   # report against an existing database
//! movies --config movies.toml --database ~/data/movies.db --input tmdb.csv
//! ```

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use movies_core::{
  dataset::Dataset,
  loader,
  report::{self, Report},
  store::MovieStore,
};
use movies_store_sqlite::SqliteStore;
use settings::{Overrides, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "movies", version, about = "Load the TMDB movie dataset and run fixed reports")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "movies.toml")]
  config: PathBuf,

  /// SQLite database file (overrides the config file).
  #[arg(long, value_name = "PATH")]
  database: Option<PathBuf>,

  /// Dataset CSV (overrides the config file).
  #[arg(long, value_name = "PATH")]
  input: Option<PathBuf>,

  /// Run only this report (1-5); all five run when omitted.
  #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
  query: Option<u8>,

  /// Skip loading and report on the database as it is.
  #[arg(long)]
  skip_load: bool,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(
    &cli.config,
    Overrides { database_path: cli.database.clone(), input_path: cli.input.clone() },
  )?;

  let store = SqliteStore::open(&settings.database_path)
    .await
    .with_context(|| format!("failed to open database at {:?}", settings.database_path))?;

  let schema = store.ensure_schema().await.context("failed to create schema")?;
  tracing::info!(
    created = schema.created.len(),
    existing = schema.existing.len(),
    "schema ready"
  );

  if !cli.skip_load {
    let dataset = Dataset::open(&settings.input_path)
      .with_context(|| format!("failed to open dataset {:?}", settings.input_path))?;
    loader::load(&store, dataset.rows())
      .await
      .context("load failed")?;
  }

  let reports = match cli.query {
    Some(n) => vec![Report::from_number(n).with_context(|| format!("invalid query {n}"))?],
    None => Report::ALL.to_vec(),
  };

  for selected in reports {
    let output = report::run(&store, selected)
      .await
      .with_context(|| format!("report {} failed", selected.number()))?;
    println!("{output}");
  }

  Ok(())
}
