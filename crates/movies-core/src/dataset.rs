//! Reader for the TMDB 5000 movies CSV.
//!
//! Columns are addressed by position. The header row is only compared against
//! the expected layout so a reordered file shows up in the logs.

use std::{fs::File, io, path::Path};

use csv::ReaderBuilder;
pub use csv::StringRecord;

use crate::Result;

// ─── Layout ──────────────────────────────────────────────────────────────────

/// Column positions in a dataset row.
pub mod column {
  pub const BUDGET:               usize = 0;
  pub const GENRES:               usize = 1;
  pub const HOMEPAGE:             usize = 2;
  pub const ID:                   usize = 3;
  pub const KEYWORDS:             usize = 4;
  pub const ORIGINAL_LANGUAGE:    usize = 5;
  pub const ORIGINAL_TITLE:       usize = 6;
  pub const OVERVIEW:             usize = 7;
  pub const POPULARITY:           usize = 8;
  pub const PRODUCTION_COMPANIES: usize = 9;
  pub const PRODUCTION_COUNTRIES: usize = 10;
  pub const RELEASE_DATE:         usize = 11;
  pub const REVENUE:              usize = 12;
  pub const RUNTIME:              usize = 13;
  pub const SPOKEN_LANGUAGES:     usize = 14;
  pub const STATUS:               usize = 15;
  pub const TAGLINE:              usize = 16;
  pub const TITLE:                usize = 17;
  pub const VOTE_AVERAGE:         usize = 18;
  pub const VOTE_COUNT:           usize = 19;
}

/// Header names in column order.
pub const HEADERS: [&str; 20] = [
  "budget",
  "genres",
  "homepage",
  "id",
  "keywords",
  "original_language",
  "original_title",
  "overview",
  "popularity",
  "production_companies",
  "production_countries",
  "release_date",
  "revenue",
  "runtime",
  "spoken_languages",
  "status",
  "tagline",
  "title",
  "vote_average",
  "vote_count",
];

// ─── Reader ──────────────────────────────────────────────────────────────────

/// A dataset positioned after its header row.
pub struct Dataset<R> {
  reader: csv::Reader<R>,
}

impl Dataset<File> {
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let file = File::open(path)?;
    Self::from_reader(file)
  }
}

impl<R: io::Read> Dataset<R> {
  pub fn from_reader(input: R) -> Result<Self> {
    // Short rows must reach the parser so they are skipped individually.
    let mut reader = ReaderBuilder::new()
      .has_headers(true)
      .flexible(true)
      .from_reader(input);

    let headers = reader.headers()?;
    if !header_matches(headers) {
      tracing::warn!(
        found = ?headers.iter().collect::<Vec<_>>(),
        "dataset header differs from the expected layout; reading by position"
      );
    }

    Ok(Self { reader })
  }

  /// Iterate the data rows. Read and decode errors are yielded, not skipped.
  pub fn rows(self) -> impl Iterator<Item = Result<StringRecord>> {
    self.reader.into_records().map(|r| r.map_err(Into::into))
  }
}

fn header_matches(headers: &StringRecord) -> bool {
  headers.len() == HEADERS.len()
    && headers
      .iter()
      .zip(HEADERS)
      .all(|(found, expected)| found.trim() == expected)
}
