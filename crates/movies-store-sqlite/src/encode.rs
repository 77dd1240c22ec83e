//! Encoding and decoding helpers between domain types and SQLite columns,
//! plus the mapping from SQLite constraint codes to [`InsertOutcome`].
//!
//! Release dates are stored as `YYYY-MM-DD` text. Reference keys are stored
//! as INTEGER (ids) or TEXT (ISO codes).

use chrono::NaiveDate;
use movies_core::{
  record::{Category, Movie, ReferenceKey},
  store::InsertOutcome,
};
use rusqlite::{ErrorCode, ffi, types::Value};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Reference keys ──────────────────────────────────────────────────────────

pub fn encode_key(key: &ReferenceKey) -> Value {
  match key {
    ReferenceKey::Id(id) => Value::Integer(*id),
    ReferenceKey::Iso(iso) => Value::Text(iso.clone()),
  }
}

/// The entity table and junction table behind one [`Category`].
pub struct CategoryTables {
  pub entity:      &'static str,
  pub key_column:  &'static str,
  pub junction:    &'static str,
  pub link_column: &'static str,
}

pub fn category_tables(category: Category) -> CategoryTables {
  match category {
    Category::Genre => CategoryTables {
      entity:      "genres",
      key_column:  "id",
      junction:    "movie_genre",
      link_column: "genre_id",
    },
    Category::Keyword => CategoryTables {
      entity:      "keywords",
      key_column:  "id",
      junction:    "movie_keywords",
      link_column: "keyword_id",
    },
    Category::Company => CategoryTables {
      entity:      "production_companies",
      key_column:  "id",
      junction:    "movie_producer",
      link_column: "producer_id",
    },
    Category::Country => CategoryTables {
      entity:      "production_countries",
      key_column:  "iso_3166_1",
      junction:    "movie_country",
      link_column: "iso",
    },
    Category::Language => CategoryTables {
      entity:      "spoken_languages",
      key_column:  "iso_639_1",
      junction:    "movie_language",
      link_column: "iso",
    },
  }
}

// ─── Insert outcomes ─────────────────────────────────────────────────────────

/// Turn the result of an INSERT into an [`InsertOutcome`].
///
/// Constraint violations are expected during a load and become `Ok`; every
/// other SQLite error is returned unchanged.
pub fn classify_insert(result: rusqlite::Result<usize>) -> rusqlite::Result<InsertOutcome> {
  match result {
    Ok(_) => Ok(InsertOutcome::Inserted),
    Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
      Ok(match err.extended_code {
        ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE => {
          InsertOutcome::Duplicate
        }
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => InsertOutcome::MissingReference,
        _ => InsertOutcome::Rejected,
      })
    }
    Err(e) => Err(e),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column values read directly from a `movies` row.
pub struct RawMovie {
  pub id:                i64,
  pub budget:            Option<i64>,
  pub homepage:          Option<String>,
  pub original_language: String,
  pub original_title:    String,
  pub overview:          Option<String>,
  pub popularity:        Option<f64>,
  pub release_date:      Option<String>,
  pub revenue:           Option<i64>,
  pub runtime:           i64,
  pub status:            String,
  pub tagline:           Option<String>,
  pub title:             Option<String>,
  pub vote_average:      Option<f64>,
  pub vote_count:        Option<i64>,
}

impl RawMovie {
  pub const COLUMNS: &'static str = "id, budget, homepage, original_language, original_title, \
     overview, popularity, release_date, revenue, runtime, status, tagline, title, \
     vote_average, vote_count";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      budget:            row.get(1)?,
      homepage:          row.get(2)?,
      original_language: row.get(3)?,
      original_title:    row.get(4)?,
      overview:          row.get(5)?,
      popularity:        row.get(6)?,
      release_date:      row.get(7)?,
      revenue:           row.get(8)?,
      runtime:           row.get(9)?,
      status:            row.get(10)?,
      tagline:           row.get(11)?,
      title:             row.get(12)?,
      vote_average:      row.get(13)?,
      vote_count:        row.get(14)?,
    })
  }

  pub fn into_movie(self) -> Result<Movie> {
    Ok(Movie {
      id:                self.id,
      budget:            self.budget,
      homepage:          self.homepage,
      original_language: self.original_language,
      original_title:    self.original_title,
      overview:          self.overview,
      popularity:        self.popularity,
      release_date:      self.release_date.as_deref().map(decode_date).transpose()?,
      revenue:           self.revenue,
      runtime:           self.runtime,
      status:            self.status,
      tagline:           self.tagline,
      title:             self.title,
      vote_average:      self.vote_average,
      vote_count:        self.vote_count,
    })
  }
}
