//! Dataset row → [`MovieRecord`] normalisation.
//!
//! Pipeline:
//!   StringRecord
//!     └─ parse_list() × 5   → typed sub-records (any failure skips the row)
//!          └─ parse_movie() → Movie scalars
//!               └─ MovieRecord
//!
//! Parsing never touches the store; a [`RecordError`] is always a data-quality
//! problem with the row, never a database failure.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
  dataset::{StringRecord, column},
  record::{
    Genre, Keyword, Movie, MovieRecord, ProductionCompany, ProductionCountry,
    Reference, SpokenLanguage,
  },
};

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RecordError {
  /// The row is too short to contain the sub-list column.
  #[error("missing {column} list")]
  MissingList { column: &'static str },

  #[error("malformed {column} list: {source}")]
  MalformedList {
    column: &'static str,
    #[source]
    source: serde_json::Error,
  },

  #[error("malformed {field} value {value:?}: {reason}")]
  MalformedScalar {
    field:  &'static str,
    value:  String,
    reason: &'static str,
  },
}

impl RecordError {
  /// Whether the error came from one of the five embedded sub-lists.
  pub fn is_list_error(&self) -> bool {
    matches!(self, Self::MissingList { .. } | Self::MalformedList { .. })
  }
}

type Result<T> = std::result::Result<T, RecordError>;

// ─── Row parsing ─────────────────────────────────────────────────────────────

/// Parse one dataset row.
///
/// The sub-lists are checked first, so a row with a malformed list is
/// reported as such even when its scalars are also bad.
pub fn parse_row(row: &StringRecord) -> Result<MovieRecord> {
  let genres: Vec<Genre> = parse_list(row, column::GENRES, "genres")?;
  let keywords: Vec<Keyword> = parse_list(row, column::KEYWORDS, "keywords")?;
  let companies: Vec<ProductionCompany> =
    parse_list(row, column::PRODUCTION_COMPANIES, "production_companies")?;
  let countries: Vec<ProductionCountry> =
    parse_list(row, column::PRODUCTION_COUNTRIES, "production_countries")?;
  let languages: Vec<SpokenLanguage> =
    parse_list(row, column::SPOKEN_LANGUAGES, "spoken_languages")?;

  let movie = parse_movie(row)?;

  let mut references = Vec::with_capacity(
    genres.len() + keywords.len() + companies.len() + countries.len() + languages.len(),
  );
  references.extend(genres.into_iter().map(Reference::Genre));
  references.extend(keywords.into_iter().map(Reference::Keyword));
  references.extend(companies.into_iter().map(Reference::Company));
  references.extend(countries.into_iter().map(Reference::Country));
  references.extend(languages.into_iter().map(Reference::Language));

  Ok(MovieRecord { movie, references })
}

/// Best-effort movie id of a row, for diagnostics on rows that fail to parse.
pub fn peek_id(row: &StringRecord) -> Option<i64> {
  row.get(column::ID).and_then(|s| parse_integer(s.trim()))
}

fn parse_list<T: DeserializeOwned>(
  row:    &StringRecord,
  index:  usize,
  column: &'static str,
) -> Result<Vec<T>> {
  let text = row.get(index).ok_or(RecordError::MissingList { column })?;
  serde_json::from_str(text).map_err(|source| RecordError::MalformedList { column, source })
}

fn parse_movie(row: &StringRecord) -> Result<Movie> {
  Ok(Movie {
    id:                required_int(row, column::ID, "id")?,
    budget:            optional_int(row, column::BUDGET, "budget")?,
    homepage:          optional_text(row, column::HOMEPAGE),
    original_language: required_text(row, column::ORIGINAL_LANGUAGE, "original_language")?,
    original_title:    required_text(row, column::ORIGINAL_TITLE, "original_title")?,
    overview:          optional_text(row, column::OVERVIEW),
    popularity:        optional_float(row, column::POPULARITY, "popularity")?,
    release_date:      optional_date(row, column::RELEASE_DATE, "release_date")?,
    revenue:           optional_int(row, column::REVENUE, "revenue")?,
    runtime:           required_int(row, column::RUNTIME, "runtime")?,
    status:            required_text(row, column::STATUS, "status")?,
    tagline:           optional_text(row, column::TAGLINE),
    title:             optional_text(row, column::TITLE),
    vote_average:      optional_float(row, column::VOTE_AVERAGE, "vote_average")?,
    vote_count:        optional_int(row, column::VOTE_COUNT, "vote_count")?,
  })
}

// ─── Scalar helpers ──────────────────────────────────────────────────────────

fn cell(row: &StringRecord, index: usize) -> &str { row.get(index).unwrap_or("") }

fn malformed(field: &'static str, value: &str, reason: &'static str) -> RecordError {
  RecordError::MalformedScalar { field, value: value.to_owned(), reason }
}

/// Integers are accepted in float notation when integral (`"162.0"`), which
/// is how the dataset writes columns that contain gaps.
fn parse_integer(s: &str) -> Option<i64> {
  if let Ok(n) = s.parse::<i64>() {
    return Some(n);
  }
  let f = s.parse::<f64>().ok()?;
  (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn optional_int(row: &StringRecord, index: usize, field: &'static str) -> Result<Option<i64>> {
  let raw = cell(row, index).trim();
  if raw.is_empty() {
    return Ok(None);
  }
  parse_integer(raw)
    .map(Some)
    .ok_or_else(|| malformed(field, raw, "not an integer"))
}

fn required_int(row: &StringRecord, index: usize, field: &'static str) -> Result<i64> {
  optional_int(row, index, field)?.ok_or_else(|| malformed(field, "", "required"))
}

fn optional_float(row: &StringRecord, index: usize, field: &'static str) -> Result<Option<f64>> {
  let raw = cell(row, index).trim();
  if raw.is_empty() {
    return Ok(None);
  }
  match raw.parse::<f64>() {
    Ok(f) if f.is_finite() => Ok(Some(f)),
    _ => Err(malformed(field, raw, "not a number")),
  }
}

fn optional_date(
  row:   &StringRecord,
  index: usize,
  field: &'static str,
) -> Result<Option<NaiveDate>> {
  let raw = cell(row, index).trim();
  if raw.is_empty() {
    return Ok(None);
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .map(Some)
    .map_err(|_| malformed(field, raw, "not a YYYY-MM-DD date"))
}

fn required_text(row: &StringRecord, index: usize, field: &'static str) -> Result<String> {
  let raw = cell(row, index);
  if raw.trim().is_empty() {
    return Err(malformed(field, raw, "required"));
  }
  Ok(raw.to_owned())
}

fn optional_text(row: &StringRecord, index: usize) -> Option<String> {
  let raw = cell(row, index);
  (!raw.is_empty()).then(|| raw.to_owned())
}

#[cfg(test)]
pub(crate) mod tests {
  use crate::record::Category;

  use super::*;

  /// A complete, valid row (Avatar-shaped) with per-column overrides.
  pub(crate) fn row(overrides: &[(usize, &str)]) -> StringRecord {
    let mut cells: Vec<String> = vec![
      "237000000",
      r#"[{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}]"#,
      "http://www.avatarmovie.com/",
      "19995",
      r#"[{"id": 1463, "name": "culture clash"}]"#,
      "en",
      "Avatar",
      "In the 22nd century, a paraplegic Marine is dispatched to the moon Pandora.",
      "150.437577",
      r#"[{"name": "Ingenious Film Partners", "id": 289}]"#,
      r#"[{"iso_3166_1": "US", "name": "United States of America"}]"#,
      "2009-12-10",
      "2787965087",
      "162.0",
      r#"[{"iso_639_1": "en", "name": "English"}, {"iso_639_1": "es", "name": "Español"}]"#,
      "Released",
      "Enter the World of Pandora.",
      "Avatar",
      "7.2",
      "11800",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect();
    for (index, value) in overrides {
      cells[*index] = (*value).to_owned();
    }
    StringRecord::from(cells)
  }

  #[test]
  fn valid_row_parses_scalars() {
    let record = parse_row(&row(&[])).unwrap();
    let m = &record.movie;
    assert_eq!(m.id, 19995);
    assert_eq!(m.budget, Some(237_000_000));
    assert_eq!(m.runtime, 162);
    assert_eq!(m.revenue, Some(2_787_965_087));
    assert_eq!(m.release_date, NaiveDate::from_ymd_opt(2009, 12, 10));
    assert_eq!(m.vote_count, Some(11800));
    assert_eq!(m.original_title, "Avatar");
    assert_eq!(m.popularity, Some(150.437577));
  }

  #[test]
  fn valid_row_parses_sub_lists_in_category_order() {
    let record = parse_row(&row(&[])).unwrap();
    assert_eq!(record.references.len(), 7);
    assert_eq!(record.of(Category::Genre).count(), 2);
    assert_eq!(record.of(Category::Language).count(), 2);

    let categories: Vec<_> = record.references.iter().map(Reference::category).collect();
    let mut sorted = categories.clone();
    sorted.sort_by_key(|c| Category::ALL.iter().position(|x| x == c));
    assert_eq!(categories, sorted);

    let company = record.of(Category::Company).next().unwrap();
    assert_eq!(company.name(), Some("Ingenious Film Partners"));
  }

  #[test]
  fn empty_lists_are_valid() {
    let record = parse_row(&row(&[(column::GENRES, "[]"), (column::KEYWORDS, "[]")])).unwrap();
    assert_eq!(record.of(Category::Genre).count(), 0);
    assert_eq!(record.of(Category::Keyword).count(), 0);
  }

  #[test]
  fn malformed_list_names_the_column() {
    let err = parse_row(&row(&[(column::KEYWORDS, "[{\"id\": 1, ")])).unwrap_err();
    assert!(matches!(err, RecordError::MalformedList { column: "keywords", .. }));
    assert!(err.is_list_error());
  }

  #[test]
  fn empty_list_cell_is_malformed() {
    let err = parse_row(&row(&[(column::GENRES, "")])).unwrap_err();
    assert!(matches!(err, RecordError::MalformedList { column: "genres", .. }));
  }

  #[test]
  fn group_without_required_key_is_malformed() {
    let err =
      parse_row(&row(&[(column::PRODUCTION_COUNTRIES, r#"[{"name": "Nowhere"}]"#)])).unwrap_err();
    assert!(matches!(err, RecordError::MalformedList { column: "production_countries", .. }));
  }

  #[test]
  fn short_row_is_a_missing_list() {
    let short = StringRecord::from(vec!["0", "[]", "", "5", "[]"]);
    let err = parse_row(&short).unwrap_err();
    assert!(matches!(err, RecordError::MissingList { column: "production_companies" }));
    assert_eq!(peek_id(&short), Some(5));
  }

  #[test]
  fn list_errors_take_precedence_over_scalar_errors() {
    let err = parse_row(&row(&[(column::ID, "abc"), (column::GENRES, "nope")])).unwrap_err();
    assert!(err.is_list_error());
  }

  #[test]
  fn bad_scalars_are_malformed_scalar() {
    let err = parse_row(&row(&[(column::RUNTIME, "")])).unwrap_err();
    assert!(matches!(err, RecordError::MalformedScalar { field: "runtime", .. }));
    assert!(!err.is_list_error());

    let err = parse_row(&row(&[(column::BUDGET, "lots")])).unwrap_err();
    assert!(matches!(err, RecordError::MalformedScalar { field: "budget", .. }));

    let err = parse_row(&row(&[(column::RELEASE_DATE, "10/12/2009")])).unwrap_err();
    assert!(matches!(err, RecordError::MalformedScalar { field: "release_date", .. }));

    let err = parse_row(&row(&[(column::RUNTIME, "162.5")])).unwrap_err();
    assert!(matches!(err, RecordError::MalformedScalar { field: "runtime", .. }));
  }

  #[test]
  fn empty_optional_fields_become_none() {
    let record = parse_row(&row(&[
      (column::HOMEPAGE, ""),
      (column::RELEASE_DATE, ""),
      (column::TAGLINE, ""),
      (column::POPULARITY, ""),
    ]))
    .unwrap();
    assert_eq!(record.movie.homepage, None);
    assert_eq!(record.movie.release_date, None);
    assert_eq!(record.movie.tagline, None);
    assert_eq!(record.movie.popularity, None);
  }

  #[test]
  fn blank_required_text_is_malformed() {
    for (index, field) in [
      (column::ORIGINAL_LANGUAGE, "original_language"),
      (column::ORIGINAL_TITLE, "original_title"),
      (column::STATUS, "status"),
    ] {
      let err = parse_row(&row(&[(index, "   ")])).unwrap_err();
      assert!(
        matches!(err, RecordError::MalformedScalar { field: f, .. } if f == field),
        "{field}: {err:?}"
      );
    }
  }

  #[test]
  fn null_company_and_language_names_are_kept() {
    let record = parse_row(&row(&[
      (column::PRODUCTION_COMPANIES, r#"[{"name": null, "id": 289}]"#),
      (column::SPOKEN_LANGUAGES, r#"[{"iso_639_1": "xx", "name": null}]"#),
    ]))
    .unwrap();
    assert_eq!(record.of(Category::Company).next().unwrap().name(), None);
    assert_eq!(record.of(Category::Language).next().unwrap().name(), None);
  }

  #[test]
  fn integral_floats_are_integers() {
    assert_eq!(parse_integer("162.0"), Some(162));
    assert_eq!(parse_integer("-3"), Some(-3));
    assert_eq!(parse_integer("1.5"), None);
    assert_eq!(parse_integer("NaN"), None);
  }
}
