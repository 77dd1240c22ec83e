//! Domain types: the movie entity, the five reference entities and the
//! normalised record produced from one dataset row.
//!
//! Reference entities are shared between movies. A movie points at them
//! through append-only junction rows, one junction table per [`Category`].

use chrono::NaiveDate;
use serde::Deserialize;

// ─── Movie ───────────────────────────────────────────────────────────────────

/// The scalar attributes of one movie. Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
  pub id:                i64,
  pub budget:            Option<i64>,
  pub homepage:          Option<String>,
  pub original_language: String,
  pub original_title:    String,
  pub overview:          Option<String>,
  pub popularity:        Option<f64>,
  pub release_date:      Option<NaiveDate>,
  pub revenue:           Option<i64>,
  pub runtime:           i64,
  pub status:            String,
  pub tagline:           Option<String>,
  pub title:             Option<String>,
  pub vote_average:      Option<f64>,
  pub vote_count:        Option<i64>,
}

// ─── Reference entities ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Genre {
  pub id:   i64,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Keyword {
  pub id:   i64,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductionCompany {
  pub id:   i64,
  pub name: Option<String>,
}

/// Keyed by ISO 3166-1 alpha-2 code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductionCountry {
  pub iso_3166_1: String,
  pub name:       String,
}

/// Keyed by ISO 639-1 code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpokenLanguage {
  pub iso_639_1: String,
  pub name:      Option<String>,
}

/// The five kinds of reference entity a movie can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
  Genre,
  Keyword,
  Company,
  Country,
  Language,
}

impl Category {
  pub const ALL: [Category; 5] = [
    Category::Genre,
    Category::Keyword,
    Category::Company,
    Category::Country,
    Category::Language,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Category::Genre => "genre",
      Category::Keyword => "keyword",
      Category::Company => "company",
      Category::Country => "country",
      Category::Language => "language",
    }
  }
}

/// Primary key of a reference entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReferenceKey {
  Id(i64),
  Iso(String),
}

impl std::fmt::Display for ReferenceKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ReferenceKey::Id(id) => write!(f, "{id}"),
      ReferenceKey::Iso(iso) => f.write_str(iso),
    }
  }
}

/// One parsed sub-record of a movie row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
  Genre(Genre),
  Keyword(Keyword),
  Company(ProductionCompany),
  Country(ProductionCountry),
  Language(SpokenLanguage),
}

impl Reference {
  pub fn category(&self) -> Category {
    match self {
      Reference::Genre(_) => Category::Genre,
      Reference::Keyword(_) => Category::Keyword,
      Reference::Company(_) => Category::Company,
      Reference::Country(_) => Category::Country,
      Reference::Language(_) => Category::Language,
    }
  }

  pub fn key(&self) -> ReferenceKey {
    match self {
      Reference::Genre(g) => ReferenceKey::Id(g.id),
      Reference::Keyword(k) => ReferenceKey::Id(k.id),
      Reference::Company(c) => ReferenceKey::Id(c.id),
      Reference::Country(c) => ReferenceKey::Iso(c.iso_3166_1.clone()),
      Reference::Language(l) => ReferenceKey::Iso(l.iso_639_1.clone()),
    }
  }

  /// Display name; companies and languages may have none.
  pub fn name(&self) -> Option<&str> {
    match self {
      Reference::Genre(g) => Some(&g.name),
      Reference::Keyword(k) => Some(&k.name),
      Reference::Company(c) => c.name.as_deref(),
      Reference::Country(c) => Some(&c.name),
      Reference::Language(l) => l.name.as_deref(),
    }
  }
}

// ─── Normalised record ───────────────────────────────────────────────────────

/// A dataset row decomposed into its movie and its sub-records.
///
/// `references` holds genres, keywords, companies, countries and languages in
/// that order, each in the order the row listed them.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
  pub movie:      Movie,
  pub references: Vec<Reference>,
}

impl MovieRecord {
  /// The sub-records of a single category.
  pub fn of(&self, category: Category) -> impl Iterator<Item = &Reference> {
    self
      .references
      .iter()
      .filter(move |r| r.category() == category)
  }
}
