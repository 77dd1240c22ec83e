//! The `MovieStore` trait and the typed outcome of a single insert.
//!
//! The trait is the session object the loader and the report runner are
//! handed; storage backends (e.g. `movies-store-sqlite`) implement it. There
//! is no process-wide connection.

use std::future::Future;

use crate::{
  record::{Movie, Reference},
  report::{TitleCompany, TitleGenre, TitlePopularity, TitleRevenue},
};

// ─── Insert outcome ──────────────────────────────────────────────────────────

/// The expected results of an insert. Anything else is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertOutcome {
  Inserted,
  /// Primary-key or unique violation: the row is already present.
  Duplicate,
  /// Foreign-key violation: a referenced movie or entity is absent.
  MissingReference,
  /// Any other constraint violation (NOT NULL, CHECK).
  Rejected,
}

impl InsertOutcome {
  pub fn is_inserted(self) -> bool { matches!(self, Self::Inserted) }
}

/// Which tables a schema pass created and which were already present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
  pub created:  Vec<&'static str>,
  pub existing: Vec<&'static str>,
}

impl SchemaReport {
  pub fn table_count(&self) -> usize { self.created.len() + self.existing.len() }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relational database the dataset is loaded into.
///
/// Insert methods return `Ok` with an [`InsertOutcome`] for every constraint
/// violation; `Err` is reserved for failures the load cannot continue past.
pub trait MovieStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Schema ────────────────────────────────────────────────────────────

  /// Create every table that is absent. Safe to call repeatedly.
  ///
  /// Per-table creation failures are logged and tolerated; an error is
  /// returned only if some table is still missing afterwards.
  fn ensure_schema(
    &self,
  ) -> impl Future<Output = Result<SchemaReport, Self::Error>> + Send + '_;

  // ── Load transaction ──────────────────────────────────────────────────

  fn begin(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn commit(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn rollback(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Inserts ───────────────────────────────────────────────────────────

  fn insert_movie<'a>(
    &'a self,
    movie: &'a Movie,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + 'a;

  /// Insert the reference entity itself (genre, keyword, ...).
  fn insert_reference<'a>(
    &'a self,
    reference: &'a Reference,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + 'a;

  /// Insert the junction row linking `movie_id` to `reference`.
  fn link_reference<'a>(
    &'a self,
    movie_id: i64,
    reference: &'a Reference,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + 'a;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_movie(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Movie>, Self::Error>> + Send + '_;

  /// Mean budget over all movies; `None` when there are none.
  fn mean_budget(&self) -> impl Future<Output = Result<Option<f64>, Self::Error>> + Send + '_;

  /// (title, company) pairs for movies produced in the country `iso`.
  fn productions_in_country<'a>(
    &'a self,
    iso: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<TitleCompany>, Self::Error>> + Send + 'a;

  /// Movies by revenue, highest first.
  fn top_revenue(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<TitleRevenue>, Self::Error>> + Send + '_;

  /// (title, genre name) rows for movies tagged with both genres.
  fn movies_with_genres(
    &self,
    first: i64,
    second: i64,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<TitleGenre>, Self::Error>> + Send + '_;

  /// Movies more popular than the mean popularity.
  fn above_mean_popularity(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<TitlePopularity>, Self::Error>> + Send + '_;
}
