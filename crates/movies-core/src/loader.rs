//! The record loader: one dataset row in, up to eleven tables touched.
//!
//! Per row:
//!   1. parse all five sub-lists and the scalars; any failure skips the row
//!      before the store is touched
//!   2. insert the movie; anything but `Inserted` skips the row's relations
//!   3. for every sub-record, insert the reference entity and then the
//!      junction row, each independently of its siblings
//!
//! The whole pass runs inside one store transaction, committed after the last
//! row. Only store errors and input read errors abort the pass.

use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  dataset::StringRecord,
  parse::{RecordError, parse_row, peek_id},
  store::{InsertOutcome, MovieStore},
};

// ─── Outcomes ────────────────────────────────────────────────────────────────

/// Why a row produced no movie.
#[derive(Debug)]
pub enum SkipReason {
  /// A sub-list or scalar failed to parse.
  Malformed(RecordError),
  /// The store refused the movie row (duplicate id, constraint violation).
  MovieRejected(InsertOutcome),
}

#[derive(Debug)]
pub enum RecordOutcome {
  Loaded {
    movie_id: i64,
    /// Junction rows inserted for this movie.
    links:    usize,
  },
  Skipped {
    movie_id: Option<i64>,
    reason:   SkipReason,
  },
}

/// Counters for a whole load pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
  pub rows_read:                usize,
  pub movies_loaded:            usize,
  pub skipped_malformed_list:   usize,
  pub skipped_malformed_scalar: usize,
  pub skipped_movie_rejected:   usize,
  pub references_inserted:      usize,
  pub references_existing:      usize,
  pub references_rejected:      usize,
  pub links_inserted:           usize,
  pub links_ignored:            usize,
}

impl LoadSummary {
  pub fn rows_skipped(&self) -> usize {
    self.skipped_malformed_list + self.skipped_malformed_scalar + self.skipped_movie_rejected
  }
}

// ─── Loader ──────────────────────────────────────────────────────────────────

/// Loads rows one at a time into a store, keeping a running [`LoadSummary`].
///
/// Transaction boundaries are the caller's; see [`load`].
pub struct Loader<'s, S> {
  store:   &'s S,
  summary: LoadSummary,
}

impl<'s, S: MovieStore> Loader<'s, S> {
  pub fn new(store: &'s S) -> Self { Self { store, summary: LoadSummary::default() } }

  pub fn summary(&self) -> LoadSummary { self.summary }

  /// Normalise and insert one row.
  pub async fn load_record(&mut self, row: &StringRecord) -> Result<RecordOutcome> {
    self.summary.rows_read += 1;

    let record = match parse_row(row) {
      Ok(record) => record,
      Err(err) => {
        let movie_id = peek_id(row);
        if err.is_list_error() {
          self.summary.skipped_malformed_list += 1;
        } else {
          self.summary.skipped_malformed_scalar += 1;
        }
        debug!(?movie_id, error = %err, "skipping malformed row");
        return Ok(RecordOutcome::Skipped { movie_id, reason: SkipReason::Malformed(err) });
      }
    };

    let movie_id = record.movie.id;
    let outcome = self
      .store
      .insert_movie(&record.movie)
      .await
      .map_err(Error::store)?;
    if !outcome.is_inserted() {
      self.summary.skipped_movie_rejected += 1;
      debug!(movie_id, ?outcome, "movie rejected; skipping its relations");
      return Ok(RecordOutcome::Skipped {
        movie_id: Some(movie_id),
        reason:   SkipReason::MovieRejected(outcome),
      });
    }
    self.summary.movies_loaded += 1;

    let mut links = 0;
    for reference in &record.references {
      let category = reference.category().as_str();

      match self
        .store
        .insert_reference(reference)
        .await
        .map_err(Error::store)?
      {
        InsertOutcome::Inserted => self.summary.references_inserted += 1,
        InsertOutcome::Duplicate => self.summary.references_existing += 1,
        outcome => {
          self.summary.references_rejected += 1;
          debug!(movie_id, category, key = %reference.key(), ?outcome, "reference rejected");
        }
      }

      // Attempted even when the entity insert was refused: the entity may
      // already exist from an earlier movie.
      match self
        .store
        .link_reference(movie_id, reference)
        .await
        .map_err(Error::store)?
      {
        InsertOutcome::Inserted => {
          self.summary.links_inserted += 1;
          links += 1;
        }
        outcome => {
          self.summary.links_ignored += 1;
          debug!(movie_id, category, key = %reference.key(), ?outcome, "link not inserted");
        }
      }
    }

    Ok(RecordOutcome::Loaded { movie_id, links })
  }
}

/// Load every row inside a single transaction, committed at the end.
///
/// On an input or store error, or a failed commit, the transaction is rolled
/// back and the error returned; no partial load is ever committed.
pub async fn load<S, I>(store: &S, rows: I) -> Result<LoadSummary>
where
  S: MovieStore,
  I: IntoIterator<Item = Result<StringRecord>>,
{
  store.begin().await.map_err(Error::store)?;

  let mut loader = Loader::new(store);
  if let Err(err) = load_rows(&mut loader, rows).await {
    rollback(store).await;
    return Err(err);
  }

  if let Err(err) = store.commit().await {
    rollback(store).await;
    return Err(Error::store(err));
  }

  let summary = loader.summary();
  info!(
    rows = summary.rows_read,
    movies = summary.movies_loaded,
    skipped = summary.rows_skipped(),
    malformed_lists = summary.skipped_malformed_list,
    malformed_scalars = summary.skipped_malformed_scalar,
    rejected_movies = summary.skipped_movie_rejected,
    references = summary.references_inserted,
    links = summary.links_inserted,
    "load committed"
  );
  Ok(summary)
}

/// Best effort; a failure here is logged and the caller's error wins.
async fn rollback<S: MovieStore>(store: &S) {
  if let Err(err) = store.rollback().await {
    warn!(error = %err, "rollback after failed load also failed");
  }
}

async fn load_rows<S, I>(loader: &mut Loader<'_, S>, rows: I) -> Result<()>
where
  S: MovieStore,
  I: IntoIterator<Item = Result<StringRecord>>,
{
  for row in rows {
    loader.load_record(&row?).await?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;
  use crate::{
    dataset::column,
    parse::tests::row,
    record::{Movie, Reference, ReferenceKey},
    report::{TitleCompany, TitleGenre, TitlePopularity, TitleRevenue},
    store::SchemaReport,
  };

  // ─── Recording double ──────────────────────────────────────────────────────

  #[derive(Debug, Clone, PartialEq)]
  enum Call {
    Begin,
    Commit,
    Rollback,
    Movie(i64),
    Reference(ReferenceKey),
    Link(i64, ReferenceKey),
  }

  #[derive(Debug, thiserror::Error)]
  #[error("store failure")]
  struct Failure;

  /// Records every call; answers with scripted outcomes.
  #[derive(Default)]
  struct Recorder {
    calls:           Mutex<Vec<Call>>,
    movie_outcome:   Option<InsertOutcome>,
    refuse_refs:     Vec<ReferenceKey>,
    fail_on_movie:   Option<i64>,
    fail_commit:     bool,
  }

  impl Recorder {
    fn calls(&self) -> Vec<Call> { self.calls.lock().unwrap().clone() }

    fn push(&self, call: Call) { self.calls.lock().unwrap().push(call); }
  }

  impl MovieStore for Recorder {
    type Error = Failure;

    async fn ensure_schema(&self) -> Result<SchemaReport, Failure> { Ok(SchemaReport::default()) }

    async fn begin(&self) -> Result<(), Failure> {
      self.push(Call::Begin);
      Ok(())
    }

    async fn commit(&self) -> Result<(), Failure> {
      self.push(Call::Commit);
      if self.fail_commit {
        return Err(Failure);
      }
      Ok(())
    }

    async fn rollback(&self) -> Result<(), Failure> {
      self.push(Call::Rollback);
      Ok(())
    }

    async fn insert_movie(&self, movie: &Movie) -> Result<InsertOutcome, Failure> {
      self.push(Call::Movie(movie.id));
      if self.fail_on_movie == Some(movie.id) {
        return Err(Failure);
      }
      Ok(self.movie_outcome.unwrap_or(InsertOutcome::Inserted))
    }

    async fn insert_reference(&self, reference: &Reference) -> Result<InsertOutcome, Failure> {
      let key = reference.key();
      self.push(Call::Reference(key.clone()));
      if self.refuse_refs.contains(&key) {
        Ok(InsertOutcome::Rejected)
      } else {
        Ok(InsertOutcome::Inserted)
      }
    }

    async fn link_reference(
      &self,
      movie_id: i64,
      reference: &Reference,
    ) -> Result<InsertOutcome, Failure> {
      self.push(Call::Link(movie_id, reference.key()));
      Ok(InsertOutcome::Inserted)
    }

    async fn get_movie(&self, _id: i64) -> Result<Option<Movie>, Failure> { Ok(None) }

    async fn mean_budget(&self) -> Result<Option<f64>, Failure> { Ok(None) }

    async fn productions_in_country(
      &self,
      _iso: &str,
      _limit: usize,
    ) -> Result<Vec<TitleCompany>, Failure> {
      Ok(vec![])
    }

    async fn top_revenue(&self, _limit: usize) -> Result<Vec<TitleRevenue>, Failure> {
      Ok(vec![])
    }

    async fn movies_with_genres(
      &self,
      _first: i64,
      _second: i64,
      _limit: usize,
    ) -> Result<Vec<TitleGenre>, Failure> {
      Ok(vec![])
    }

    async fn above_mean_popularity(&self, _limit: usize) -> Result<Vec<TitlePopularity>, Failure> {
      Ok(vec![])
    }
  }

  // ─── Per-record policy ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn valid_row_inserts_movie_then_reference_and_link_pairs() {
    let store = Recorder::default();
    let mut loader = Loader::new(&store);

    let outcome = loader.load_record(&row(&[])).await.unwrap();
    assert!(matches!(outcome, RecordOutcome::Loaded { movie_id: 19995, links: 7 }));

    let calls = store.calls();
    assert_eq!(calls[0], Call::Movie(19995));
    assert_eq!(calls[1], Call::Reference(ReferenceKey::Id(28)));
    assert_eq!(calls[2], Call::Link(19995, ReferenceKey::Id(28)));
    assert_eq!(calls.len(), 1 + 7 * 2);
    assert_eq!(
      calls.last(),
      Some(&Call::Link(19995, ReferenceKey::Iso("es".into())))
    );
  }

  #[tokio::test]
  async fn malformed_list_touches_nothing() {
    let store = Recorder::default();
    let mut loader = Loader::new(&store);

    let outcome = loader
      .load_record(&row(&[(column::SPOKEN_LANGUAGES, "[{'iso_639_1': 'en'")]))
      .await
      .unwrap();

    assert!(matches!(
      outcome,
      RecordOutcome::Skipped { movie_id: Some(19995), reason: SkipReason::Malformed(_) }
    ));
    assert!(store.calls().is_empty());
    assert_eq!(loader.summary().skipped_malformed_list, 1);
    assert_eq!(loader.summary().movies_loaded, 0);
  }

  #[tokio::test]
  async fn malformed_scalar_touches_nothing() {
    let store = Recorder::default();
    let mut loader = Loader::new(&store);

    loader
      .load_record(&row(&[(column::RUNTIME, "")]))
      .await
      .unwrap();

    assert!(store.calls().is_empty());
    assert_eq!(loader.summary().skipped_malformed_scalar, 1);
  }

  #[tokio::test]
  async fn rejected_movie_suppresses_relations() {
    let store = Recorder { movie_outcome: Some(InsertOutcome::Duplicate), ..Default::default() };
    let mut loader = Loader::new(&store);

    let outcome = loader.load_record(&row(&[])).await.unwrap();

    assert!(matches!(
      outcome,
      RecordOutcome::Skipped {
        reason: SkipReason::MovieRejected(InsertOutcome::Duplicate),
        ..
      }
    ));
    assert_eq!(store.calls(), vec![Call::Movie(19995)]);
    assert_eq!(loader.summary().skipped_movie_rejected, 1);
  }

  #[tokio::test]
  async fn refused_reference_still_links_and_continues() {
    let store = Recorder {
      refuse_refs: vec![ReferenceKey::Id(28)],
      ..Default::default()
    };
    let mut loader = Loader::new(&store);

    let outcome = loader.load_record(&row(&[])).await.unwrap();
    assert!(matches!(outcome, RecordOutcome::Loaded { links: 7, .. }));

    let calls = store.calls();
    assert!(calls.contains(&Call::Link(19995, ReferenceKey::Id(28))));
    assert!(calls.contains(&Call::Reference(ReferenceKey::Id(878))));

    let summary = loader.summary();
    assert_eq!(summary.references_rejected, 1);
    assert_eq!(summary.references_inserted, 6);
  }

  // ─── Whole-pass policy ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn load_commits_once_after_all_rows() {
    let store = Recorder::default();
    let rows = vec![
      Ok(row(&[])),
      Ok(row(&[(column::ID, "2"), (column::GENRES, "")])),
      Ok(row(&[(column::ID, "3")])),
    ];

    let summary = load(&store, rows).await.unwrap();

    let calls = store.calls();
    assert_eq!(calls.first(), Some(&Call::Begin));
    assert_eq!(calls.last(), Some(&Call::Commit));
    assert_eq!(calls.iter().filter(|c| **c == Call::Commit).count(), 1);

    assert_eq!(summary.rows_read, 3);
    assert_eq!(summary.movies_loaded, 2);
    assert_eq!(summary.skipped_malformed_list, 1);
    assert_eq!(summary.links_inserted, 14);
  }

  #[tokio::test]
  async fn store_error_rolls_back_and_propagates() {
    let store = Recorder { fail_on_movie: Some(3), ..Default::default() };
    let rows = vec![Ok(row(&[])), Ok(row(&[(column::ID, "3")])), Ok(row(&[(column::ID, "4")]))];

    let err = load(&store, rows).await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));

    let calls = store.calls();
    assert_eq!(calls.last(), Some(&Call::Rollback));
    assert!(!calls.contains(&Call::Commit));
    assert!(!calls.contains(&Call::Movie(4)));
  }

  #[tokio::test]
  async fn input_error_rolls_back() {
    let store = Recorder::default();
    let io = std::io::Error::other("truncated");
    let rows = vec![Ok(row(&[])), Err(Error::Io(io))];

    let err = load(&store, rows).await.unwrap_err();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(store.calls().last(), Some(&Call::Rollback));
  }

  #[tokio::test]
  async fn failed_commit_rolls_back() {
    let store = Recorder { fail_commit: true, ..Default::default() };

    let err = load(&store, vec![Ok(row(&[]))]).await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));

    let calls = store.calls();
    let tail = &calls[calls.len() - 2..];
    assert_eq!(tail, &[Call::Commit, Call::Rollback][..]);
  }
}
