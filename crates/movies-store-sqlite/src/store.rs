//! [`SqliteStore`] — the SQLite implementation of [`MovieStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use movies_core::{
  record::{Movie, Reference},
  report::{TitleCompany, TitleGenre, TitlePopularity, TitleRevenue},
  store::{InsertOutcome, MovieStore, SchemaReport},
};

use crate::{
  Error, Result,
  encode::{RawMovie, category_tables, classify_insert, encode_date, encode_key},
  schema::{PRAGMAS, TABLES},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A movie store backed by a single SQLite database.
///
/// Cloning is cheap; clones share the one underlying connection and so the
/// same transaction.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) the database at `path`.
  ///
  /// Tables are not touched; call [`MovieStore::ensure_schema`].
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.apply_pragmas().await?;
    Ok(store)
  }

  /// Open an in-memory database — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.apply_pragmas().await?;
    Ok(store)
  }

  async fn apply_pragmas(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn execute_batch(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn table_exists(conn: &rusqlite::Connection, table: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        rusqlite::params![table],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

// ─── MovieStore impl ─────────────────────────────────────────────────────────

impl MovieStore for SqliteStore {
  type Error = Error;

  // ── Schema ────────────────────────────────────────────────────────────────

  async fn ensure_schema(&self) -> Result<SchemaReport> {
    let (report, missing) = self
      .conn
      .call(|conn| {
        let mut report = SchemaReport::default();
        let mut missing = Vec::new();

        for (table, ddl) in TABLES {
          let existed = table_exists(conn, table)?;
          if let Err(e) = conn.execute_batch(ddl) {
            tracing::warn!(table, error = %e, "table creation failed");
          }

          match (existed, table_exists(conn, table)?) {
            (true, _) => report.existing.push(table),
            (false, true) => report.created.push(table),
            (false, false) => missing.push(table),
          }
        }

        Ok((report, missing))
      })
      .await?;

    if !missing.is_empty() {
      return Err(Error::SchemaIncomplete { missing });
    }

    Ok(report)
  }

  // ── Load transaction ──────────────────────────────────────────────────────

  async fn begin(&self) -> Result<()> { self.execute_batch("BEGIN").await }

  async fn commit(&self) -> Result<()> { self.execute_batch("COMMIT").await }

  async fn rollback(&self) -> Result<()> { self.execute_batch("ROLLBACK").await }

  // ── Inserts ───────────────────────────────────────────────────────────────

  async fn insert_movie(&self, movie: &Movie) -> Result<InsertOutcome> {
    let m = movie.clone();
    let release_date = m.release_date.map(encode_date);

    let outcome = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(
          "INSERT INTO movies (
             id, budget, homepage, original_language, original_title,
             overview, popularity, release_date, revenue, runtime,
             status, tagline, title, vote_average, vote_count
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )?;
        Ok(classify_insert(stmt.execute(rusqlite::params![
          m.id,
          m.budget,
          m.homepage,
          m.original_language,
          m.original_title,
          m.overview,
          m.popularity,
          release_date,
          m.revenue,
          m.runtime,
          m.status,
          m.tagline,
          m.title,
          m.vote_average,
          m.vote_count,
        ]))?)
      })
      .await?;
    Ok(outcome)
  }

  async fn insert_reference(&self, reference: &Reference) -> Result<InsertOutcome> {
    let tables = category_tables(reference.category());
    let sql = format!(
      "INSERT INTO {} ({}, name) VALUES (?1, ?2)",
      tables.entity, tables.key_column
    );
    let key = encode_key(&reference.key());
    let name = reference.name().map(str::to_owned);

    let outcome = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(&sql)?;
        Ok(classify_insert(stmt.execute(rusqlite::params![key, name]))?)
      })
      .await?;
    Ok(outcome)
  }

  async fn link_reference(&self, movie_id: i64, reference: &Reference) -> Result<InsertOutcome> {
    let tables = category_tables(reference.category());
    let sql = format!(
      "INSERT INTO {} ({}, movie_id) VALUES (?1, ?2)",
      tables.junction, tables.link_column
    );
    let key = encode_key(&reference.key());

    let outcome = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare_cached(&sql)?;
        Ok(classify_insert(stmt.execute(rusqlite::params![key, movie_id]))?)
      })
      .await?;
    Ok(outcome)
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_movie(&self, id: i64) -> Result<Option<Movie>> {
    let raw: Option<RawMovie> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM movies WHERE id = ?1", RawMovie::COLUMNS),
              rusqlite::params![id],
              RawMovie::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMovie::into_movie).transpose()
  }

  async fn mean_budget(&self) -> Result<Option<f64>> {
    let mean: Option<f64> = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT AVG(budget) FROM movies", [], |r| r.get(0))?))
      .await?;
    Ok(mean)
  }

  async fn productions_in_country(&self, iso: &str, limit: usize) -> Result<Vec<TitleCompany>> {
    let iso = iso.to_owned();
    let limit = limit as i64;

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT m.original_title, COALESCE(pc.name, '')
           FROM movies m
           JOIN movie_producer       mp ON mp.movie_id = m.id
           JOIN production_companies pc ON pc.id       = mp.producer_id
           JOIN movie_country        mc ON mc.movie_id = m.id
           WHERE mc.iso = ?1
           ORDER BY m.id, mp.id
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![iso, limit], |row| {
            Ok(TitleCompany { title: row.get(0)?, company: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn top_revenue(&self, limit: usize) -> Result<Vec<TitleRevenue>> {
    let limit = limit as i64;

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT original_title, revenue
           FROM movies
           ORDER BY revenue DESC, id
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(TitleRevenue { title: row.get(0)?, revenue: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn movies_with_genres(
    &self,
    first:  i64,
    second: i64,
    limit:  usize,
  ) -> Result<Vec<TitleGenre>> {
    let limit = limit as i64;

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT m.original_title, g.name
           FROM movies m
           JOIN movie_genre mg ON mg.movie_id = m.id
           JOIN genres      g  ON g.id        = mg.genre_id
           WHERE m.id IN (SELECT movie_id FROM movie_genre WHERE genre_id = ?1)
             AND m.id IN (SELECT movie_id FROM movie_genre WHERE genre_id = ?2)
           ORDER BY m.id, mg.id
           LIMIT ?3",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![first, second, limit], |row| {
            Ok(TitleGenre { title: row.get(0)?, genre: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn above_mean_popularity(&self, limit: usize) -> Result<Vec<TitlePopularity>> {
    let limit = limit as i64;

    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT original_title, popularity
           FROM movies
           WHERE popularity > (SELECT AVG(popularity) FROM movies)
           ORDER BY id
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(TitlePopularity { title: row.get(0)?, popularity: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}
