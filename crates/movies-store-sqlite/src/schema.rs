//! SQL schema for the movie store: eleven tables, created one at a time.
//!
//! Each table is its own statement so a failure on one does not prevent the
//! others from being attempted. Order matters: a junction table follows both
//! of its parents.

/// Connection-level settings, applied once when the store is opened.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// `(table, DDL)` pairs in creation order.
pub const TABLES: [(&str, &str); 11] = [
  ("movies", "
CREATE TABLE IF NOT EXISTS movies (
    id                INTEGER PRIMARY KEY,
    budget            INTEGER,
    homepage          TEXT,
    original_language TEXT    NOT NULL,
    original_title    TEXT    NOT NULL,
    overview          TEXT,
    popularity        REAL,
    release_date      TEXT,            -- YYYY-MM-DD
    revenue           INTEGER,
    runtime           INTEGER NOT NULL,
    status            TEXT    NOT NULL,
    tagline           TEXT,
    title             TEXT,
    vote_average      REAL,
    vote_count        INTEGER
)"),
  ("genres", "
CREATE TABLE IF NOT EXISTS genres (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL
)"),
  ("movie_genre", "
CREATE TABLE IF NOT EXISTS movie_genre (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    genre_id INTEGER NOT NULL REFERENCES genres(id),
    movie_id INTEGER NOT NULL REFERENCES movies(id),
    UNIQUE (movie_id, genre_id)
)"),
  ("keywords", "
CREATE TABLE IF NOT EXISTS keywords (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL
)"),
  ("movie_keywords", "
CREATE TABLE IF NOT EXISTS movie_keywords (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    keyword_id INTEGER NOT NULL REFERENCES keywords(id),
    movie_id   INTEGER NOT NULL REFERENCES movies(id),
    UNIQUE (movie_id, keyword_id)
)"),
  ("production_companies", "
CREATE TABLE IF NOT EXISTS production_companies (
    id   INTEGER PRIMARY KEY,
    name TEXT
)"),
  ("movie_producer", "
CREATE TABLE IF NOT EXISTS movie_producer (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    producer_id INTEGER NOT NULL REFERENCES production_companies(id),
    movie_id    INTEGER NOT NULL REFERENCES movies(id),
    UNIQUE (movie_id, producer_id)
)"),
  ("production_countries", "
CREATE TABLE IF NOT EXISTS production_countries (
    iso_3166_1 TEXT PRIMARY KEY,
    name       TEXT NOT NULL
)"),
  ("movie_country", "
CREATE TABLE IF NOT EXISTS movie_country (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    iso      TEXT    NOT NULL REFERENCES production_countries(iso_3166_1),
    movie_id INTEGER NOT NULL REFERENCES movies(id),
    UNIQUE (movie_id, iso)
)"),
  ("spoken_languages", "
CREATE TABLE IF NOT EXISTS spoken_languages (
    iso_639_1 TEXT PRIMARY KEY,
    name      TEXT
)"),
  ("movie_language", "
CREATE TABLE IF NOT EXISTS movie_language (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    iso      TEXT    NOT NULL REFERENCES spoken_languages(iso_639_1),
    movie_id INTEGER NOT NULL REFERENCES movies(id),
    UNIQUE (movie_id, iso)
)"),
];

/// Names of every table the schema defines, in creation order.
pub const TABLE_NAMES: [&str; 11] = [
  TABLES[0].0,
  TABLES[1].0,
  TABLES[2].0,
  TABLES[3].0,
  TABLES[4].0,
  TABLES[5].0,
  TABLES[6].0,
  TABLES[7].0,
  TABLES[8].0,
  TABLES[9].0,
  TABLES[10].0,
];
