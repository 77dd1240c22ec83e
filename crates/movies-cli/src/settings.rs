//! Runtime settings: TOML file, then `MOVIES_*` environment variables, then
//! command-line overrides.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

pub const DEFAULT_DATABASE: &str = "movies.db";
pub const DEFAULT_INPUT: &str = "tmdb_5000_movies.csv";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite database file; created if absent.
  pub database_path: PathBuf,
  /// The dataset CSV.
  pub input_path:    PathBuf,
}

/// Values given on the command line, each overriding every other source.
#[derive(Debug, Default)]
pub struct Overrides {
  pub database_path: Option<PathBuf>,
  pub input_path:    Option<PathBuf>,
}

impl Settings {
  pub fn load(config_file: &Path, overrides: Overrides) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("database_path", DEFAULT_DATABASE)?
      .set_default("input_path", DEFAULT_INPUT)?
      .add_source(config::File::from(config_file).required(false))
      .add_source(config::Environment::with_prefix("MOVIES"))
      .set_override_option("database_path", overrides.database_path.map(path_value))?
      .set_override_option("input_path", overrides.input_path.map(path_value))?
      .build()
      .context("failed to read config file")?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("failed to deserialise Settings")?;

    settings.database_path = expand_tilde(&settings.database_path);
    settings.input_path = expand_tilde(&settings.input_path);
    Ok(settings)
  }
}

fn path_value(path: PathBuf) -> String { path.to_string_lossy().into_owned() }

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
