//! The five fixed reports run against a loaded store.

use std::fmt;

use crate::{Error, Result, store::MovieStore};

/// Row cap shared by every list report.
pub const REPORT_LIMIT: usize = 5;

pub const PRODUCTION_COUNTRY: &str = "US";
pub const GENRE_SCIENCE_FICTION: i64 = 878;
pub const GENRE_MYSTERY: i64 = 9648;

// ─── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TitleCompany {
  pub title:   String,
  pub company: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleRevenue {
  pub title:   String,
  pub revenue: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleGenre {
  pub title: String,
  pub genre: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitlePopularity {
  pub title:      String,
  pub popularity: f64,
}

// ─── Report selector ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
  MeanBudget,
  UsProductions,
  TopRevenue,
  SciFiMystery,
  AbovePopularity,
}

impl Report {
  pub const ALL: [Report; 5] = [
    Report::MeanBudget,
    Report::UsProductions,
    Report::TopRevenue,
    Report::SciFiMystery,
    Report::AbovePopularity,
  ];

  /// The 1-based selector used on the command line.
  pub fn number(self) -> u8 {
    match self {
      Report::MeanBudget => 1,
      Report::UsProductions => 2,
      Report::TopRevenue => 3,
      Report::SciFiMystery => 4,
      Report::AbovePopularity => 5,
    }
  }

  pub fn from_number(n: u8) -> Option<Self> {
    Self::ALL.into_iter().find(|r| r.number() == n)
  }

  pub fn title(self) -> &'static str {
    match self {
      Report::MeanBudget => "Average budget of all movies:",
      Report::UsProductions => "Movies Produced in the US:",
      Report::TopRevenue => "Top 5 Revenue:",
      Report::SciFiMystery => "Science Fiction Mystery Movies:",
      Report::AbovePopularity => "Higher than mean popularity:",
    }
  }

  /// Column captions for list reports.
  pub fn columns(self) -> Option<(&'static str, &'static str)> {
    match self {
      Report::MeanBudget => None,
      Report::UsProductions => Some(("Movie Title", "Production Company")),
      Report::TopRevenue => Some(("Movie Title", "Revenue")),
      Report::SciFiMystery => Some(("Movie Title", "Genres")),
      Report::AbovePopularity => Some(("Movie Title", "Popularity")),
    }
  }
}

// ─── Output ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutput {
  MeanBudget(Option<f64>),
  UsProductions(Vec<TitleCompany>),
  TopRevenue(Vec<TitleRevenue>),
  SciFiMystery(Vec<TitleGenre>),
  AbovePopularity(Vec<TitlePopularity>),
}

impl ReportOutput {
  pub fn report(&self) -> Report {
    match self {
      ReportOutput::MeanBudget(_) => Report::MeanBudget,
      ReportOutput::UsProductions(_) => Report::UsProductions,
      ReportOutput::TopRevenue(_) => Report::TopRevenue,
      ReportOutput::SciFiMystery(_) => Report::SciFiMystery,
      ReportOutput::AbovePopularity(_) => Report::AbovePopularity,
    }
  }

  /// `(title, value)` cells of a list report, in row order.
  pub fn rows(&self) -> Vec<(String, String)> {
    match self {
      ReportOutput::MeanBudget(_) => Vec::new(),
      ReportOutput::UsProductions(rows) => {
        rows.iter().map(|r| (r.title.clone(), r.company.clone())).collect()
      }
      ReportOutput::TopRevenue(rows) => rows
        .iter()
        .map(|r| (r.title.clone(), r.revenue.map_or_else(String::new, |v| v.to_string())))
        .collect(),
      ReportOutput::SciFiMystery(rows) => {
        rows.iter().map(|r| (r.title.clone(), r.genre.clone())).collect()
      }
      ReportOutput::AbovePopularity(rows) => rows
        .iter()
        .map(|r| (r.title.clone(), r.popularity.to_string()))
        .collect(),
    }
  }
}

impl fmt::Display for ReportOutput {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let report = self.report();
    writeln!(f, "{}", report.title())?;

    if let ReportOutput::MeanBudget(mean) = self {
      return match mean {
        Some(mean) => writeln!(f, "{mean}"),
        None => writeln!(f, "(no movies)"),
      };
    }

    if let Some((left, right)) = report.columns() {
      writeln!(f, "{left}  /   {right}")?;
    }
    for (title, value) in self.rows() {
      writeln!(f, "{title}    |    {value}")?;
    }
    Ok(())
  }
}

// ─── Runner ──────────────────────────────────────────────────────────────────

/// Run one report against `store`.
pub async fn run<S: MovieStore>(store: &S, report: Report) -> Result<ReportOutput> {
  let output = match report {
    Report::MeanBudget => ReportOutput::MeanBudget(store.mean_budget().await.map_err(Error::store)?),
    Report::UsProductions => ReportOutput::UsProductions(
      store
        .productions_in_country(PRODUCTION_COUNTRY, REPORT_LIMIT)
        .await
        .map_err(Error::store)?,
    ),
    Report::TopRevenue => {
      ReportOutput::TopRevenue(store.top_revenue(REPORT_LIMIT).await.map_err(Error::store)?)
    }
    Report::SciFiMystery => ReportOutput::SciFiMystery(
      store
        .movies_with_genres(GENRE_SCIENCE_FICTION, GENRE_MYSTERY, REPORT_LIMIT)
        .await
        .map_err(Error::store)?,
    ),
    Report::AbovePopularity => ReportOutput::AbovePopularity(
      store
        .above_mean_popularity(REPORT_LIMIT)
        .await
        .map_err(Error::store)?,
    ),
  };
  Ok(output)
}
