//! Bulk CSV ingestion
//!
//! Rows are parsed and validated one by one; a bad row is recorded and
//! skipped without aborting the load. Every admitted row is then written with a
//! single all-or-nothing batch insert.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    db::{Predicate, SortOrder, TitleFilter, TitleStore},
    error::{AppError, AppResult},
    models::{CreateTitleRequest, FieldInput, NewTitle, TitleKind},
};

/// Default location of the dataset
pub const DEFAULT_CSV_PATH: &str = "data/netflix_titles.csv";
/// Failure reasons shown in a report before truncating
pub const MAX_REPORTED_ERRORS: usize = 10;

const PROGRESS_EVERY: usize = 1000;
const DATE_ADDED_FORMAT: &str = "%B %d, %Y";

/// One raw CSV record; cells are validated after trimming
#[derive(Debug, Deserialize)]
struct CsvRow {
    show_id: String,
    #[serde(rename = "type")]
    kind: String,
    title: String,
    director: String,
    cast: String,
    country: String,
    date_added: String,
    release_year: String,
    rating: String,
    duration: String,
    listed_in: String,
    description: String,
}

/// Parses dates such as "September 25, 2021"; anything else yields `None`
pub fn parse_date_added(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_ADDED_FORMAT).ok()
}

impl CsvRow {
    fn into_new_title(self) -> AppResult<NewTitle> {
        let release_year = self.release_year.trim().parse::<i64>().map_err(|_| {
            AppError::InvalidInput(format!(
                "release_year {:?} is not a valid integer",
                self.release_year
            ))
        })?;

        let request = CreateTitleRequest {
            show_id: Some(self.show_id),
            kind: Some(self.kind),
            title: Some(self.title),
            director: Some(self.director),
            cast: Some(self.cast),
            country: Some(self.country),
            date_added: parse_date_added(&self.date_added).map(FieldInput::Valid),
            release_year: Some(FieldInput::Valid(release_year)),
            rating: Some(self.rating),
            duration: Some(self.duration),
            listed_in: Some(self.listed_in),
            description: Some(self.description),
        };

        NewTitle::try_from(request)
    }
}

/// Outcome of parsing a CSV source
#[derive(Debug, Default)]
pub struct ParsedRows {
    pub titles: Vec<NewTitle>,
    /// "Row N: reason", counting the header as row 1
    pub errors: Vec<String>,
}

/// Parses and validates every record of a headered CSV source
///
/// Rows repeating an earlier `show_id` are rejected here so that one
/// duplicate does not sink the whole batch insert.
pub fn parse_rows<R: Read>(reader: R) -> ParsedRows {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut parsed = ParsedRows::default();
    let mut seen_ids = HashSet::new();

    for (index, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row_num = index + 2;

        let result = record
            .map_err(AppError::from)
            .and_then(CsvRow::into_new_title)
            .and_then(|title| {
                if seen_ids.insert(title.show_id.clone()) {
                    Ok(title)
                } else {
                    Err(AppError::DuplicateId(title.show_id))
                }
            });

        match result {
            Ok(title) => {
                parsed.titles.push(title);
                if parsed.titles.len() % PROGRESS_EVERY == 0 {
                    tracing::info!(processed = parsed.titles.len(), "Processed records");
                }
            }
            Err(e) => {
                tracing::debug!(row = row_num, error = %e, "Skipping row");
                parsed.errors.push(format!("Row {}: {}", row_num, e));
            }
        }
    }

    parsed
}

/// Opens and parses a CSV file; a missing file is reported as `NotFound`
pub fn parse_file(path: &Path) -> AppResult<ParsedRows> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            AppError::NotFound(format!("File not found: {}", path.display()))
        }
        _ => AppError::Io(e),
    })?;

    Ok(parse_rows(file))
}

/// Result of a load, for display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub cleared: Option<u64>,
    pub loaded: usize,
    pub errors: Vec<String>,
}

impl IngestReport {
    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    /// The first few failure reasons, with a trailing "... and N more" line
    pub fn error_preview(&self) -> Vec<String> {
        let mut preview: Vec<String> = self
            .errors
            .iter()
            .take(MAX_REPORTED_ERRORS)
            .cloned()
            .collect();
        if self.errors.len() > MAX_REPORTED_ERRORS {
            preview.push(format!(
                "... and {} more",
                self.errors.len() - MAX_REPORTED_ERRORS
            ));
        }
        preview
    }
}

/// Loads a CSV file into the store
///
/// The file is parsed before anything is cleared, so a missing file leaves
/// the store untouched.
pub async fn load_csv(store: &dyn TitleStore, path: &Path, clear: bool) -> AppResult<IngestReport> {
    tracing::info!(path = %path.display(), clear, store = store.name(), "Loading titles from CSV");

    let owned_path: PathBuf = path.to_path_buf();
    let parsed = tokio::task::spawn_blocking(move || parse_file(&owned_path))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let cleared = if clear {
        let deleted = store.clear().await?;
        tracing::info!(deleted, "Cleared existing titles");
        Some(deleted)
    } else {
        None
    };

    tracing::info!(prepared = parsed.titles.len(), "Saving titles");
    let loaded = store.insert_batch(parsed.titles).await?;

    if !parsed.errors.is_empty() {
        tracing::warn!(failed = parsed.errors.len(), "Some rows were skipped");
    }

    Ok(IngestReport {
        cleared,
        loaded,
        errors: parsed.errors,
    })
}

/// Catalog overview printed after a load
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSummary {
    pub total: usize,
    pub movies: usize,
    pub tv_shows: usize,
    /// Display lines of the first titles in default order
    pub samples: Vec<String>,
}

pub async fn summarize(store: &dyn TitleStore, sample_size: usize) -> AppResult<CatalogSummary> {
    let kind_filter =
        |kind: TitleKind| TitleFilter::new().and(Predicate::KindIs(kind.as_str().to_string()));

    let samples = store
        .find_matching(&TitleFilter::new(), SortOrder::Default, Some(sample_size))
        .await?
        .iter()
        .map(ToString::to_string)
        .collect();

    Ok(CatalogSummary {
        total: store.count(&TitleFilter::new()).await?,
        movies: store.count(&kind_filter(TitleKind::Movie)).await?,
        tv_shows: store.count(&kind_filter(TitleKind::TvShow)).await?,
        samples,
    })
}
