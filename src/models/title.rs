use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::{AppError, AppResult, FieldErrors};

pub const MIN_RELEASE_YEAR: i32 = 1900;
pub const MAX_RELEASE_YEAR: i32 = 2030;

const SHOW_ID_MAX_LEN: usize = 20;
const TITLE_MAX_LEN: usize = 250;
const DIRECTOR_MAX_LEN: usize = 250;
const COUNTRY_MAX_LEN: usize = 150;
const RATING_MAX_LEN: usize = 10;
const DURATION_MAX_LEN: usize = 20;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_DATE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

/// Type of content
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TitleKind {
    Movie,
    #[serde(rename = "TV Show")]
    TvShow,
}

impl TitleKind {
    /// Wire representation, as stored and as accepted in the `type` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            TitleKind::Movie => "Movie",
            TitleKind::TvShow => "TV Show",
        }
    }
}

impl Display for TitleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TitleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Movie" => Ok(TitleKind::Movie),
            "TV Show" => Ok(TitleKind::TvShow),
            _ => Err("Type must be either 'Movie' or 'TV Show'.".to_string()),
        }
    }
}

/// A movie or TV show in the catalog
///
/// `cast`, `country` and `listed_in` are kept as the raw comma-separated text
/// they were loaded with. Use the accessors to get individual values; they
/// trim whitespace but do not normalize case, so "usa" and "USA" stay distinct.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Title {
    pub show_id: String,
    #[serde(rename = "type")]
    pub kind: TitleKind,
    pub title: String,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub country: Option<String>,
    pub date_added: Option<NaiveDate>,
    pub release_year: i32,
    pub rating: Option<String>,
    pub duration: String,
    pub listed_in: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Splits a denormalized multi-value field on commas, trimming each value.
/// Absent fields and empty values yield nothing.
pub fn split_multi_value(raw: Option<&str>) -> Vec<&str> {
    raw.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Leading integer of a duration string such as "90 min" or "2 Seasons"
fn leading_number(duration: &str) -> Option<u32> {
    duration.split_whitespace().next()?.parse().ok()
}

impl Title {
    /// Builds the stored record from a validated insert, stamping both timestamps
    pub fn from_new(new: NewTitle, now: DateTime<Utc>) -> Self {
        Self {
            show_id: new.show_id,
            kind: new.kind,
            title: new.title,
            director: new.director,
            cast: new.cast,
            country: new.country,
            date_added: new.date_added,
            release_year: new.release_year,
            rating: new.rating,
            duration: new.duration,
            listed_in: new.listed_in,
            description: new.description,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn genres(&self) -> Vec<&str> {
        split_multi_value(Some(&self.listed_in))
    }

    pub fn cast_list(&self) -> Vec<&str> {
        split_multi_value(self.cast.as_deref())
    }

    pub fn countries(&self) -> Vec<&str> {
        split_multi_value(self.country.as_deref())
    }

    /// Running time in minutes, only for movies
    pub fn duration_minutes(&self) -> Option<u32> {
        if self.kind == TitleKind::Movie && self.duration.contains("min") {
            return leading_number(&self.duration);
        }
        None
    }

    /// Number of seasons, only for TV shows
    pub fn duration_seasons(&self) -> Option<u32> {
        if self.kind == TitleKind::TvShow && self.duration.contains("Season") {
            return leading_number(&self.duration);
        }
        None
    }
}

impl Display for Title {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) - {}", self.title, self.release_year, self.kind)
    }
}

/// A title ready to be inserted into a store
#[derive(Debug, Clone, PartialEq)]
pub struct NewTitle {
    pub show_id: String,
    pub kind: TitleKind,
    pub title: String,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub country: Option<String>,
    pub date_added: Option<NaiveDate>,
    pub release_year: i32,
    pub rating: Option<String>,
    pub duration: String,
    pub listed_in: String,
    pub description: String,
}

fn check_required_text(errors: &mut FieldErrors, field: &str, value: &str, max_len: Option<usize>) {
    if value.trim().is_empty() {
        errors.add(field, BLANK);
        return;
    }
    check_max_len(errors, field, value, max_len);
}

fn check_max_len(errors: &mut FieldErrors, field: &str, value: &str, max_len: Option<usize>) {
    if let Some(max_len) = max_len {
        if value.chars().count() > max_len {
            errors.add(
                field,
                format!("Ensure this field has no more than {} characters.", max_len),
            );
        }
    }
}

fn check_release_year(errors: &mut FieldErrors, year: i64) {
    if year < i64::from(MIN_RELEASE_YEAR) || year > i64::from(MAX_RELEASE_YEAR) {
        errors.add(
            "release_year",
            format!(
                "Release year must be between {} and {}.",
                MIN_RELEASE_YEAR, MAX_RELEASE_YEAR
            ),
        );
    }
}

impl NewTitle {
    fn collect_errors(&self, errors: &mut FieldErrors) {
        check_required_text(errors, "show_id", &self.show_id, Some(SHOW_ID_MAX_LEN));
        check_required_text(errors, "title", &self.title, Some(TITLE_MAX_LEN));
        check_required_text(errors, "duration", &self.duration, Some(DURATION_MAX_LEN));
        check_required_text(errors, "description", &self.description, None);
        check_required_text(errors, "listed_in", &self.listed_in, None);
        if errors.get("listed_in").is_none() && split_multi_value(Some(&self.listed_in)).is_empty() {
            errors.add("listed_in", "Ensure this field lists at least one genre.");
        }

        if let Some(director) = &self.director {
            check_max_len(errors, "director", director, Some(DIRECTOR_MAX_LEN));
        }
        if let Some(country) = &self.country {
            check_max_len(errors, "country", country, Some(COUNTRY_MAX_LEN));
        }
        if let Some(rating) = &self.rating {
            check_max_len(errors, "rating", rating, Some(RATING_MAX_LEN));
        }

        check_release_year(errors, i64::from(self.release_year));
    }

    /// Checks every field invariant, reporting all violations at once
    pub fn validate(&self) -> AppResult<()> {
        let mut errors = FieldErrors::new();
        self.collect_errors(&mut errors);
        errors.into_result()
    }
}

/// Body of a create request; every field optional so missing ones can be
/// reported individually instead of failing deserialization
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTitleRequest {
    pub show_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub country: Option<String>,
    pub date_added: Option<FieldInput<NaiveDate>>,
    pub release_year: Option<FieldInput<i64>>,
    pub rating: Option<String>,
    pub duration: Option<String>,
    pub listed_in: Option<String>,
    pub description: Option<String>,
}

/// A body value that may or may not have the expected JSON type
///
/// Anything that does not deserialize as `T` is kept raw so it can be
/// reported against its field instead of rejecting the whole body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldInput<T> {
    Valid(T),
    Invalid(serde_json::Value),
}

impl FieldInput<i64> {
    /// Accepts integers, integral floats and numeric strings
    fn into_integer(self) -> Result<i64, &'static str> {
        match self {
            FieldInput::Valid(value) => Ok(value),
            FieldInput::Invalid(serde_json::Value::String(raw)) => {
                raw.trim().parse().map_err(|_| INVALID_INTEGER)
            }
            FieldInput::Invalid(serde_json::Value::Number(number)) => number
                .as_f64()
                .filter(|value| value.fract() == 0.0 && value.abs() < i64::MAX as f64)
                .map(|value| value as i64)
                .ok_or(INVALID_INTEGER),
            FieldInput::Invalid(_) => Err(INVALID_INTEGER),
        }
    }
}

impl FieldInput<NaiveDate> {
    /// Accepts ISO dates, surrounding whitespace allowed
    fn into_date(self) -> Result<NaiveDate, &'static str> {
        match self {
            FieldInput::Valid(date) => Ok(date),
            FieldInput::Invalid(serde_json::Value::String(raw)) => {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| INVALID_DATE)
            }
            FieldInput::Invalid(_) => Err(INVALID_DATE),
        }
    }
}

fn required(errors: &mut FieldErrors, field: &str, value: Option<String>) -> String {
    match value {
        Some(value) => value.trim().to_string(),
        None => {
            errors.add(field, REQUIRED);
            String::new()
        }
    }
}

/// Blank optional text is stored as absent
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl TryFrom<CreateTitleRequest> for NewTitle {
    type Error = AppError;

    fn try_from(request: CreateTitleRequest) -> AppResult<Self> {
        let mut errors = FieldErrors::new();

        let kind = match request.kind.as_deref().map(str::trim) {
            Some(kind) => match kind.parse::<TitleKind>() {
                Ok(kind) => Some(kind),
                Err(message) => {
                    errors.add("type", message);
                    None
                }
            },
            None => {
                errors.add("type", REQUIRED);
                None
            }
        };

        let release_year = match request.release_year.map(FieldInput::into_integer) {
            Some(Ok(year)) => {
                check_release_year(&mut errors, year);
                i32::try_from(year).ok()
            }
            Some(Err(message)) => {
                errors.add("release_year", message);
                None
            }
            None => {
                errors.add("release_year", REQUIRED);
                None
            }
        };

        let date_added = match request.date_added.map(FieldInput::into_date) {
            Some(Ok(date)) => Some(date),
            Some(Err(message)) => {
                errors.add("date_added", message);
                None
            }
            None => None,
        };

        let mut missing = FieldErrors::new();
        let new_title = NewTitle {
            show_id: required(&mut missing, "show_id", request.show_id),
            kind: kind.unwrap_or(TitleKind::Movie),
            title: required(&mut missing, "title", request.title),
            director: optional(request.director),
            cast: optional(request.cast),
            country: optional(request.country),
            date_added,
            release_year: release_year.unwrap_or(MIN_RELEASE_YEAR),
            rating: optional(request.rating),
            duration: required(&mut missing, "duration", request.duration),
            listed_in: required(&mut missing, "listed_in", request.listed_in),
            description: required(&mut missing, "description", request.description),
        };

        let mut field_errors = FieldErrors::new();
        new_title.collect_errors(&mut field_errors);
        for field in [
            "show_id",
            "title",
            "duration",
            "listed_in",
            "description",
            "director",
            "country",
            "rating",
        ] {
            // A missing field is only reported as missing, not also as blank
            if let Some(messages) = missing.get(field).or_else(|| field_errors.get(field)) {
                for message in messages {
                    errors.add(field, message.clone());
                }
            }
        }

        errors.into_result()?;
        Ok(new_title)
    }
}
