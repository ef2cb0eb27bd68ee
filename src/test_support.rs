//! Fixtures shared by unit tests across modules

use chrono::{NaiveDate, TimeZone, Utc};

use crate::models::{NewTitle, Title, TitleKind};

/// Minimal valid insert payload for tests
pub fn new_title(show_id: &str, kind: TitleKind, year: i32, country: Option<&str>) -> NewTitle {
    NewTitle {
        show_id: show_id.to_string(),
        kind,
        title: format!("Title {}", show_id),
        director: None,
        cast: None,
        country: country.map(str::to_string),
        date_added: None,
        release_year: year,
        rating: None,
        duration: match kind {
            TitleKind::Movie => "90 min".to_string(),
            TitleKind::TvShow => "1 Season".to_string(),
        },
        listed_in: "Dramas".to_string(),
        description: "A description".to_string(),
    }
}

pub fn title(show_id: &str, kind: TitleKind, year: i32, country: Option<&str>) -> Title {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Title::from_new(new_title(show_id, kind, year, country), now)
}

pub fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}
