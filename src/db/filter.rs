use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::Title,
};

/// A single named test over a title
///
/// Substring predicates compare case-insensitively against the raw stored text
/// and never match an absent field. Country matching is against the whole
/// comma-separated string, so "United States" also matches "United States
/// Minor Outlying Islands".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Exact match on the wire name of the kind ("Movie" / "TV Show")
    KindIs(String),
    RatingIs(String),
    CountryContains(String),
    YearIs(i32),
    YearAtLeast(i32),
    YearAtMost(i32),
    GenreContains(String),
    DirectorContains(String),
    CastContains(String),
    TitleContains(String),
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|haystack| haystack.to_lowercase().contains(&needle.to_lowercase()))
}

impl Predicate {
    pub fn matches(&self, title: &Title) -> bool {
        match self {
            Predicate::KindIs(kind) => title.kind.as_str() == kind,
            Predicate::RatingIs(rating) => title.rating.as_deref() == Some(rating.as_str()),
            Predicate::CountryContains(country) => {
                contains_ignore_case(title.country.as_deref(), country)
            }
            Predicate::YearIs(year) => title.release_year == *year,
            Predicate::YearAtLeast(year) => title.release_year >= *year,
            Predicate::YearAtMost(year) => title.release_year <= *year,
            Predicate::GenreContains(genre) => contains_ignore_case(Some(&title.listed_in), genre),
            Predicate::DirectorContains(director) => {
                contains_ignore_case(title.director.as_deref(), director)
            }
            Predicate::CastContains(member) => contains_ignore_case(title.cast.as_deref(), member),
            Predicate::TitleContains(keyword) => contains_ignore_case(Some(&title.title), keyword),
        }
    }
}

/// Conjunction of predicates; an empty filter matches every title
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleFilter {
    predicates: Vec<Predicate>,
}

impl TitleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrows the filter with another predicate
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Narrows the filter only when a text parameter is present and non-empty
    pub fn and_text(self, value: Option<&str>, predicate: fn(String) -> Predicate) -> Self {
        match value {
            Some(value) if !value.is_empty() => self.and(predicate(value.to_string())),
            _ => self,
        }
    }

    /// Narrows the filter with a numeric parameter, failing on a malformed value
    ///
    /// `message` is the client-facing error used when the value does not parse.
    pub fn and_year(
        self,
        value: Option<&str>,
        predicate: fn(i32) -> Predicate,
        message: &str,
    ) -> AppResult<Self> {
        match parse_year(value, message)? {
            Some(year) => Ok(self.and(predicate(year))),
            None => Ok(self),
        }
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, title: &Title) -> bool {
        self.predicates.iter().all(|predicate| predicate.matches(title))
    }
}

/// Parses an optional integer parameter; absent or empty yields `None`
pub fn parse_year(value: Option<&str>, message: &str) -> AppResult<Option<i32>> {
    match value {
        Some(value) if !value.is_empty() => value
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| AppError::InvalidInput(message.to_string())),
        _ => Ok(None),
    }
}

/// Result orderings a store must support. Absent `date_added` always sorts last;
/// remaining ties keep insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// `date_added` desc, then `release_year` desc
    #[default]
    Default,
    /// `release_year` desc, then `date_added` desc
    Newest,
    /// Insertion order
    Inserted,
}

fn date_desc_nulls_last(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl SortOrder {
    /// Compares two titles; equal results must be resolved by a stable sort
    /// over insertion order
    pub fn compare(&self, a: &Title, b: &Title) -> Ordering {
        match self {
            SortOrder::Default => date_desc_nulls_last(a.date_added, b.date_added)
                .then_with(|| b.release_year.cmp(&a.release_year)),
            SortOrder::Newest => b
                .release_year
                .cmp(&a.release_year)
                .then_with(|| date_desc_nulls_last(a.date_added, b.date_added)),
            SortOrder::Inserted => Ordering::Equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{date, title};
    use super::*;
    use crate::models::TitleKind;

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = TitleFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&title("s1", TitleKind::Movie, 2020, None)));
    }

    #[test]
    fn test_kind_is_exact() {
        let movie = title("s1", TitleKind::Movie, 2020, None);
        let show = title("s2", TitleKind::TvShow, 2020, None);

        let predicate = Predicate::KindIs("TV Show".to_string());
        assert!(!predicate.matches(&movie));
        assert!(predicate.matches(&show));
        assert!(!Predicate::KindIs("movie".to_string()).matches(&movie));
    }

    #[test]
    fn test_rating_is_exact_and_skips_absent() {
        let mut movie = title("s1", TitleKind::Movie, 2020, None);
        assert!(!Predicate::RatingIs("PG-13".to_string()).matches(&movie));

        movie.rating = Some("PG-13".to_string());
        assert!(Predicate::RatingIs("PG-13".to_string()).matches(&movie));
        assert!(!Predicate::RatingIs("PG".to_string()).matches(&movie));
    }

    #[test]
    fn test_country_contains_is_case_insensitive_substring() {
        let movie = title("s1", TitleKind::Movie, 2020, Some("France, United States"));
        assert!(Predicate::CountryContains("united states".to_string()).matches(&movie));
        assert!(Predicate::CountryContains("NCE, UNI".to_string()).matches(&movie));
        assert!(!Predicate::CountryContains("India".to_string()).matches(&movie));
        assert!(!Predicate::CountryContains("India".to_string())
            .matches(&title("s2", TitleKind::Movie, 2020, None)));
    }

    #[test]
    fn test_country_contains_accepts_longer_names() {
        let islands = title(
            "s1",
            TitleKind::Movie,
            2020,
            Some("United States Minor Outlying Islands"),
        );
        assert!(Predicate::CountryContains("United States".to_string()).matches(&islands));
    }

    #[test]
    fn test_year_bounds_are_inclusive() {
        let movie = title("s1", TitleKind::Movie, 2019, None);
        assert!(Predicate::YearIs(2019).matches(&movie));
        assert!(Predicate::YearAtLeast(2019).matches(&movie));
        assert!(Predicate::YearAtMost(2019).matches(&movie));
        assert!(!Predicate::YearAtLeast(2020).matches(&movie));
        assert!(!Predicate::YearAtMost(2018).matches(&movie));
    }

    #[test]
    fn test_text_predicates() {
        let mut movie = title("s1", TitleKind::Movie, 2020, None);
        movie.listed_in = "Action & Adventure, Comedies".to_string();
        movie.director = Some("Martin Scorsese".to_string());
        movie.cast = Some("Robert De Niro, Al Pacino".to_string());
        movie.title = "The Irishman".to_string();

        assert!(Predicate::GenreContains("comed".to_string()).matches(&movie));
        assert!(Predicate::DirectorContains("scorsese".to_string()).matches(&movie));
        assert!(Predicate::CastContains("PACINO".to_string()).matches(&movie));
        assert!(Predicate::TitleContains("irish".to_string()).matches(&movie));
        assert!(!Predicate::GenreContains("Horror".to_string()).matches(&movie));
    }

    #[test]
    fn test_predicates_are_combined_with_and() {
        let filter = TitleFilter::new()
            .and(Predicate::KindIs("Movie".to_string()))
            .and(Predicate::YearAtLeast(2020));

        assert!(filter.matches(&title("s1", TitleKind::Movie, 2020, None)));
        assert!(!filter.matches(&title("s2", TitleKind::Movie, 2019, None)));
        assert!(!filter.matches(&title("s3", TitleKind::TvShow, 2021, None)));
    }

    #[test]
    fn test_and_text_skips_absent_and_empty() {
        let filter = TitleFilter::new()
            .and_text(None, Predicate::RatingIs)
            .and_text(Some(""), Predicate::GenreContains)
            .and_text(Some("Dramas"), Predicate::GenreContains);
        assert_eq!(
            filter.predicates(),
            [Predicate::GenreContains("Dramas".to_string())]
        );
    }

    #[test]
    fn test_and_year_parses_or_fails() {
        let filter = TitleFilter::new()
            .and_year(Some(" 2019 "), Predicate::YearAtLeast, "bad")
            .unwrap()
            .and_year(Some(""), Predicate::YearAtMost, "bad")
            .unwrap();
        assert_eq!(filter.predicates(), [Predicate::YearAtLeast(2019)]);

        let err = TitleFilter::new()
            .and_year(Some("20x9"), Predicate::YearAtLeast, "year_min must be a valid integer")
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: year_min must be a valid integer");
    }

    #[test]
    fn test_default_order_puts_missing_dates_last() {
        let mut undated = title("s1", TitleKind::Movie, 2021, None);
        undated.date_added = None;
        let mut older = title("s2", TitleKind::Movie, 2018, None);
        older.date_added = date(2019, 1, 1);
        let mut newer = title("s3", TitleKind::Movie, 2010, None);
        newer.date_added = date(2021, 9, 25);

        let mut titles = vec![undated, older, newer];
        titles.sort_by(|a, b| SortOrder::Default.compare(a, b));
        let ids: Vec<&str> = titles.iter().map(|t| t.show_id.as_str()).collect();
        assert_eq!(ids, ["s3", "s2", "s1"]);
    }

    #[test]
    fn test_default_order_breaks_date_ties_by_year() {
        let mut a = title("a", TitleKind::Movie, 2001, None);
        a.date_added = date(2021, 1, 1);
        let mut b = title("b", TitleKind::Movie, 2015, None);
        b.date_added = date(2021, 1, 1);

        assert_eq!(SortOrder::Default.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_newest_order() {
        let mut a = title("a", TitleKind::Movie, 2020, None);
        a.date_added = None;
        let mut b = title("b", TitleKind::Movie, 2020, None);
        b.date_added = date(2020, 5, 1);
        let c = title("c", TitleKind::Movie, 2021, None);

        let mut titles = vec![a, b, c];
        titles.sort_by(|x, y| SortOrder::Newest.compare(x, y));
        let ids: Vec<&str> = titles.iter().map(|t| t.show_id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }
}
