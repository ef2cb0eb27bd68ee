use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use crate::models::{
    AverageStats, CountryCount, CountryStatistics, DecadeCount, RatingCount, Statistics, Title,
    TypeCount, YearCount,
};

/// Number of most recent release years reported by the statistics endpoint
pub const CONTENT_BY_YEAR_LIMIT: usize = 20;
/// Number of countries in the country ranking
pub const TOP_COUNTRIES_LIMIT: usize = 10;

/// Counts occurrences of each key, most frequent first
///
/// Keys with equal counts keep the order in which they were first seen, so
/// the ranking is deterministic for a given input order.
pub fn rank<K, I>(keys: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();

    for key in keys {
        match positions.get(&key) {
            Some(&position) => counts[position].1 += 1,
            None => {
                positions.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }

    // sort_by is stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub fn type_distribution(titles: &[Title]) -> Vec<TypeCount> {
    rank(titles.iter().map(|title| title.kind))
        .into_iter()
        .map(|(kind, count)| TypeCount { kind, count })
        .collect()
}

pub fn rating_breakdown(titles: &[Title]) -> Vec<RatingCount> {
    rank(titles.iter().map(|title| title.rating.as_deref()))
        .into_iter()
        .map(|(rating, count)| RatingCount {
            rating: rating.map(str::to_string),
            count,
        })
        .collect()
}

/// Titles per release year, most recent year first
pub fn content_by_year(titles: &[Title]) -> Vec<YearCount> {
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();
    for title in titles {
        *years.entry(title.release_year).or_default() += 1;
    }

    years
        .into_iter()
        .rev()
        .map(|(release_year, count)| YearCount {
            release_year,
            count,
        })
        .collect()
}

/// Most frequent production countries
///
/// A title listing several countries counts once for each of them. Names are
/// compared exactly after trimming, without case folding.
pub fn top_countries(titles: &[Title], limit: usize) -> Vec<CountryCount> {
    rank(titles.iter().flat_map(|title| title.countries()))
        .into_iter()
        .take(limit)
        .map(|(country, count)| CountryCount {
            country: country.to_string(),
            count,
        })
        .collect()
}

pub fn decade_of(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

/// Folds per-year counts into decades, most recent decade first
pub fn decade_analysis(years: &[YearCount]) -> Vec<DecadeCount> {
    let mut decades: BTreeMap<i32, usize> = BTreeMap::new();
    for year in years {
        *decades.entry(decade_of(year.release_year)).or_default() += year.count;
    }

    decades
        .into_iter()
        .rev()
        .map(|(decade, count)| DecadeCount {
            decade: format!("{}s", decade),
            count,
        })
        .collect()
}

pub fn average_release_year(titles: &[Title]) -> Option<f64> {
    if titles.is_empty() {
        return None;
    }
    let sum: i64 = titles.iter().map(|title| i64::from(title.release_year)).sum();
    Some(sum as f64 / titles.len() as f64)
}

pub fn average_stats(titles: &[Title]) -> AverageStats {
    AverageStats {
        avg_year: average_release_year(titles),
        min_year: titles.iter().map(|title| title.release_year).min(),
        max_year: titles.iter().map(|title| title.release_year).max(),
    }
}

/// Full dashboard over a set of titles
pub fn compute_statistics(titles: &[Title]) -> Statistics {
    let years = content_by_year(titles);
    let decade_analysis = decade_analysis(&years);

    Statistics {
        total_count: titles.len(),
        type_distribution: type_distribution(titles),
        rating_breakdown: rating_breakdown(titles),
        content_by_year: years.into_iter().take(CONTENT_BY_YEAR_LIMIT).collect(),
        top_countries: top_countries(titles, TOP_COUNTRIES_LIMIT),
        decade_analysis,
        average_stats: average_stats(titles),
    }
}

/// Summary attached to a country lookup
pub fn country_statistics(titles: &[Title]) -> CountryStatistics {
    CountryStatistics {
        type_breakdown: type_distribution(titles),
        average_release_year: average_release_year(titles),
    }
}
