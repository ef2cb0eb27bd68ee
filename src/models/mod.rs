use serde::{Deserialize, Serialize};

pub mod title;

pub use title::{split_multi_value, CreateTitleRequest, FieldInput, NewTitle, Title, TitleKind};

// ============================================================================
// Query parameters
// ============================================================================

/// Query string of `GET /titles/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub rating: Option<String>,
    pub year: Option<String>,
}

/// Query string of `GET /titles/search/`
///
/// Numeric parameters are kept as text so a malformed value can be reported
/// as a client error rather than rejected by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub rating: Option<String>,
    pub country: Option<String>,
    pub year_min: Option<String>,
    pub year_max: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub title: Option<String>,
}

/// Query string of `GET /recommendations/`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationParams {
    pub genre: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub recent: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub count: usize,
    pub results: Vec<Title>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub kind: TitleKind,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RatingCount {
    pub rating: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YearCount {
    pub release_year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecadeCount {
    /// Label such as "1990s"
    pub decade: String,
    pub count: usize,
}

/// Release year summary; every value is null over an empty set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AverageStats {
    pub avg_year: Option<f64>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

/// Response of `GET /statistics/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statistics {
    pub total_count: usize,
    pub type_distribution: Vec<TypeCount>,
    pub rating_breakdown: Vec<RatingCount>,
    /// Most recent years only
    pub content_by_year: Vec<YearCount>,
    pub top_countries: Vec<CountryCount>,
    pub decade_analysis: Vec<DecadeCount>,
    pub average_stats: AverageStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryStatistics {
    pub type_breakdown: Vec<TypeCount>,
    pub average_release_year: Option<f64>,
}

/// Response of `GET /country/{name}/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryResponse {
    pub count: usize,
    pub country: String,
    pub statistics: CountryStatistics,
    pub titles: Vec<Title>,
}

/// Response of `GET /recommendations/`
///
/// An empty result is still a successful lookup, so it carries a message
/// instead of an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RecommendationResponse {
    Found {
        genre: String,
        count: usize,
        recommendations: Vec<Title>,
    },
    Empty {
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_use_type_key() {
        let params: SearchParams =
            serde_json::from_value(serde_json::json!({ "type": "Movie", "year_min": "x" }))
                .unwrap();
        assert_eq!(params.kind.as_deref(), Some("Movie"));
        assert_eq!(params.year_min.as_deref(), Some("x"));
        assert!(params.genre.is_none());
    }

    #[test]
    fn test_empty_recommendations_serialize_message_only() {
        let response = RecommendationResponse::Empty {
            message: "No recommendations found for the given criteria".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "message": "No recommendations found for the given criteria" })
        );
    }

    #[test]
    fn test_type_count_serialization() {
        let count = TypeCount {
            kind: TitleKind::TvShow,
            count: 3,
        };
        assert_eq!(
            serde_json::to_value(&count).unwrap(),
            serde_json::json!({ "type": "TV Show", "count": 3 })
        );
    }
}
