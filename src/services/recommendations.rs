use crate::{
    db::{Predicate, SortOrder, TitleFilter, TitleStore},
    error::{AppError, AppResult},
    models::{RecommendationParams, RecommendationResponse},
};

/// Maximum number of recommendations returned
pub const MAX_RECOMMENDATIONS: usize = 20;
/// How many years back "recent" reaches
pub const RECENT_YEARS: i32 = 3;

const NO_RECOMMENDATIONS: &str = "No recommendations found for the given criteria";

/// Generates genre-based watch recommendations
///
/// Requires a genre; optionally narrows by type and, when `recent=true`, to
/// titles released in the last three years relative to `current_year`.
/// Newest releases come first. Finding nothing is not an error: the response
/// carries an explanatory message instead.
pub async fn get_recommendations(
    store: &dyn TitleStore,
    params: &RecommendationParams,
    current_year: i32,
) -> AppResult<RecommendationResponse> {
    let genre = match params.genre.as_deref() {
        Some(genre) if !genre.is_empty() => genre,
        _ => return Err(AppError::MissingParameter("genre")),
    };

    let mut filter = TitleFilter::new()
        .and(Predicate::GenreContains(genre.to_string()))
        .and_text(params.kind.as_deref(), Predicate::KindIs);

    let recent = params
        .recent
        .as_deref()
        .is_some_and(|recent| recent.eq_ignore_ascii_case("true"));
    if recent {
        filter = filter.and(Predicate::YearAtLeast(current_year - RECENT_YEARS));
    }

    let recommendations = store
        .find_matching(&filter, SortOrder::Newest, Some(MAX_RECOMMENDATIONS))
        .await?;

    tracing::info!(
        genre = %genre,
        recent,
        count = recommendations.len(),
        "Recommendations generated"
    );

    if recommendations.is_empty() {
        return Ok(RecommendationResponse::Empty {
            message: NO_RECOMMENDATIONS.to_string(),
        });
    }

    Ok(RecommendationResponse::Found {
        genre: genre.to_string(),
        count: recommendations.len(),
        recommendations,
    })
}
