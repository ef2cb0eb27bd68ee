use crate::{
    db::{Predicate, SortOrder, TitleFilter, TitleStore},
    error::{AppError, AppResult},
    models::{CountryResponse, CreateTitleRequest, NewTitle, Statistics, Title},
    services::statistics,
};

/// Validates a create request and stores the new title
pub async fn create_title(store: &dyn TitleStore, request: CreateTitleRequest) -> AppResult<Title> {
    let new_title = NewTitle::try_from(request)?;
    let title = store.insert(new_title).await?;

    tracing::info!(show_id = %title.show_id, kind = %title.kind, "Title created");

    Ok(title)
}

/// Aggregates the whole catalog
///
/// Titles are read in insertion order so that ranking ties resolve to the
/// earliest inserted key.
pub async fn get_statistics(store: &dyn TitleStore) -> AppResult<Statistics> {
    let titles = store
        .find_matching(&TitleFilter::new(), SortOrder::Inserted, None)
        .await?;

    Ok(statistics::compute_statistics(&titles))
}

/// Titles whose country field contains `country`, with a short summary
pub async fn titles_by_country(store: &dyn TitleStore, country: &str) -> AppResult<CountryResponse> {
    let filter = TitleFilter::new().and(Predicate::CountryContains(country.to_string()));
    let titles = store.find_matching(&filter, SortOrder::Default, None).await?;

    if titles.is_empty() {
        return Err(AppError::NotFound(format!(
            "No titles found for country: {}",
            country
        )));
    }

    Ok(CountryResponse {
        count: titles.len(),
        country: country.to_string(),
        statistics: statistics::country_statistics(&titles),
        titles,
    })
}
