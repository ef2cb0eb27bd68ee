use crate::{
    db::{Predicate, SortOrder, TitleFilter, TitleStore},
    error::AppResult,
    models::{ListParams, SearchParams, SearchResponse, Title},
};

impl SearchParams {
    /// Builds the conjunctive filter for an advanced search
    ///
    /// `year_min` is checked before `year_max`; either one failing to parse
    /// rejects the whole search.
    pub fn to_filter(&self) -> AppResult<TitleFilter> {
        let filter = TitleFilter::new()
            .and_text(self.kind.as_deref(), Predicate::KindIs)
            .and_text(self.rating.as_deref(), Predicate::RatingIs)
            .and_text(self.country.as_deref(), Predicate::CountryContains)
            .and_year(
                self.year_min.as_deref(),
                Predicate::YearAtLeast,
                "year_min must be a valid integer",
            )?
            .and_year(
                self.year_max.as_deref(),
                Predicate::YearAtMost,
                "year_max must be a valid integer",
            )?
            .and_text(self.genre.as_deref(), Predicate::GenreContains)
            .and_text(self.director.as_deref(), Predicate::DirectorContains)
            .and_text(self.cast.as_deref(), Predicate::CastContains)
            .and_text(self.title.as_deref(), Predicate::TitleContains);

        Ok(filter)
    }
}

impl ListParams {
    /// Builds the filter for the plain listing: type, rating and exact year
    pub fn to_filter(&self) -> AppResult<TitleFilter> {
        TitleFilter::new()
            .and_text(self.kind.as_deref(), Predicate::KindIs)
            .and_text(self.rating.as_deref(), Predicate::RatingIs)
            .and_year(
                self.year.as_deref(),
                Predicate::YearIs,
                "Year must be a valid integer",
            )
    }
}

/// Lists titles in default order, optionally narrowed by type, rating and year
pub async fn list_titles(store: &dyn TitleStore, params: &ListParams) -> AppResult<Vec<Title>> {
    let filter = params.to_filter()?;
    store.find_matching(&filter, SortOrder::Default, None).await
}

/// Runs an advanced search across every supported parameter
pub async fn search_titles(
    store: &dyn TitleStore,
    params: &SearchParams,
) -> AppResult<SearchResponse> {
    let filter = params.to_filter()?;

    tracing::debug!(predicates = ?filter.predicates(), "Searching titles");

    let results = store.find_matching(&filter, SortOrder::Default, None).await?;

    Ok(SearchResponse {
        count: results.len(),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::new_title;
    use crate::db::MemoryStore;
    use crate::error::AppError;
    use crate::models::TitleKind;

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        let batch = vec![
            new_title("s1", TitleKind::Movie, 2020, Some("United States")),
            new_title("s2", TitleKind::TvShow, 2019, Some("United Kingdom")),
            new_title("s3", TitleKind::Movie, 2020, Some("United States")),
        ];
        store.insert_batch(batch).await.unwrap();
        store
    }

    #[test]
    fn test_empty_params_build_empty_filter() {
        assert!(SearchParams::default().to_filter().unwrap().is_empty());
        assert!(ListParams::default().to_filter().unwrap().is_empty());
    }

    #[test]
    fn test_search_params_map_to_predicates() {
        let params = SearchParams {
            kind: Some("Movie".to_string()),
            country: Some("India".to_string()),
            year_min: Some("2019".to_string()),
            year_max: Some("2020".to_string()),
            genre: Some("".to_string()),
            title: Some("love".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.to_filter().unwrap().predicates(),
            [
                Predicate::KindIs("Movie".to_string()),
                Predicate::CountryContains("India".to_string()),
                Predicate::YearAtLeast(2019),
                Predicate::YearAtMost(2020),
                Predicate::TitleContains("love".to_string()),
            ]
        );
    }

    #[test]
    fn test_bad_year_min_fails_even_with_good_year_max() {
        let params = SearchParams {
            year_min: Some("abc".to_string()),
            year_max: Some("2020".to_string()),
            ..Default::default()
        };
        match params.to_filter() {
            Err(AppError::InvalidInput(msg)) => assert_eq!(msg, "year_min must be a valid integer"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_bad_year_max_fails_even_with_good_year_min() {
        let params = SearchParams {
            year_min: Some("2019".to_string()),
            year_max: Some("20.20".to_string()),
            ..Default::default()
        };
        match params.to_filter() {
            Err(AppError::InvalidInput(msg)) => assert_eq!(msg, "year_max must be a valid integer"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_list_params_bad_year() {
        let params = ListParams {
            year: Some("twenty".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.to_filter(), Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_search_without_params_returns_everything() {
        let store = seeded_store().await;
        let response = search_titles(&store, &SearchParams::default()).await.unwrap();
        assert_eq!(response.count, 3);
        assert_eq!(response.results.len(), 3);
    }

    #[tokio::test]
    async fn test_search_combined_filters() {
        let store = seeded_store().await;
        let params = SearchParams {
            kind: Some("Movie".to_string()),
            country: Some("United States".to_string()),
            year_min: Some("2020".to_string()),
            ..Default::default()
        };
        let response = search_titles(&store, &params).await.unwrap();
        assert_eq!(response.count, 2);
        assert!(response.results.iter().all(|t| t.kind == TitleKind::Movie));
    }

    #[tokio::test]
    async fn test_search_year_range() {
        let store = seeded_store().await;
        let params = SearchParams {
            year_min: Some("2019".to_string()),
            year_max: Some("2019".to_string()),
            ..Default::default()
        };
        let response = search_titles(&store, &params).await.unwrap();
        assert_eq!(response.count, 1);
        assert_eq!(response.results[0].show_id, "s2");
    }

    #[tokio::test]
    async fn test_list_titles_by_type_and_year() {
        let store = seeded_store().await;
        let params = ListParams {
            kind: Some("Movie".to_string()),
            year: Some("2020".to_string()),
            ..Default::default()
        };
        let titles = list_titles(&store, &params).await.unwrap();
        assert_eq!(titles.len(), 2);

        let params = ListParams {
            kind: Some("Documentary".to_string()),
            ..Default::default()
        };
        assert!(list_titles(&store, &params).await.unwrap().is_empty());
    }
}
