//! Record store abstraction
//!
//! The catalog is served from one of two interchangeable stores: an in-memory
//! store (tests, demos, seeded servers) and a PostgreSQL store. Endpoints only
//! see this trait, so query and aggregation logic stays independent of how
//! titles are persisted.

use crate::{
    db::filter::{SortOrder, TitleFilter},
    error::AppResult,
    models::{NewTitle, Title},
};

/// Trait for title stores
///
/// Implementations must make `insert` atomic with respect to its uniqueness
/// check: concurrent inserts of the same `show_id` admit exactly one.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TitleStore: Send + Sync {
    /// Validates and stores a single title
    ///
    /// Fails with `AppError::Validation` on invalid fields and
    /// `AppError::DuplicateId` when the id is taken; the store is unchanged
    /// in both cases.
    async fn insert(&self, title: NewTitle) -> AppResult<Title>;

    /// Stores a batch of titles all-or-nothing
    ///
    /// Returns the number of titles stored. A single invalid or duplicate
    /// title rejects the whole batch.
    async fn insert_batch(&self, titles: Vec<NewTitle>) -> AppResult<usize>;

    /// Titles matching `filter`, in the requested order, optionally truncated
    async fn find_matching(
        &self,
        filter: &TitleFilter,
        order: SortOrder,
        limit: Option<usize>,
    ) -> AppResult<Vec<Title>>;

    /// Number of titles matching `filter`
    async fn count(&self, filter: &TitleFilter) -> AppResult<usize>;

    /// Removes every title, returning how many were deleted
    async fn clear(&self) -> AppResult<u64>;

    /// Every title in default order
    async fn all(&self) -> AppResult<Vec<Title>> {
        self.find_matching(&TitleFilter::new(), SortOrder::Default, None)
            .await
    }

    /// Store name for logging
    fn name(&self) -> &'static str;
}
