use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    db::{
        filter::{SortOrder, TitleFilter},
        store::TitleStore,
    },
    error::{AppError, AppResult},
    models::{NewTitle, Title},
};

/// Titles held in insertion order, with an index of taken ids
#[derive(Default)]
struct MemoryInner {
    titles: Vec<Title>,
    ids: HashSet<String>,
}

/// In-memory title store
///
/// Every write holds the lock across its uniqueness check and the insert, so
/// no duplicate id can slip in between the two.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TitleStore for MemoryStore {
    async fn insert(&self, title: NewTitle) -> AppResult<Title> {
        title.validate()?;

        let mut inner = self.inner.write().await;
        if inner.ids.contains(&title.show_id) {
            return Err(AppError::DuplicateId(title.show_id));
        }

        let stored = Title::from_new(title, Utc::now());
        inner.ids.insert(stored.show_id.clone());
        inner.titles.push(stored.clone());

        tracing::debug!(show_id = %stored.show_id, "Inserted title");
        Ok(stored)
    }

    async fn insert_batch(&self, titles: Vec<NewTitle>) -> AppResult<usize> {
        for title in &titles {
            title.validate()?;
        }

        let mut inner = self.inner.write().await;

        let mut batch_ids = HashSet::with_capacity(titles.len());
        for title in &titles {
            if inner.ids.contains(&title.show_id) || !batch_ids.insert(title.show_id.as_str()) {
                return Err(AppError::DuplicateId(title.show_id.clone()));
            }
        }

        let now = Utc::now();
        let inserted = titles.len();
        for title in titles {
            inner.ids.insert(title.show_id.clone());
            inner.titles.push(Title::from_new(title, now));
        }

        tracing::info!(inserted, "Inserted title batch");
        Ok(inserted)
    }

    async fn find_matching(
        &self,
        filter: &TitleFilter,
        order: SortOrder,
        limit: Option<usize>,
    ) -> AppResult<Vec<Title>> {
        let inner = self.inner.read().await;

        let mut titles: Vec<Title> = inner
            .titles
            .iter()
            .filter(|title| filter.matches(title))
            .cloned()
            .collect();
        drop(inner);

        // Stable, so ties keep insertion order
        titles.sort_by(|a, b| order.compare(a, b));

        if let Some(limit) = limit {
            titles.truncate(limit);
        }

        Ok(titles)
    }

    async fn count(&self, filter: &TitleFilter) -> AppResult<usize> {
        let inner = self.inner.read().await;
        Ok(inner.titles.iter().filter(|title| filter.matches(title)).count())
    }

    async fn clear(&self) -> AppResult<u64> {
        let mut inner = self.inner.write().await;
        let deleted = inner.titles.len() as u64;
        inner.titles.clear();
        inner.ids.clear();
        Ok(deleted)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
