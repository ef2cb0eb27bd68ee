use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{
    migrate::Migrator,
    postgres::{PgDatabaseError, PgPoolOptions},
    FromRow, PgPool, Postgres, QueryBuilder,
};

use crate::{
    db::{
        filter::{Predicate, SortOrder, TitleFilter},
        store::TitleStore,
    },
    error::{AppError, AppResult},
    models::{NewTitle, Title},
};

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Rows per INSERT statement during batch inserts
const INSERT_CHUNK_SIZE: usize = 500;

const SELECT_COLUMNS: &str = "SELECT show_id, kind, title, director, cast_members, country, \
     date_added, release_year, rating, duration, listed_in, description, created_at, updated_at \
     FROM titles";

const INSERT_COLUMNS: &str = "INSERT INTO titles (show_id, kind, title, director, cast_members, \
     country, date_added, release_year, rating, duration, listed_in, description) ";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

#[derive(Debug, FromRow)]
struct TitleRow {
    show_id: String,
    kind: String,
    title: String,
    director: Option<String>,
    cast_members: Option<String>,
    country: Option<String>,
    date_added: Option<NaiveDate>,
    release_year: i32,
    rating: Option<String>,
    duration: String,
    listed_in: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TitleRow> for Title {
    type Error = AppError;

    fn try_from(row: TitleRow) -> AppResult<Self> {
        let kind = row.kind.parse().map_err(|_| {
            AppError::Internal(format!("Unknown kind {:?} for title {}", row.kind, row.show_id))
        })?;

        Ok(Title {
            show_id: row.show_id,
            kind,
            title: row.title,
            director: row.director,
            cast: row.cast_members,
            country: row.country,
            date_added: row.date_added,
            release_year: row.release_year,
            rating: row.rating,
            duration: row.duration,
            listed_in: row.listed_in,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Case-insensitive substring test that is false for NULL columns and treats
/// LIKE wildcards in the needle literally
fn push_contains(builder: &mut QueryBuilder<'static, Postgres>, column: &str, needle: &str) {
    builder
        .push("POSITION(LOWER(")
        .push_bind(needle.to_string())
        .push(") IN LOWER(")
        .push(column)
        .push(")) > 0");
}

fn push_predicate(builder: &mut QueryBuilder<'static, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::KindIs(kind) => {
            builder.push("kind = ").push_bind(kind.clone());
        }
        Predicate::RatingIs(rating) => {
            builder.push("rating = ").push_bind(rating.clone());
        }
        Predicate::CountryContains(country) => push_contains(builder, "country", country),
        Predicate::YearIs(year) => {
            builder.push("release_year = ").push_bind(*year);
        }
        Predicate::YearAtLeast(year) => {
            builder.push("release_year >= ").push_bind(*year);
        }
        Predicate::YearAtMost(year) => {
            builder.push("release_year <= ").push_bind(*year);
        }
        Predicate::GenreContains(genre) => push_contains(builder, "listed_in", genre),
        Predicate::DirectorContains(director) => push_contains(builder, "director", director),
        Predicate::CastContains(member) => push_contains(builder, "cast_members", member),
        Predicate::TitleContains(keyword) => push_contains(builder, "title", keyword),
    }
}

fn push_where(builder: &mut QueryBuilder<'static, Postgres>, filter: &TitleFilter) {
    for (i, predicate) in filter.predicates().iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        push_predicate(builder, predicate);
    }
}

fn order_clause(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Default => " ORDER BY date_added DESC NULLS LAST, release_year DESC, seq ASC",
        SortOrder::Newest => " ORDER BY release_year DESC, date_added DESC NULLS LAST, seq ASC",
        SortOrder::Inserted => " ORDER BY seq ASC",
    }
}

fn select_query(
    filter: &TitleFilter,
    order: SortOrder,
    limit: Option<usize>,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SELECT_COLUMNS);
    push_where(&mut builder, filter);
    builder.push(order_clause(order));
    if let Some(limit) = limit {
        builder.push(" LIMIT ").push_bind(limit as i64);
    }
    builder
}

fn count_query(filter: &TitleFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM titles");
    push_where(&mut builder, filter);
    builder
}

fn insert_query(titles: &[NewTitle], returning: bool) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(INSERT_COLUMNS);
    builder.push_values(titles, |mut row, title| {
        row.push_bind(title.show_id.clone())
            .push_bind(title.kind.as_str())
            .push_bind(title.title.clone())
            .push_bind(title.director.clone())
            .push_bind(title.cast.clone())
            .push_bind(title.country.clone())
            .push_bind(title.date_added)
            .push_bind(title.release_year)
            .push_bind(title.rating.clone())
            .push_bind(title.duration.clone())
            .push_bind(title.listed_in.clone())
            .push_bind(title.description.clone());
    });
    if returning {
        builder.push(
            " RETURNING show_id, kind, title, director, cast_members, country, date_added, \
             release_year, rating, duration, listed_in, description, created_at, updated_at",
        );
    }
    builder
}

/// Extracts the offending key from a unique-violation detail such as
/// `Key (show_id)=(s1) already exists.`
fn parse_duplicate_key(detail: &str) -> Option<&str> {
    let start = detail.find(")=(")? + 3;
    let end = start + detail[start..].rfind(')')?;
    Some(&detail[start..end])
}

/// Maps unique violations to `DuplicateId`, everything else to `Database`
fn map_insert_error(err: sqlx::Error, fallback_id: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let id = db_err
                .try_downcast_ref::<PgDatabaseError>()
                .and_then(|pg_err| pg_err.detail())
                .and_then(parse_duplicate_key)
                .unwrap_or(fallback_id);
            return AppError::DuplicateId(id.to_string());
        }
    }
    AppError::Database(err)
}

/// PostgreSQL-backed title store
///
/// Uniqueness is enforced by the primary key, so concurrent inserts of the
/// same id are serialized by the database rather than by the application.
#[derive(Clone)]
pub struct PgTitleStore {
    pool: PgPool,
}

impl PgTitleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects, runs pending migrations, and returns a ready store
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = create_pool(database_url, max_connections).await?;
        MIGRATOR.run(&pool).await?;
        tracing::info!("Database migrations applied");
        Ok(Self::new(pool))
    }
}

#[async_trait::async_trait]
impl TitleStore for PgTitleStore {
    async fn insert(&self, title: NewTitle) -> AppResult<Title> {
        title.validate()?;

        let mut builder = insert_query(std::slice::from_ref(&title), true);
        let row: TitleRow = builder
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, &title.show_id))?;

        tracing::debug!(show_id = %row.show_id, "Inserted title");
        row.try_into()
    }

    async fn insert_batch(&self, titles: Vec<NewTitle>) -> AppResult<usize> {
        let mut batch_ids = HashSet::with_capacity(titles.len());
        for title in &titles {
            title.validate()?;
            if !batch_ids.insert(title.show_id.as_str()) {
                return Err(AppError::DuplicateId(title.show_id.clone()));
            }
        }

        let mut tx = self.pool.begin().await?;
        for chunk in titles.chunks(INSERT_CHUNK_SIZE) {
            let mut builder = insert_query(chunk, false);
            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| map_insert_error(e, "unknown"))?;
            tracing::debug!(rows = chunk.len(), "Inserted chunk");
        }
        tx.commit().await?;

        tracing::info!(inserted = titles.len(), "Inserted title batch");
        Ok(titles.len())
    }

    async fn find_matching(
        &self,
        filter: &TitleFilter,
        order: SortOrder,
        limit: Option<usize>,
    ) -> AppResult<Vec<Title>> {
        let mut builder = select_query(filter, order, limit);
        let rows: Vec<TitleRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Title::try_from).collect()
    }

    async fn count(&self, filter: &TitleFilter) -> AppResult<usize> {
        let mut builder = count_query(filter);
        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count as usize)
    }

    async fn clear(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM titles").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
