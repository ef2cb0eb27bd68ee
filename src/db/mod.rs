pub mod filter;
pub mod memory;
pub mod postgres;
pub mod store;

pub use filter::{Predicate, SortOrder, TitleFilter};
pub use memory::MemoryStore;
pub use postgres::{create_pool, PgTitleStore};
pub use store::TitleStore;

#[cfg(test)]
pub use store::MockTitleStore;
