pub mod catalog;
pub mod ingestion;
pub mod recommendations;
pub mod statistics;
pub mod title_search;
