//! Driver for PostgreSQL-derived engines whose `information_schema` views are
//! unavailable or diverge from PostgreSQL's.
//!
//! - [`PgCatalogReader`]: catalog reader over the primitive `pg_*` tables

mod reader;

pub use reader::PgCatalogReader;
