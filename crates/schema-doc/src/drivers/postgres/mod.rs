//! PostgreSQL driver.
//!
//! - [`PostgresReader`]: catalog reader built on deadpool-postgres
//!
//! The connection helper and catalog queries that do not depend on
//! `information_schema` are shared with the `pgcatalog` driver.

mod reader;

pub use reader::PostgresReader;

pub(crate) use reader::{
    open_client, primary_key_query, table_from_row, typed_from_catalog, LIST_TABLES_SQL,
};
