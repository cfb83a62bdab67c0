//! Core abstractions shared by the drivers and the assembler.
//!
//! - [`schema`]: the immutable schema model and raw catalog rows
//! - [`traits`]: the [`CatalogReader`] dialect adapter contract
//!
//! Drivers (`drivers/mysql`, `drivers/postgres`, `drivers/pgcatalog`) implement
//! [`CatalogReader`]; the assembler depends only on the trait, so it can be
//! exercised with an in-memory reader.

pub mod schema;
pub mod traits;

pub use schema::{Column, ColumnIssue, Database, RawColumn, RawTable, RawType, Table};
pub use traits::CatalogReader;
