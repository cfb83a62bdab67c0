//! The dialect adapter contract.
//!
//! A [`CatalogReader`] performs the metadata queries for one database engine
//! family against a single open connection. Readers only retrieve: filtering,
//! type normalization and primary-key resolution happen in the assembler.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::config::EngineKind;
use crate::error::Result;

use super::schema::{RawColumn, RawTable};

/// Read table and column metadata from a catalog.
///
/// Methods take `&mut self` because a reader owns exactly one connection and
/// issues its queries strictly one after another.
#[async_trait]
pub trait CatalogReader: Send {
    /// List tables (name and comment) in catalog order.
    ///
    /// A schema that does not exist yields an empty list.
    async fn list_tables(&mut self) -> Result<Vec<RawTable>>;

    /// List the raw column rows of a table in ordinal order.
    ///
    /// A table that does not exist yields an empty list.
    async fn list_columns(&mut self, table: &str) -> Result<Vec<RawColumn>>;

    /// Names of the columns participating in the table's primary key.
    async fn primary_key_columns(&mut self, table: &str) -> Result<HashSet<String>>;

    /// Engine family served by this reader.
    fn engine(&self) -> EngineKind;

    /// Release the connection.
    async fn close(&mut self) {}
}
