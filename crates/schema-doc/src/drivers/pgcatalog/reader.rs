//! Catalog reader for PostgreSQL-derived engines without a usable
//! `information_schema.columns`.
//!
//! The column projection is rebuilt from `pg_attribute`, `pg_attrdef`,
//! `pg_type`, `pg_collation` and sequence dependencies. The session's
//! `search_path` is pointed at the target schema as part of construction,
//! before any catalog query runs on the connection.

use std::collections::HashSet;

use async_trait::async_trait;
use deadpool_postgres::{Object, Pool};
use tracing::{debug, info};

use crate::config::{ConnectionConfig, EngineKind};
use crate::core::schema::{RawColumn, RawTable};
use crate::core::traits::CatalogReader;
use crate::drivers::common::quote_pg_ident;
use crate::drivers::postgres::{
    open_client, primary_key_query, table_from_row, typed_from_catalog, LIST_TABLES_SQL,
};
use crate::error::{IntrospectError, Result};

const LIST_COLUMNS_SQL: &str = r#"
    SELECT
        col.column_name,
        col.udt_name,
        col.character_maximum_length,
        col.numeric_precision,
        col.numeric_scale,
        col.is_nullable,
        col.column_default,
        col.is_serial,
        d.description,
        col.is_primary
    FROM (
        SELECT
            a.attrelid AS table_oid,
            a.attnum AS ordinal_position,
            a.attname::text AS column_name,
            t.typname::text AS udt_name,
            CASE
                WHEN t.typname IN ('bpchar', 'varchar') AND a.atttypmod > 0
                    THEN (a.atttypmod - 4)::int4
            END AS character_maximum_length,
            CASE
                WHEN t.typname = 'numeric' AND a.atttypmod > 0
                    THEN (((a.atttypmod - 4) >> 16) & 65535)::int4
            END AS numeric_precision,
            CASE
                WHEN t.typname = 'numeric' AND a.atttypmod > 0
                    THEN ((a.atttypmod - 4) & 65535)::int4
            END AS numeric_scale,
            NOT a.attnotnull AS is_nullable,
            pg_catalog.pg_get_expr(ad.adbin, ad.adrelid)::text AS column_default,
            co.collname::text AS collation_name,
            EXISTS (
                SELECT 1
                FROM pg_catalog.pg_depend dep
                JOIN pg_catalog.pg_class seq ON seq.oid = dep.objid AND seq.relkind = 'S'
                WHERE dep.refobjid = a.attrelid
                  AND dep.refobjsubid = a.attnum
            ) AS is_serial,
            EXISTS (
                SELECT 1
                FROM pg_catalog.pg_index i
                WHERE i.indrelid = a.attrelid
                  AND i.indisprimary
                  AND a.attnum = ANY(i.indkey)
            ) AS is_primary
        FROM pg_catalog.pg_attribute a
        JOIN pg_catalog.pg_class r ON r.oid = a.attrelid
        JOIN pg_catalog.pg_namespace n ON n.oid = r.relnamespace
        JOIN pg_catalog.pg_type t ON t.oid = a.atttypid
        LEFT JOIN pg_catalog.pg_attrdef ad ON ad.adrelid = a.attrelid AND ad.adnum = a.attnum
        LEFT JOIN pg_catalog.pg_collation co
          ON co.oid = a.attcollation AND co.collname <> 'default'
        WHERE a.attnum > 0
          AND NOT a.attisdropped
          AND n.nspname = $1
          AND r.relname = $2
    ) col
    LEFT JOIN pg_catalog.pg_description d
      ON d.objoid = col.table_oid AND d.objsubid = col.ordinal_position
    ORDER BY col.ordinal_position
"#;

/// Reader for restricted PostgreSQL-derived catalogs.
pub struct PgCatalogReader {
    pool: Pool,
    client: Object,
    schema: String,
}

impl PgCatalogReader {
    /// Open a connection and set its `search_path` to the target schema.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let (pool, client) = open_client(config).await?;
        let schema = config.effective_schema();

        client
            .batch_execute(&search_path_sql(&schema))
            .await
            .map_err(|e| search_path_error(e, &schema))?;
        info!("search_path set to {}", schema);

        Ok(Self {
            pool,
            client,
            schema,
        })
    }
}

#[async_trait]
impl CatalogReader for PgCatalogReader {
    async fn list_tables(&mut self) -> Result<Vec<RawTable>> {
        let rows = self.client.query(LIST_TABLES_SQL, &[&self.schema]).await?;
        rows.iter().map(table_from_row).collect()
    }

    async fn list_columns(&mut self, table: &str) -> Result<Vec<RawColumn>> {
        let rows = self
            .client
            .query(LIST_COLUMNS_SQL, &[&self.schema, &table])
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            columns.push(RawColumn {
                name: row.try_get(0)?,
                type_info: typed_from_catalog(
                    row.try_get(1)?,
                    row.try_get(2)?,
                    row.try_get(3)?,
                    row.try_get(4)?,
                ),
                nullable: row.try_get(5)?,
                default: row.try_get(6)?,
                auto_increment: row.try_get(7)?,
                comment: row.try_get(8)?,
                primary_key_hint: Some(row.try_get(9)?),
            });
        }

        debug!(
            "Loaded {} columns for {}.{} from pg_attribute",
            columns.len(),
            self.schema,
            table
        );
        Ok(columns)
    }

    async fn primary_key_columns(&mut self, table: &str) -> Result<HashSet<String>> {
        primary_key_query(&self.client, &self.schema, table).await
    }

    fn engine(&self) -> EngineKind {
        EngineKind::PgCatalog
    }

    async fn close(&mut self) {
        self.pool.close();
    }
}

fn search_path_sql(schema: &str) -> String {
    format!("SET search_path TO {}", quote_pg_ident(schema))
}

/// Failed session setup counts as a failed connection.
fn search_path_error(err: impl ToString, schema: &str) -> IntrospectError {
    IntrospectError::connection(err, format!("setting search_path to {}", schema))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_path_sql_quotes_schema() {
        assert_eq!(search_path_sql("public"), "SET search_path TO \"public\"");
        assert_eq!(
            search_path_sql("Sales\"2024"),
            "SET search_path TO \"Sales\"\"2024\""
        );
    }

    #[test]
    fn test_search_path_failure_is_connection_error() {
        let err = search_path_error("permission denied for schema sales", "sales");
        assert!(matches!(err, IntrospectError::Connection { .. }));
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("search_path to sales"));
    }

    #[test]
    fn test_column_query_filters_schema_and_table() {
        assert!(LIST_COLUMNS_SQL.contains("n.nspname = $1"));
        assert!(LIST_COLUMNS_SQL.contains("r.relname = $2"));
        assert!(!LIST_COLUMNS_SQL.contains("information_schema"));
    }
}
