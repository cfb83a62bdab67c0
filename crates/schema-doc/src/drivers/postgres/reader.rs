//! PostgreSQL catalog reader.
//!
//! Tables come from `pg_class`/`pg_namespace`; columns come from the standard
//! `information_schema.columns` view, which already splits length and scale,
//! joined with `pg_description` for comments.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use tokio_postgres::{Config as PgConfig, Row};
use tracing::{debug, info, warn};

use crate::config::{ConnectionConfig, EngineKind};
use crate::core::schema::{RawColumn, RawTable, RawType};
use crate::core::traits::CatalogReader;
use crate::drivers::common::{SslMode, TlsBuilder};
use crate::error::{IntrospectError, Result};

/// Connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Ordinary tables of a schema with their comments.
pub(crate) const LIST_TABLES_SQL: &str = r#"
    SELECT
        c.relname::text,
        COALESCE(obj_description(c.oid, 'pg_class'), '')
    FROM pg_catalog.pg_class c
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    WHERE c.relkind = 'r'
      AND n.nspname = $1
    ORDER BY c.relname
"#;

/// Columns of the table's primary-key index.
pub(crate) const PRIMARY_KEY_SQL: &str = r#"
    SELECT a.attname::text
    FROM pg_catalog.pg_index i
    JOIN pg_catalog.pg_class t ON t.oid = i.indrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace
    JOIN pg_catalog.pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(i.indkey)
    WHERE i.indisprimary
      AND n.nspname = $1
      AND t.relname = $2
"#;

const LIST_COLUMNS_SQL: &str = r#"
    SELECT
        c.column_name::text,
        c.udt_name::text,
        c.character_maximum_length::int4,
        c.numeric_precision::int4,
        c.numeric_scale::int4,
        c.is_nullable::text = 'YES',
        c.column_default::text,
        c.is_identity::text = 'YES' OR COALESCE(c.column_default::text LIKE 'nextval(%', false),
        d.description,
        EXISTS (
            SELECT 1
            FROM pg_catalog.pg_index i
            JOIN pg_catalog.pg_attribute a
              ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey)
            WHERE i.indrelid = cls.oid
              AND i.indisprimary
              AND a.attname = c.column_name::text
        )
    FROM information_schema.columns c
    JOIN pg_catalog.pg_namespace ns ON ns.nspname = c.table_schema::text
    JOIN pg_catalog.pg_class cls ON cls.relnamespace = ns.oid AND cls.relname = c.table_name::text
    LEFT JOIN pg_catalog.pg_description d
      ON d.objoid = cls.oid AND d.objsubid = c.ordinal_position::int4
    WHERE c.table_schema::text = $1
      AND c.table_name::text = $2
    ORDER BY c.ordinal_position
"#;

/// Open a single-connection pool and check out its connection.
pub(crate) async fn open_client(config: &ConnectionConfig) -> Result<(Pool, Object)> {
    let context = format!("connecting to {}", config.engine);

    let mut pg_config = PgConfig::new();
    pg_config.host(&config.host);
    pg_config.port(config.effective_port());
    pg_config.dbname(&config.database);
    pg_config.user(&config.user);
    pg_config.password(&config.password);
    pg_config.connect_timeout(CONNECT_TIMEOUT);

    let mgr_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };

    let ssl_mode = SslMode::parse(&config.ssl_mode)?;
    let mgr = match TlsBuilder::new(ssl_mode).build()? {
        Some(tls) => Manager::from_config(pg_config, tls, mgr_config),
        None => {
            if config.host != "localhost" && config.host != "127.0.0.1" {
                warn!("PostgreSQL TLS is disabled. Credentials will be transmitted in plaintext.");
            }
            Manager::from_config(pg_config, tokio_postgres::NoTls, mgr_config)
        }
    };

    let pool = Pool::builder(mgr)
        .max_size(1)
        .build()
        .map_err(|e| IntrospectError::connection(e, context.clone()))?;

    let client = pool
        .get()
        .await
        .map_err(|e| IntrospectError::connection(e, context))?;

    info!("Connected to {}", config.describe());
    Ok((pool, client))
}

/// PostgreSQL catalog reader holding a single connection.
pub struct PostgresReader {
    pool: Pool,
    client: Object,
    schema: String,
}

impl PostgresReader {
    /// Open a connection; the schema defaults to `public`.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let (pool, client) = open_client(config).await?;
        Ok(Self {
            pool,
            client,
            schema: config.effective_schema(),
        })
    }

    /// Target schema.
    pub fn schema(&self) -> &str {
        &self.schema
    }
}

#[async_trait]
impl CatalogReader for PostgresReader {
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
            let udt_name: String = row.try_get(1)?;
            let char_len: Option<i32> = row.try_get(2)?;
            let precision: Option<i32> = row.try_get(3)?;
            let scale: Option<i32> = row.try_get(4)?;

            columns.push(RawColumn {
                name: row.try_get(0)?,
                type_info: typed_from_catalog(udt_name, char_len, precision, scale),
                nullable: row.try_get(5)?,
                default: row.try_get(6)?,
                auto_increment: row.try_get::<_, Option<bool>>(7)?.unwrap_or(false),
                comment: row.try_get(8)?,
                primary_key_hint: Some(row.try_get(9)?),
            });
        }

        debug!(
            "Loaded {} columns for {}.{}",
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
        EngineKind::Postgres
    }

    async fn close(&mut self) {
        self.pool.close();
    }
}

pub(crate) fn table_from_row(row: &Row) -> Result<RawTable> {
    Ok(RawTable {
        name: row.try_get(0)?,
        comment: row.try_get(1)?,
    })
}

pub(crate) async fn primary_key_query(
    client: &Object,
    schema: &str,
    table: &str,
) -> Result<HashSet<String>> {
    let rows = client.query(PRIMARY_KEY_SQL, &[&schema, &table]).await?;
    rows.iter()
        .map(|row| row.try_get::<_, String>(0).map_err(Into::into))
        .collect()
}

/// Map catalog length/precision/scale onto the model's length and decimal.
///
/// Character types report their declared length. Only exact numerics
/// (`numeric`/`decimal`) carry precision and scale; integer and float types
/// report a fixed binary precision that is not part of the declared type, so
/// it is dropped.
pub(crate) fn typed_from_catalog(
    udt_name: String,
    char_len: Option<i32>,
    precision: Option<i32>,
    scale: Option<i32>,
) -> RawType {
    let to_u32 = |v: Option<i32>| v.and_then(|v| u32::try_from(v).ok());

    let (length, scale) = if char_len.is_some() {
        (to_u32(char_len), None)
    } else if matches!(udt_name.as_str(), "numeric" | "decimal") {
        (to_u32(precision), to_u32(scale))
    } else {
        (None, None)
    };

    RawType::Typed {
        base: udt_name,
        length,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(base: &str, length: Option<u32>, scale: Option<u32>) -> RawType {
        RawType::Typed {
            base: base.to_string(),
            length,
            scale,
        }
    }

    #[test]
    fn test_typed_varchar() {
        assert_eq!(
            typed_from_catalog("varchar".into(), Some(255), None, None),
            typed("varchar", Some(255), None)
        );
    }

    #[test]
    fn test_typed_numeric() {
        assert_eq!(
            typed_from_catalog("numeric".into(), None, Some(10), Some(2)),
            typed("numeric", Some(10), Some(2))
        );
    }

    #[test]
    fn test_typed_unconstrained_numeric() {
        assert_eq!(
            typed_from_catalog("numeric".into(), None, None, None),
            typed("numeric", None, None)
        );
    }

    #[test]
    fn test_typed_integer_drops_binary_precision() {
        assert_eq!(
            typed_from_catalog("int4".into(), None, Some(32), Some(0)),
            typed("int4", None, None)
        );
    }

    #[test]
    fn test_typed_text_without_length() {
        assert_eq!(
            typed_from_catalog("text".into(), None, None, None),
            typed("text", None, None)
        );
    }
}
