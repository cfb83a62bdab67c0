//! MySQL/MariaDB catalog reader.
//!
//! Uses the engine's `SHOW` commands rather than `INFORMATION_SCHEMA`, so the
//! column type arrives as one combined descriptor (`decimal(10,2)`) that the
//! assembler splits with [`crate::typemap::parse_type`].

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlDatabaseError, MySqlRow};
use sqlx::{ColumnIndex, ConnectOptions, Connection, Row};
use tracing::{debug, info};

use crate::config::{ConnectionConfig, EngineKind};
use crate::core::schema::{RawColumn, RawTable, RawType};
use crate::core::traits::CatalogReader;
use crate::drivers::common::{quote_mysql_ident, SslMode};
use crate::error::{IntrospectError, Result};

/// Connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// `ER_BAD_DB_ERROR`: unknown database.
const ER_BAD_DB_ERROR: u16 = 1049;

/// `ER_NO_SUCH_TABLE`.
const ER_NO_SUCH_TABLE: u16 = 1146;

/// Reserved index name of a MySQL primary key.
const PRIMARY_KEY_NAME: &str = "PRIMARY";

/// MySQL/MariaDB catalog reader holding a single connection.
pub struct MysqlReader {
    conn: Option<MySqlConnection>,
    schema: String,
}

impl MysqlReader {
    /// Open a connection for the configured database.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let ssl_mode = SslMode::parse(&config.ssl_mode)?.to_mysql();

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.effective_port())
            .database(&config.database)
            .username(&config.user)
            .password(&config.password)
            .charset("utf8mb4")
            .ssl_mode(ssl_mode);

        let conn = tokio::time::timeout(CONNECT_TIMEOUT, options.connect())
            .await
            .map_err(|_| {
                IntrospectError::connection(
                    format!("timed out after {}s", CONNECT_TIMEOUT.as_secs()),
                    "connecting to MySQL",
                )
            })?
            .map_err(|e| IntrospectError::connection(e, "connecting to MySQL"))?;

        info!("Connected to MySQL: {}", config.describe());

        Ok(Self {
            conn: Some(conn),
            schema: config.effective_schema(),
        })
    }

    /// Run a `SHOW` command, treating an unknown database or table as empty.
    async fn show(&mut self, sql: &str) -> Result<Vec<MySqlRow>> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| IntrospectError::connection("connection closed", "MySQL query"))?;

        debug!("{}", sql);
        match sqlx::query(sql).fetch_all(conn).await {
            Ok(rows) => Ok(rows),
            Err(e) if is_missing_object(&e) => {
                debug!("{} -> object not found, returning no rows", sql);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl CatalogReader for MysqlReader {
    async fn list_tables(&mut self) -> Result<Vec<RawTable>> {
        let schema = quote_mysql_ident(&self.schema);

        let rows = self.show(&format!("SHOW TABLES FROM {}", schema)).await?;
        let mut names = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(name) = text(row, 0usize)? {
                names.push(name);
            }
        }

        let rows = self
            .show(&format!("SHOW TABLE STATUS FROM {}", schema))
            .await?;
        let mut status = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(name) = text(row, "Name")? {
                status.push((name, text(row, "Comment")?));
            }
        }

        Ok(join_comments(names, status))
    }

    async fn list_columns(&mut self, table: &str) -> Result<Vec<RawColumn>> {
        let sql = format!(
            "SHOW FULL COLUMNS FROM {} FROM {}",
            quote_mysql_ident(table),
            quote_mysql_ident(&self.schema)
        );

        let rows = self.show(&sql).await?;
        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            columns.push(ShowColumn {
                field: text(row, "Field")?.unwrap_or_default(),
                type_descriptor: text(row, "Type")?.unwrap_or_default(),
                null: text(row, "Null")?.unwrap_or_default(),
                default: text(row, "Default")?,
                extra: text(row, "Extra")?.unwrap_or_default(),
                comment: text(row, "Comment")?,
            }
            .into_raw());
        }
        Ok(columns)
    }

    async fn primary_key_columns(&mut self, table: &str) -> Result<HashSet<String>> {
        let sql = format!(
            "SHOW INDEX FROM {} FROM {}",
            quote_mysql_ident(table),
            quote_mysql_ident(&self.schema)
        );

        let rows = self.show(&sql).await?;
        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            if let (Some(key), Some(column)) = (text(row, "Key_name")?, text(row, "Column_name")?)
            {
                entries.push((key, column));
            }
        }
        Ok(primary_key_from_index(entries))
    }

    fn engine(&self) -> EngineKind {
        EngineKind::Mysql
    }

    async fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(e) = conn.close().await {
                debug!("Error closing MySQL connection: {}", e);
            }
        }
    }
}

/// One row of `SHOW FULL COLUMNS`.
struct ShowColumn {
    field: String,
    type_descriptor: String,
    null: String,
    default: Option<String>,
    extra: String,
    comment: Option<String>,
}

impl ShowColumn {
    fn into_raw(self) -> RawColumn {
        RawColumn {
            name: self.field,
            type_info: RawType::Descriptor(self.type_descriptor),
            nullable: self.null.eq_ignore_ascii_case("YES"),
            default: self.default,
            comment: self.comment,
            auto_increment: self.extra.to_lowercase().contains("auto_increment"),
            primary_key_hint: None,
        }
    }
}

/// Attach `SHOW TABLE STATUS` comments to the `SHOW TABLES` listing.
fn join_comments(names: Vec<String>, status: Vec<(String, Option<String>)>) -> Vec<RawTable> {
    let comments: HashMap<String, String> = status
        .into_iter()
        .filter_map(|(name, comment)| comment.map(|c| (name, c)))
        .collect();

    names
        .into_iter()
        .map(|name| {
            let comment = comments.get(&name).cloned().unwrap_or_default();
            RawTable { name, comment }
        })
        .collect()
}

/// Column names of the `PRIMARY` index from `(Key_name, Column_name)` pairs.
fn primary_key_from_index(entries: Vec<(String, String)>) -> HashSet<String> {
    entries
        .into_iter()
        .filter(|(key, _)| key == PRIMARY_KEY_NAME)
        .map(|(_, column)| column)
        .collect()
}

/// Decode a textual column. `SHOW` output is reported with binary collation on
/// some server versions, so fall back to raw bytes.
fn text<I>(row: &MySqlRow, index: I) -> Result<Option<String>>
where
    I: ColumnIndex<MySqlRow> + Copy,
{
    match row.try_get::<Option<String>, _>(index) {
        Ok(value) => Ok(value),
        Err(sqlx::Error::ColumnDecode { .. }) => {
            let bytes: Option<Vec<u8>> = row.try_get(index)?;
            Ok(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
        }
        Err(e) => Err(e.into()),
    }
}

fn is_missing_object(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.try_downcast_ref::<MySqlDatabaseError>())
        .map(|db| is_missing_object_code(db.number()))
        .unwrap_or(false)
}

/// Server error numbers for an unknown database or table.
fn is_missing_object_code(number: u16) -> bool {
    matches!(number, ER_BAD_DB_ERROR | ER_NO_SUCH_TABLE)
}
