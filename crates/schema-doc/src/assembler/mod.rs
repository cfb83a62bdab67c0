//! Model assembly: reader + filter + type parser -> [`Database`].
//!
//! Tables are processed one after another on the reader's single connection:
//! one column query and one primary-key query per table. The primary-key set
//! is fetched before any column of the table is built, so every [`Column`] is
//! complete when constructed.
//!
//! [`Column`]: crate::core::schema::Column

use std::collections::HashSet;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ConnectionConfig, EngineKind};
use crate::core::schema::{Column, ColumnIssue, Database, RawColumn, RawTable, RawType, Table};
use crate::core::traits::CatalogReader;
use crate::drivers::ReaderImpl;
use crate::error::Result;
use crate::filter::TableFilter;
use crate::typemap::{self, TypeDescriptor};

/// Result of a connection check.
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResult {
    /// Engine family.
    pub engine: EngineKind,
    /// Time to connect and list tables, in milliseconds.
    pub latency_ms: u64,
    /// Number of tables visible in the target schema.
    pub table_count: usize,
}

/// Connect, assemble the schema model, and release the connection.
///
/// The connection is closed whether assembly succeeds or fails; on failure no
/// partial model is returned.
pub async fn introspect(config: &ConnectionConfig, filter: &TableFilter) -> Result<Database> {
    let mut reader = ReaderImpl::connect(config).await?;
    introspect_with(&mut reader, &config.database, filter).await
}

/// Assemble from an open reader, then close it on success and on failure.
pub async fn introspect_with<R>(
    reader: &mut R,
    database: &str,
    filter: &TableFilter,
) -> Result<Database>
where
    R: CatalogReader + ?Sized,
{
    let result = assemble(reader, database, filter).await;
    reader.close().await;
    result
}

/// Connect and list the tables that survive the filter, without columns.
pub async fn list_tables(
    config: &ConnectionConfig,
    filter: &TableFilter,
) -> Result<Vec<RawTable>> {
    let mut reader = ReaderImpl::connect(config).await?;
    let result = filtered_tables(&mut reader, filter).await;
    reader.close().await;
    result
}

/// Connect, list tables once, and report latency.
pub async fn health_check(config: &ConnectionConfig) -> Result<HealthCheckResult> {
    let start = Instant::now();
    let mut reader = ReaderImpl::connect(config).await?;
    check_reader(&mut reader, start).await
}

/// List tables on an open reader and close it. Latency runs from `start` to
/// the end of the listing and excludes closing.
async fn check_reader<R>(reader: &mut R, start: Instant) -> Result<HealthCheckResult>
where
    R: CatalogReader + ?Sized,
{
    let result = reader.list_tables().await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let engine = reader.engine();
    reader.close().await;

    Ok(HealthCheckResult {
        engine,
        latency_ms,
        table_count: result?.len(),
    })
}

/// Build the schema model from an open reader.
pub async fn assemble<R>(reader: &mut R, database: &str, filter: &TableFilter) -> Result<Database>
where
    R: CatalogReader + ?Sized,
{
    let start = Instant::now();
    let raw_tables = filtered_tables(reader, filter).await?;

    let mut tables = Vec::with_capacity(raw_tables.len());
    for raw in raw_tables {
        let columns = reader.list_columns(&raw.name).await?;
        let primary_key = reader.primary_key_columns(&raw.name).await?;
        debug!(
            "Table {}: {} columns, primary key {:?}",
            raw.name,
            columns.len(),
            primary_key
        );
        tables.push(build_table(raw, columns, &primary_key));
    }

    let db = Database::new(database, tables);
    info!(
        "Assembled {} tables ({} columns) from {} database '{}' in {:.2}s",
        db.tables().len(),
        db.column_count(),
        reader.engine(),
        db.name(),
        start.elapsed().as_secs_f64()
    );
    Ok(db)
}

/// List tables and drop the ones the filter excludes, keeping catalog order.
pub async fn filtered_tables<R>(reader: &mut R, filter: &TableFilter) -> Result<Vec<RawTable>>
where
    R: CatalogReader + ?Sized,
{
    let all = reader.list_tables().await?;
    let total = all.len();

    let kept: Vec<RawTable> = all
        .into_iter()
        .filter(|t| {
            let excluded = filter.is_excluded(&t.name);
            if excluded {
                debug!("Excluding table {}", t.name);
            }
            !excluded
        })
        .collect();

    info!("{} of {} tables selected", kept.len(), total);
    Ok(kept)
}

/// Build one table from its raw rows and resolved primary-key set.
fn build_table(
    raw: RawTable,
    raw_columns: Vec<RawColumn>,
    primary_key: &HashSet<String>,
) -> Table {
    let mut columns = Vec::with_capacity(raw_columns.len());
    let mut issues = Vec::new();

    for raw_col in raw_columns {
        let in_pk = primary_key.contains(&raw_col.name);
        if let Some(hint) = raw_col.primary_key_hint {
            if hint != in_pk {
                warn!(
                    "{}.{}: column query reports primary_key={} but key index says {}",
                    raw.name, raw_col.name, hint, in_pk
                );
            }
        }

        let descriptor = match typemap::resolve(&raw_col.type_info) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!("{}.{}: {}", raw.name, raw_col.name, e);
                issues.push(ColumnIssue {
                    column: raw_col.name.clone(),
                    message: e.to_string(),
                });
                unparsed(&raw_col)
            }
        };

        columns.push(Column::from_raw(&raw.name, raw_col, descriptor, in_pk));
    }

    Table::new(raw.name, raw.comment, columns, issues)
}

/// Keep the catalog's raw type text when it could not be normalized.
fn unparsed(raw: &RawColumn) -> TypeDescriptor {
    let base = match &raw.type_info {
        RawType::Descriptor(s) => s.clone(),
        RawType::Typed { base, .. } => base.clone(),
    };
    TypeDescriptor {
        base,
        length: None,
        decimal: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntrospectError;
    use std::collections::HashMap;

    /// In-memory reader recording the calls it receives.
    #[derive(Default)]
    struct FakeReader {
        tables: Vec<RawTable>,
        columns: HashMap<String, Vec<RawColumn>>,
        primary_keys: HashMap<String, HashSet<String>>,
        fail_columns_for: Option<String>,
        close_delay: Option<std::time::Duration>,
        calls: Vec<String>,
    }

    impl FakeReader {
        fn with_table(mut self, name: &str, columns: Vec<RawColumn>, pk: &[&str]) -> Self {
            self.tables.push(RawTable::new(name, format!("{} comment", name)));
            self.columns.insert(name.to_string(), columns);
            self.primary_keys.insert(
                name.to_string(),
                pk.iter().map(|s| s.to_string()).collect(),
            );
            self
        }
    }

    #[async_trait::async_trait]
    impl CatalogReader for FakeReader {
        async fn list_tables(&mut self) -> Result<Vec<RawTable>> {
            self.calls.push("list_tables".to_string());
            Ok(self.tables.clone())
        }

        async fn list_columns(&mut self, table: &str) -> Result<Vec<RawColumn>> {
            self.calls.push(format!("list_columns:{}", table));
            if self.fail_columns_for.as_deref() == Some(table) {
                return Err(IntrospectError::connection("server closed the connection", "fake"));
            }
            Ok(self.columns.get(table).cloned().unwrap_or_default())
        }

        async fn primary_key_columns(&mut self, table: &str) -> Result<HashSet<String>> {
            self.calls.push(format!("primary_key_columns:{}", table));
            Ok(self.primary_keys.get(table).cloned().unwrap_or_default())
        }

        fn engine(&self) -> EngineKind {
            EngineKind::Mysql
        }

        async fn close(&mut self) {
            if let Some(delay) = self.close_delay {
                tokio::time::sleep(delay).await;
            }
            self.calls.push("close".to_string());
        }
    }

    fn col(name: &str, ty: &str) -> RawColumn {
        RawColumn {
            name: name.to_string(),
            type_info: RawType::Descriptor(ty.to_string()),
            nullable: false,
            default: None,
            comment: None,
            auto_increment: false,
            primary_key_hint: None,
        }
    }

    fn names(db: &Database) -> Vec<&str> {
        db.tables().iter().map(|t| t.name()).collect()
    }

    #[tokio::test]
    async fn test_primary_key_resolution() {
        let mut reader = FakeReader::default().with_table(
            "users",
            vec![col("id", "int"), col("name", "varchar(64)")],
            &["id"],
        );

        let db = assemble(&mut reader, "shop", &TableFilter::keep_all())
            .await
            .unwrap();

        let users = db.table("users").unwrap();
        assert!(users.column("id").unwrap().primary_key());
        assert!(!users.column("name").unwrap().primary_key());
        assert_eq!(users.column("name").unwrap().length(), Some(64));
    }

    #[tokio::test]
    async fn test_catalog_order_preserved() {
        let mut reader = FakeReader::default()
            .with_table("b", vec![col("id", "int")], &[])
            .with_table("a", vec![col("id", "int")], &[]);

        let db = assemble(&mut reader, "shop", &TableFilter::keep_all())
            .await
            .unwrap();

        assert_eq!(names(&db), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_column_order_and_back_reference() {
        let mut reader = FakeReader::default().with_table(
            "orders",
            vec![col("z", "int"), col("a", "int"), col("m", "int")],
            &[],
        );

        let db = assemble(&mut reader, "shop", &TableFilter::keep_all())
            .await
            .unwrap();

        let orders = db.table("orders").unwrap();
        let cols: Vec<&str> = orders.columns().iter().map(|c| c.name()).collect();
        assert_eq!(cols, vec!["z", "a", "m"]);
        assert!(orders.columns().iter().all(|c| c.table() == "orders"));
        assert_eq!(orders.comment(), "orders comment");
    }

    #[tokio::test]
    async fn test_filter_applied_before_column_queries() {
        let mut reader = FakeReader::default()
            .with_table("tmp_cache", vec![col("k", "int")], &[])
            .with_table("orders", vec![col("id", "int")], &["id"]);

        let filter = TableFilter::new(&[] as &[&str], &["^tmp_"]).unwrap();
        let db = assemble(&mut reader, "shop", &filter).await.unwrap();

        assert_eq!(names(&db), vec!["orders"]);
        assert!(!reader.calls.iter().any(|c| c.contains("tmp_cache")));
        assert_eq!(
            reader.calls,
            vec![
                "list_tables",
                "list_columns:orders",
                "primary_key_columns:orders"
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_type_is_per_column() {
        let mut reader = FakeReader::default().with_table(
            "events",
            vec![col("id", "bigint(20)"), col("payload", ""), col("at", "datetime")],
            &["id"],
        );

        let db = assemble(&mut reader, "shop", &TableFilter::keep_all())
            .await
            .unwrap();

        let events = db.table("events").unwrap();
        assert_eq!(events.columns().len(), 3);
        assert_eq!(events.issues().len(), 1);
        assert_eq!(events.issues()[0].column, "payload");

        let payload = events.column("payload").unwrap();
        assert_eq!(payload.data_type(), "");
        assert_eq!(payload.length(), None);
        assert_eq!(events.column("at").unwrap().data_type(), "datetime");
        assert_eq!(events.column("id").unwrap().length(), Some(20));
    }

    #[tokio::test]
    async fn test_typed_columns_used_directly() {
        let mut typed = col("amount", "unused");
        typed.type_info = RawType::Typed {
            base: "numeric".to_string(),
            length: Some(12),
            scale: Some(2),
        };
        typed.primary_key_hint = Some(false);
        let mut reader = FakeReader::default().with_table("payments", vec![typed], &[]);

        let db = assemble(&mut reader, "erp", &TableFilter::keep_all())
            .await
            .unwrap();

        let amount = db.table("payments").unwrap().column("amount").unwrap();
        assert_eq!(amount.data_type(), "numeric");
        assert_eq!(amount.length(), Some(12));
        assert_eq!(amount.decimal(), Some(2));
    }

    #[tokio::test]
    async fn test_key_set_wins_over_hint() {
        let mut hinted = col("id", "int");
        hinted.primary_key_hint = Some(false);
        let mut reader = FakeReader::default().with_table("t", vec![hinted], &["id"]);

        let db = assemble(&mut reader, "x", &TableFilter::keep_all())
            .await
            .unwrap();

        assert!(db.table("t").unwrap().column("id").unwrap().primary_key());
    }

    #[tokio::test]
    async fn test_failure_discards_partial_model() {
        let mut reader = FakeReader::default()
            .with_table("a", vec![col("id", "int")], &[])
            .with_table("b", vec![col("id", "int")], &[]);
        reader.fail_columns_for = Some("b".to_string());

        let err = assemble(&mut reader, "shop", &TableFilter::keep_all())
            .await
            .unwrap_err();

        assert!(matches!(err, IntrospectError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_introspect_with_closes_after_failure() {
        let mut reader = FakeReader::default()
            .with_table("a", vec![col("id", "int")], &[])
            .with_table("b", vec![col("id", "int")], &[]);
        reader.fail_columns_for = Some("a".to_string());

        let result = introspect_with(&mut reader, "shop", &TableFilter::keep_all()).await;

        assert!(result.is_err());
        assert_eq!(reader.calls.last().map(String::as_str), Some("close"));
        assert!(!reader.calls.iter().any(|c| c == "list_columns:b"));
    }

    #[tokio::test]
    async fn test_introspect_with_closes_after_success() {
        let mut reader = FakeReader::default().with_table("a", vec![col("id", "int")], &["id"]);

        let db = introspect_with(&mut reader, "shop", &TableFilter::keep_all())
            .await
            .unwrap();

        assert_eq!(db.tables().len(), 1);
        assert_eq!(reader.calls.iter().filter(|c| *c == "close").count(), 1);
        assert_eq!(reader.calls.last().map(String::as_str), Some("close"));
    }

    #[tokio::test]
    async fn test_health_check_latency_excludes_close() {
        let mut reader = FakeReader::default()
            .with_table("a", vec![], &[])
            .with_table("b", vec![], &[]);
        reader.close_delay = Some(std::time::Duration::from_millis(300));

        let result = check_reader(&mut reader, Instant::now()).await.unwrap();

        assert_eq!(result.table_count, 2);
        assert!(result.latency_ms < 300);
        assert_eq!(reader.calls, vec!["list_tables", "close"]);
    }

    #[tokio::test]
    async fn test_empty_schema() {
        let mut reader = FakeReader::default();
        let db = assemble(&mut reader, "empty", &TableFilter::keep_all())
            .await
            .unwrap();
        assert_eq!(db.name(), "empty");
        assert!(db.tables().is_empty());
    }

    #[tokio::test]
    async fn test_filtered_tables_rescue_semantics() {
        let mut reader = FakeReader::default()
            .with_table("keep_me", vec![], &[])
            .with_table("other", vec![], &[]);

        let filter = TableFilter::new(&["^keep_"], &[".*"]).unwrap();
        let tables = filtered_tables(&mut reader, &filter).await.unwrap();

        assert_eq!(tables, vec![RawTable::new("keep_me", "keep_me comment")]);
    }
}
