//! Schema model types and the raw rows dialect readers produce.
//!
//! [`Database`], [`Table`] and [`Column`] form the immutable schema model handed
//! to the renderer. They are only constructed by the assembler; every field is
//! private and exposed through read-only accessors, so a column's primary-key
//! flag is fixed at construction time.
//!
//! [`RawTable`], [`RawColumn`] and [`RawType`] are the un-normalized catalog
//! rows returned by a [`CatalogReader`](super::traits::CatalogReader).

use serde::Serialize;

use crate::typemap::TypeDescriptor;

/// A table name and comment as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Table name.
    pub name: String,

    /// Table comment (empty when the catalog has none).
    pub comment: String,
}

impl RawTable {
    pub fn new(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
        }
    }
}

/// Type information as delivered by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawType {
    /// A combined descriptor such as `varchar(255)` that still has to be parsed.
    Descriptor(String),

    /// Base type with length and scale already split out by the catalog.
    Typed {
        base: String,
        length: Option<u32>,
        scale: Option<u32>,
    },
}

/// A column row as delivered by the catalog, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    /// Column name.
    pub name: String,

    /// Type information.
    pub type_info: RawType,

    /// Whether the column allows NULL.
    pub nullable: bool,

    /// Default expression, `None` when the catalog default is NULL.
    pub default: Option<String>,

    /// Column comment, `None` when absent.
    pub comment: Option<String>,

    /// Whether values are generated (auto_increment, identity, owned sequence).
    pub auto_increment: bool,

    /// Primary-key membership computed by the column query itself, if the
    /// dialect provides one. The key set from
    /// [`primary_key_columns`](super::traits::CatalogReader::primary_key_columns)
    /// is authoritative.
    pub primary_key_hint: Option<bool>,
}

/// A normalization failure for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnIssue {
    /// Column name.
    pub column: String,

    /// Human-readable reason.
    pub message: String,
}

/// Database schema model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Database {
    name: String,
    tables: Vec<Table>,
}

impl Database {
    pub(crate) fn new(name: impl Into<String>, tables: Vec<Table>) -> Self {
        Self {
            name: name.into(),
            tables,
        }
    }

    /// Database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tables in catalog order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Total number of columns across all tables.
    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }
}

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    name: String,
    comment: String,
    columns: Vec<Column>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<ColumnIssue>,
}

impl Table {
    pub(crate) fn new(
        name: impl Into<String>,
        comment: impl Into<String>,
        columns: Vec<Column>,
        issues: Vec<ColumnIssue>,
    ) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            columns,
            issues,
        }
    }

    /// Table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table comment, empty when absent.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Columns in ordinal order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Columns whose type could not be normalized.
    pub fn issues(&self) -> &[ColumnIssue] {
        &self.issues
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Names of the primary-key columns, in ordinal order.
    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    table: String,
    name: String,
    #[serde(rename = "type")]
    data_type: String,
    length: Option<u32>,
    decimal: Option<u32>,
    nullable: bool,
    default: String,
    comment: String,
    primary_key: bool,
    auto_increment: bool,
}

impl Column {
    /// Build a fully resolved column from a raw row and its normalized type.
    pub(crate) fn from_raw(
        table: &str,
        raw: RawColumn,
        descriptor: TypeDescriptor,
        primary_key: bool,
    ) -> Self {
        Self {
            table: table.to_string(),
            name: raw.name,
            data_type: descriptor.base,
            length: descriptor.length,
            decimal: descriptor.decimal,
            nullable: raw.nullable,
            default: raw.default.unwrap_or_default(),
            comment: raw.comment.unwrap_or_default(),
            primary_key,
            auto_increment: raw.auto_increment,
        }
    }

    /// Owning table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized base type (e.g. "varchar", "int4").
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// Length or precision.
    pub fn length(&self) -> Option<u32> {
        self.length
    }

    /// Scale.
    pub fn decimal(&self) -> Option<u32> {
        self.decimal
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    /// Default expression, empty when the catalog default is NULL.
    pub fn default(&self) -> &str {
        &self.default
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn auto_increment(&self) -> bool {
        self.auto_increment
    }
}
