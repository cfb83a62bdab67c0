//! Rendering context output.
//!
//! The assembled [`Database`] is wrapped as `{ "db": ... }` and written as
//! JSON or YAML. Template rendering itself happens outside this crate.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::info;

use crate::config::OutputFormat;
use crate::core::schema::Database;
use crate::error::{IntrospectError, Result};

/// Context handed to a document template.
#[derive(Debug, Serialize)]
pub struct RenderContext<'a> {
    pub db: &'a Database,
}

impl<'a> RenderContext<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Serialize in the requested format.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(self)?),
        }
    }
}

/// Check that `path` can receive the output file.
///
/// Runs before any connection is opened. An existing file is opened in append
/// mode so the check never truncates it; a missing file is not created.
pub fn check_output_target(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(IntrospectError::output_unavailable(path, "path is empty"));
    }

    if path.is_dir() {
        return Err(IntrospectError::output_unavailable(path, "path is a directory"));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(IntrospectError::output_unavailable(
                path,
                format!("directory {} does not exist", parent.display()),
            ));
        }
    }

    if path.exists() {
        OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| IntrospectError::output_unavailable(path, e.to_string()))?;
    }

    Ok(())
}

/// Write the rendering context for `db` to `path`.
///
/// Content goes to a uniquely named temp file in the destination directory and
/// is then renamed over `path`.
pub fn write_context(path: &Path, db: &Database, format: OutputFormat) -> Result<()> {
    let content = RenderContext::new(db).render(format)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| IntrospectError::output_unavailable(path, e.to_string()))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| IntrospectError::output_unavailable(path, e.to_string()))?;
    temp.persist(path)
        .map_err(|e| IntrospectError::output_unavailable(path, e.error.to_string()))?;

    info!(
        "Wrote {} tables to {} ({} bytes)",
        db.tables().len(),
        path.display(),
        content.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::schema::{Column, RawColumn, RawType, Table};
    use crate::typemap::TypeDescriptor;
    use tempfile::TempDir;

    fn sample_db() -> Database {
        let raw = RawColumn {
            name: "id".to_string(),
            type_info: RawType::Descriptor("int(11)".to_string()),
            nullable: false,
            default: None,
            comment: Some("row id".to_string()),
            auto_increment: true,
            primary_key_hint: None,
        };
        let descriptor = TypeDescriptor {
            base: "int".to_string(),
            length: Some(11),
            decimal: None,
        };
        let column = Column::from_raw("users", raw, descriptor, true);
        let table = Table::new("users".to_string(), "people".to_string(), vec![column], vec![]);
        Database::new("shop", vec![table])
    }

    #[test]
    fn test_json_context_shape() {
        let db = sample_db();
        let json = RenderContext::new(&db).render(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["db"]["name"], "shop");
        let table = &value["db"]["tables"][0];
        assert_eq!(table["name"], "users");
        assert_eq!(table["comment"], "people");
        assert!(table.get("issues").is_none());

        let column = &table["columns"][0];
        assert_eq!(column["name"], "id");
        assert_eq!(column["type"], "int");
        assert_eq!(column["length"], 11);
        assert!(column["decimal"].is_null());
        assert_eq!(column["primary_key"], true);
        assert_eq!(column["comment"], "row id");
    }

    #[test]
    fn test_yaml_context() {
        let db = sample_db();
        let yaml = RenderContext::new(&db).render(OutputFormat::Yaml).unwrap();
        assert!(yaml.starts_with("db:"));
        assert!(yaml.contains("name: users"));
    }

    #[test]
    fn test_check_new_file_in_existing_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        check_output_target(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_check_existing_file_not_truncated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "keep").unwrap();

        check_output_target(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep");
    }

    #[test]
    fn test_check_missing_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = check_output_target(&path).unwrap_err();
        assert!(matches!(err, IntrospectError::OutputTargetUnavailable { .. }));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_check_directory_path() {
        let dir = TempDir::new().unwrap();
        let err = check_output_target(dir.path()).unwrap_err();
        assert!(matches!(err, IntrospectError::OutputTargetUnavailable { .. }));
    }

    #[test]
    fn test_relative_file_name_without_parent() {
        // "db-doc.json" has an empty parent, meaning the working directory.
        let path = Path::new("schema-doc-check-does-not-exist.json");
        check_output_target(path).unwrap();
    }

    #[test]
    fn test_write_context_replaces_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db-doc.json");
        std::fs::write(&path, "old").unwrap();

        write_context(&path, &sample_db(), OutputFormat::Json).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"users\""));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_context_keeps_sibling_tmp_file() {
        let dir = TempDir::new().unwrap();
        let sibling = dir.path().join("schema.tmp");
        std::fs::write(&sibling, "user notes").unwrap();

        write_context(&dir.path().join("schema.json"), &sample_db(), OutputFormat::Yaml).unwrap();

        assert_eq!(std::fs::read_to_string(&sibling).unwrap(), "user notes");
        assert!(dir.path().join("schema.json").exists());
    }
}
