//! Helpers shared by the drivers.

pub mod tls;

pub use tls::{SslMode, TlsBuilder};

/// Quote a PostgreSQL identifier.
pub fn quote_pg_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a MySQL identifier.
pub fn quote_mysql_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
