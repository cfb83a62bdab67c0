//! MySQL/MariaDB driver.
//!
//! - [`MysqlReader`]: catalog reader built on sqlx
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+

mod reader;

pub use reader::MysqlReader;
