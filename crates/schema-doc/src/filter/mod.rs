//! Include/exclude table filtering.
//!
//! Include patterns rescue tables rather than whitelisting them: a table
//! matching any include pattern is always kept, a table matching no include
//! pattern but some exclude pattern is dropped, and everything else is kept.
//! An include list on its own therefore filters nothing.

use regex::Regex;

use crate::error::{IntrospectError, Result};

/// Compiled table filter.
#[derive(Debug, Clone, Default)]
pub struct TableFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl TableFilter {
    /// Compile include and exclude pattern lists, preserving their order.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// A filter that keeps every table.
    pub fn keep_all() -> Self {
        Self::default()
    }

    /// Whether the table should be dropped from the model.
    pub fn is_excluded(&self, table: &str) -> bool {
        if self.include.iter().any(|re| re.is_match(table)) {
            return false;
        }
        self.exclude.iter().any(|re| re.is_match(table))
    }

    /// Whether the table should be kept.
    pub fn keeps(&self, table: &str) -> bool {
        !self.is_excluded(table)
    }

    /// True when no patterns were supplied.
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            let p = p.as_ref();
            Regex::new(p).map_err(|source| IntrospectError::InvalidPattern {
                pattern: p.to_string(),
                source,
            })
        })
        .collect()
}
