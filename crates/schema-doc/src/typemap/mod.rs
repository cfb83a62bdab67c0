//! Type descriptor parsing.
//!
//! MySQL reports a column's type as one combined string (`varchar(255)`,
//! `decimal(10,2)`, `int(10) unsigned`). [`parse_type`] splits it into base type,
//! length and scale following the grammar
//! `identifier ['(' integer [',' integer] ')']`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::schema::RawType;
use crate::error::{IntrospectError, Result};

static TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)(?:\((\d+)(?:,\s*(\d+))?\))?").expect("static regex must compile")
});

/// A normalized column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Base type name (e.g. "varchar").
    pub base: String,
    /// Length or precision.
    pub length: Option<u32>,
    /// Scale.
    pub decimal: Option<u32>,
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.length, self.decimal) {
            (Some(len), Some(dec)) => write!(f, "{}({},{})", self.base, len, dec),
            (Some(len), None) => write!(f, "{}({})", self.base, len),
            _ => f.write_str(&self.base),
        }
    }
}

/// Parse a combined type descriptor.
///
/// Anything after the grammar prefix (`unsigned`, `zerofill`, a non-numeric
/// argument list such as `enum('a','b')`) is ignored. A string without a
/// leading identifier is [`IntrospectError::InvalidTypeFormat`].
pub fn parse_type(descriptor: &str) -> Result<TypeDescriptor> {
    let caps = TYPE_RE
        .captures(descriptor)
        .ok_or_else(|| IntrospectError::invalid_type(descriptor))?;

    let number = |idx: usize| -> Result<Option<u32>> {
        caps.get(idx)
            .map(|m| {
                m.as_str()
                    .parse::<u32>()
                    .map_err(|_| IntrospectError::invalid_type(descriptor))
            })
            .transpose()
    };

    Ok(TypeDescriptor {
        base: caps[1].to_string(),
        length: number(2)?,
        decimal: number(3)?,
    })
}

/// Normalize whatever type shape a reader produced.
pub fn resolve(raw: &RawType) -> Result<TypeDescriptor> {
    match raw {
        RawType::Descriptor(s) => parse_type(s),
        RawType::Typed {
            base,
            length,
            scale,
        } => Ok(TypeDescriptor {
            base: base.clone(),
            length: *length,
            decimal: *scale,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(s: &str) -> (String, Option<u32>, Option<u32>) {
        let t = parse_type(s).unwrap();
        (t.base, t.length, t.decimal)
    }

    #[test]
    fn test_plain_identifier() {
        assert_eq!(parsed("int"), ("int".to_string(), None, None));
        assert_eq!(parsed("datetime"), ("datetime".to_string(), None, None));
    }

    #[test]
    fn test_length_only() {
        assert_eq!(parsed("varchar(255)"), ("varchar".to_string(), Some(255), None));
        assert_eq!(parsed("char(1)"), ("char".to_string(), Some(1), None));
    }

    #[test]
    fn test_length_and_decimal() {
        assert_eq!(parsed("decimal(10,2)"), ("decimal".to_string(), Some(10), Some(2)));
        assert_eq!(parsed("decimal(10, 2)"), ("decimal".to_string(), Some(10), Some(2)));
    }

    #[test]
    fn test_trailing_modifiers_ignored() {
        assert_eq!(parsed("int(10) unsigned"), ("int".to_string(), Some(10), None));
        assert_eq!(
            parsed("bigint(20) unsigned zerofill"),
            ("bigint".to_string(), Some(20), None)
        );
    }

    #[test]
    fn test_non_numeric_arguments() {
        assert_eq!(parsed("enum('a','b')"), ("enum".to_string(), None, None));
        assert_eq!(parsed("set('x')"), ("set".to_string(), None, None));
    }

    #[test]
    fn test_invalid_descriptors() {
        for bad in ["", "(10)", " int", "-"] {
            let err = parse_type(bad).unwrap_err();
            assert!(
                matches!(
                    err,
                    IntrospectError::InvalidTypeFormat { ref descriptor } if descriptor == bad
                ),
                "expected InvalidTypeFormat for {:?}, got {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_length_overflow_is_invalid() {
        assert!(matches!(
            parse_type("varchar(99999999999)"),
            Err(IntrospectError::InvalidTypeFormat { .. })
        ));
    }

    #[test]
    fn test_resolve_typed_passthrough() {
        let raw = RawType::Typed {
            base: "numeric".to_string(),
            length: Some(12),
            scale: Some(4),
        };
        let t = resolve(&raw).unwrap();
        assert_eq!(t.to_string(), "numeric(12,4)");
    }

    #[test]
    fn test_display() {
        assert_eq!(parse_type("int").unwrap().to_string(), "int");
        assert_eq!(parse_type("varchar(32)").unwrap().to_string(), "varchar(32)");
    }
}
