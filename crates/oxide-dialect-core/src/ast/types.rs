//! Generic SQL type codes and sizes.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DialectError;

/// Generic column type codes.
///
/// A dialect maps each code to a column type template through
/// [`crate::dialect::Dialect::column_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlTypeCode {
    Boolean,
    Bit,
    Tinyint,
    Smallint,
    Integer,
    Bigint,
    Real,
    Float,
    Double,
    Numeric,
    Decimal,
    Char,
    Nchar,
    Varchar,
    Nvarchar,
    Long32varchar,
    Long32nvarchar,
    Clob,
    Nclob,
    Binary,
    Varbinary,
    Long32varbinary,
    Blob,
    Date,
    Time,
    TimeWithTimezone,
    Timestamp,
    TimestampWithTimezone,
    Uuid,
    Json,
    Sqlxml,
}

impl SqlTypeCode {
    /// Every type code, in declaration order.
    pub const ALL: [Self; 31] = [
        Self::Boolean,
        Self::Bit,
        Self::Tinyint,
        Self::Smallint,
        Self::Integer,
        Self::Bigint,
        Self::Real,
        Self::Float,
        Self::Double,
        Self::Numeric,
        Self::Decimal,
        Self::Char,
        Self::Nchar,
        Self::Varchar,
        Self::Nvarchar,
        Self::Long32varchar,
        Self::Long32nvarchar,
        Self::Clob,
        Self::Nclob,
        Self::Binary,
        Self::Varbinary,
        Self::Long32varbinary,
        Self::Blob,
        Self::Date,
        Self::Time,
        Self::TimeWithTimezone,
        Self::Timestamp,
        Self::TimestampWithTimezone,
        Self::Uuid,
        Self::Json,
        Self::Sqlxml,
    ];

    /// Returns the upper-case name of the code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::Bit => "BIT",
            Self::Tinyint => "TINYINT",
            Self::Smallint => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::Bigint => "BIGINT",
            Self::Real => "REAL",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Numeric => "NUMERIC",
            Self::Decimal => "DECIMAL",
            Self::Char => "CHAR",
            Self::Nchar => "NCHAR",
            Self::Varchar => "VARCHAR",
            Self::Nvarchar => "NVARCHAR",
            Self::Long32varchar => "LONG32VARCHAR",
            Self::Long32nvarchar => "LONG32NVARCHAR",
            Self::Clob => "CLOB",
            Self::Nclob => "NCLOB",
            Self::Binary => "BINARY",
            Self::Varbinary => "VARBINARY",
            Self::Long32varbinary => "LONG32VARBINARY",
            Self::Blob => "BLOB",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::TimeWithTimezone => "TIME_WITH_TIMEZONE",
            Self::Timestamp => "TIMESTAMP",
            Self::TimestampWithTimezone => "TIMESTAMP_WITH_TIMEZONE",
            Self::Uuid => "UUID",
            Self::Json => "JSON",
            Self::Sqlxml => "SQLXML",
        }
    }

    /// Returns true for character types that take a length.
    #[must_use]
    pub const fn is_character(&self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::Nchar
                | Self::Varchar
                | Self::Nvarchar
                | Self::Long32varchar
                | Self::Long32nvarchar
        )
    }

    /// Returns true for binary types that take a length.
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(
            self,
            Self::Binary | Self::Varbinary | Self::Long32varbinary
        )
    }

    /// Returns true for exact or approximate numeric types.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Tinyint
                | Self::Smallint
                | Self::Integer
                | Self::Bigint
                | Self::Real
                | Self::Float
                | Self::Double
                | Self::Numeric
                | Self::Decimal
        )
    }

    /// Returns true for date, time and timestamp types.
    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::Date
                | Self::Time
                | Self::TimeWithTimezone
                | Self::Timestamp
                | Self::TimestampWithTimezone
        )
    }
}

impl fmt::Display for SqlTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SqlTypeCode {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| DialectError::Semantic(format!("unknown SQL type code '{s}'")))
    }
}

/// Length, precision and scale of a column.
///
/// Missing values are filled with dialect defaults when a type name is
/// rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    /// Length for character and binary types.
    pub length: Option<u32>,
    /// Precision for numeric and temporal types.
    pub precision: Option<u32>,
    /// Scale for exact numeric types.
    pub scale: Option<i32>,
}

impl Size {
    /// Default length of character and binary columns.
    pub const DEFAULT_LENGTH: u32 = 255;
    /// Default scale of exact numeric columns.
    pub const DEFAULT_SCALE: i32 = 2;

    /// Creates a size with only a length.
    #[must_use]
    pub const fn length(length: u32) -> Self {
        Self {
            length: Some(length),
            precision: None,
            scale: None,
        }
    }

    /// Creates a size with precision and scale.
    #[must_use]
    pub const fn precision(precision: u32, scale: i32) -> Self {
        Self {
            length: None,
            precision: Some(precision),
            scale: Some(scale),
        }
    }
}

/// Replaces `$l`, `$p` and `$s` in a column type template.
///
/// ```
/// use oxide_dialect_core::ast::expand_type_template;
///
/// assert_eq!(expand_type_template("varchar($l)", 40, 0, 0), "varchar(40)");
/// assert_eq!(expand_type_template("decimal($p,$s)", 0, 10, 2), "decimal(10,2)");
/// ```
#[must_use]
pub fn expand_type_template(template: &str, length: u32, precision: u32, scale: i32) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '$' {
            match chars.peek() {
                Some('l') => {
                    chars.next();
                    out.push_str(&length.to_string());
                    continue;
                }
                Some('p') => {
                    chars.next();
                    out.push_str(&precision.to_string());
                    continue;
                }
                Some('s') => {
                    chars.next();
                    out.push_str(&scale.to_string());
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

/// Target of a CAST expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastTarget {
    /// Target type code.
    pub code: SqlTypeCode,
    /// Optional explicit size.
    #[serde(default)]
    pub size: Size,
}

impl CastTarget {
    /// Creates a cast target with default size.
    #[must_use]
    pub fn new(code: SqlTypeCode) -> Self {
        Self {
            code,
            size: Size::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_template() {
        assert_eq!(expand_type_template("varchar($l)", 255, 0, 0), "varchar(255)");
        assert_eq!(
            expand_type_template("datetime year to fraction($p)", 0, 5, 0),
            "datetime year to fraction(5)"
        );
        assert_eq!(expand_type_template("integer", 1, 2, 3), "integer");
        assert_eq!(expand_type_template("$x", 1, 2, 3), "$x");
    }

    #[test]
    fn test_type_code_from_str() {
        assert_eq!(
            "timestamp".parse::<SqlTypeCode>().unwrap(),
            SqlTypeCode::Timestamp
        );
        assert_eq!(
            "TIME WITH TIMEZONE".parse::<SqlTypeCode>().unwrap(),
            SqlTypeCode::TimeWithTimezone
        );
        assert!("nonsense".parse::<SqlTypeCode>().is_err());
    }

    #[test]
    fn test_type_code_serde_names() {
        let json = serde_json::to_string(&SqlTypeCode::Long32varchar).unwrap();
        assert_eq!(json, "\"LONG32VARCHAR\"");
        let json = serde_json::to_string(&SqlTypeCode::TimestampWithTimezone).unwrap();
        assert_eq!(json, "\"TIMESTAMP_WITH_TIMEZONE\"");
    }

    #[test]
    fn test_type_code_categories() {
        assert!(SqlTypeCode::Nvarchar.is_character());
        assert!(SqlTypeCode::Varbinary.is_binary());
        assert!(SqlTypeCode::Decimal.is_numeric());
        assert!(SqlTypeCode::Date.is_temporal());
        assert!(!SqlTypeCode::Blob.is_binary());
    }
}
