//! Temporal units and types used by extract, timestampadd and timestampdiff.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, Result};

/// A temporal field or duration unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalUnit {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Nanosecond,
    /// The database's own finest duration unit.
    Native,
    DayOfWeek,
    DayOfMonth,
    DayOfYear,
    Epoch,
}

impl TemporalUnit {
    /// Units that can be used as the unit of a duration.
    pub const DURATION_UNITS: [Self; 9] = [
        Self::Year,
        Self::Quarter,
        Self::Month,
        Self::Week,
        Self::Day,
        Self::Hour,
        Self::Minute,
        Self::Second,
        Self::Nanosecond,
    ];

    /// Every unit, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Year,
        Self::Quarter,
        Self::Month,
        Self::Week,
        Self::Day,
        Self::Hour,
        Self::Minute,
        Self::Second,
        Self::Nanosecond,
        Self::Native,
        Self::DayOfWeek,
        Self::DayOfMonth,
        Self::DayOfYear,
        Self::Epoch,
    ];

    /// Returns the lower-case name, e.g. `day_of_week`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Quarter => "quarter",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Nanosecond => "nanosecond",
            Self::Native => "native",
            Self::DayOfWeek => "day_of_week",
            Self::DayOfMonth => "day_of_month",
            Self::DayOfYear => "day_of_year",
            Self::Epoch => "epoch",
        }
    }

    /// Returns true for units that only touch the date part.
    #[must_use]
    pub const fn is_date_unit(&self) -> bool {
        matches!(
            self,
            Self::Year
                | Self::Quarter
                | Self::Month
                | Self::Week
                | Self::Day
                | Self::DayOfWeek
                | Self::DayOfMonth
                | Self::DayOfYear
        )
    }

    /// Returns true for units that can be converted to months.
    #[must_use]
    pub const fn is_month_based(&self) -> bool {
        matches!(self, Self::Year | Self::Quarter | Self::Month)
    }

    fn months(self) -> Option<u64> {
        match self {
            Self::Year => Some(12),
            Self::Quarter => Some(3),
            Self::Month => Some(1),
            _ => None,
        }
    }

    fn nanos(self, native_nanos: u64) -> Option<u64> {
        match self {
            Self::Week => Some(604_800_000_000_000),
            Self::Day => Some(86_400_000_000_000),
            Self::Hour => Some(3_600_000_000_000),
            Self::Minute => Some(60_000_000_000),
            Self::Second => Some(1_000_000_000),
            Self::Nanosecond => Some(1),
            Self::Native => Some(native_nanos),
            _ => None,
        }
    }

    /// Returns the arithmetic suffix converting a quantity in `self` to `to`.
    ///
    /// The result is empty for identical units, otherwise `*N` or `/N`.
    /// `native_nanos` is the length of [`TemporalUnit::Native`] in
    /// nanoseconds for the current dialect.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Semantic`] when one unit is month-based and
    /// the other is not, or when either unit is not a duration.
    pub fn conversion_factor(self, to: Self, native_nanos: u64) -> Result<String> {
        if self == to {
            return Ok(String::new());
        }
        let (from_len, to_len) = match (self.months(), to.months()) {
            (Some(f), Some(t)) => (f, t),
            (None, None) => match (self.nanos(native_nanos), to.nanos(native_nanos)) {
                (Some(f), Some(t)) => (f, t),
                _ => return Err(illegal_conversion(self, to)),
            },
            _ => return Err(illegal_conversion(self, to)),
        };
        if from_len == to_len {
            Ok(String::new())
        } else if from_len > to_len {
            Ok(format!("*{}", from_len / to_len))
        } else {
            Ok(format!("/{}", to_len / from_len))
        }
    }
}

fn illegal_conversion(from: TemporalUnit, to: TemporalUnit) -> DialectError {
    DialectError::Semantic(format!("illegal unit conversion {from} to {to}"))
}

impl fmt::Display for TemporalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemporalUnit {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| DialectError::Semantic(format!("unknown temporal unit '{s}'")))
    }
}

/// Type of a temporal operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalType {
    Date,
    Time,
    #[default]
    Timestamp,
}

impl TemporalType {
    /// Returns the lower-case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
        }
    }
}

/// Marks a timestampadd whose magnitude is an interval, not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalType {
    /// Interval of seconds.
    Second,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_factor_nanos() {
        let native = 1_000;
        assert_eq!(
            TemporalUnit::Day.conversion_factor(TemporalUnit::Second, native).unwrap(),
            "*86400"
        );
        assert_eq!(
            TemporalUnit::Second.conversion_factor(TemporalUnit::Hour, native).unwrap(),
            "/3600"
        );
        assert_eq!(
            TemporalUnit::Nanosecond.conversion_factor(TemporalUnit::Native, native).unwrap(),
            "/1000"
        );
        assert_eq!(
            TemporalUnit::Minute.conversion_factor(TemporalUnit::Minute, native).unwrap(),
            ""
        );
    }

    #[test]
    fn test_conversion_factor_months() {
        assert_eq!(
            TemporalUnit::Year.conversion_factor(TemporalUnit::Month, 1).unwrap(),
            "*12"
        );
        assert_eq!(
            TemporalUnit::Month.conversion_factor(TemporalUnit::Quarter, 1).unwrap(),
            "/3"
        );
    }

    #[test]
    fn test_conversion_factor_illegal() {
        let err = TemporalUnit::Month
            .conversion_factor(TemporalUnit::Day, 1)
            .unwrap_err();
        assert!(matches!(err, DialectError::Semantic(_)));
        assert!(TemporalUnit::DayOfWeek
            .conversion_factor(TemporalUnit::Day, 1)
            .is_err());
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!(
            "day of week".parse::<TemporalUnit>().unwrap(),
            TemporalUnit::DayOfWeek
        );
        assert_eq!("YEAR".parse::<TemporalUnit>().unwrap(), TemporalUnit::Year);
        assert!("fortnight".parse::<TemporalUnit>().is_err());
    }

    #[test]
    fn test_date_units() {
        assert!(TemporalUnit::Week.is_date_unit());
        assert!(!TemporalUnit::Hour.is_date_unit());
        assert!(TemporalUnit::Quarter.is_month_based());
    }
}
