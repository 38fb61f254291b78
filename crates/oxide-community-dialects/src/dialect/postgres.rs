//! Pieces shared by the databases speaking PostgreSQL's dialect:
//! CockroachDB, GaussDB and Spanner's PostgreSQL interface.

use oxide_dialect_core::dialect::{unsupported_unit, IntervalType, TemporalType, TemporalUnit};
use oxide_dialect_core::exception::{extract_using_template, JdbcError, JdbcErrorKind, SqlError};
use oxide_dialect_core::Result;

use super::classified;

/// `?2` units as an interval, with `native` the length of
/// [`TemporalUnit::Native`].
pub(crate) fn interval_pattern(dialect: &str, unit: TemporalUnit, native: &str) -> Result<String> {
    Ok(match unit {
        TemporalUnit::Native => format!("(?2)*interval '1 {native}'"),
        TemporalUnit::Nanosecond => "(?2)/1e3*interval '1 microsecond'".into(),
        // quarter and week are not interval units
        TemporalUnit::Quarter => "(?2)*interval '3 month'".into(),
        TemporalUnit::Week => "(?2)*interval '7 day'".into(),
        TemporalUnit::DayOfWeek
        | TemporalUnit::DayOfMonth
        | TemporalUnit::DayOfYear
        | TemporalUnit::Epoch => return Err(unsupported_unit(dialect, "timestampadd", unit)),
        other => format!("(?2)*interval '1 {other}'"),
    })
}

/// `timestampadd` as interval arithmetic, cast back to the operand type.
pub(crate) fn timestampadd_pattern(
    dialect: &str,
    unit: TemporalUnit,
    temporal_type: TemporalType,
    interval: Option<IntervalType>,
    native: &str,
) -> Result<String> {
    if interval.is_some() {
        return Ok("(?2+?3)".into());
    }
    Ok(format!(
        "cast(?3+{} as {})",
        interval_pattern(dialect, unit, native)?,
        temporal_type.as_str()
    ))
}

/// `timestampdiff` for the units read from the fields of an interval.
/// `division` divides months into quarters.
pub(crate) fn interval_field_difference(unit: TemporalUnit, division: &str) -> Option<String> {
    Some(match unit {
        TemporalUnit::Year => "extract(year from ?3-?2)".into(),
        TemporalUnit::Quarter => {
            format!("(extract(year from ?3-?2)*4+extract(month from ?3-?2){division}3)")
        }
        TemporalUnit::Month => "(extract(year from ?3-?2)*12+extract(month from ?3-?2))".into(),
        // extract() takes no week from an interval
        TemporalUnit::Week => "(extract(day from ?3-?2)/7)".into(),
        TemporalUnit::Day => "extract(day from ?3-?2)".into(),
        _ => return None,
    })
}

/// Classifies the SQL states PostgreSQL reserves for lock and
/// cancellation failures.
pub(crate) fn convert_sql_state(
    dialect: &str,
    error: &SqlError,
    message: &str,
    sql: Option<&str>,
) -> Option<JdbcError> {
    let kind = match error.sql_state()? {
        "40P01" => JdbcErrorKind::LockAcquisition,
        "55P03" => JdbcErrorKind::PessimisticLock,
        "57014" => JdbcErrorKind::QueryTimeout,
        _ => return None,
    };
    classified(dialect, kind, error, message, sql)
}

/// Constraint name quoted in a PostgreSQL integrity violation message.
pub(crate) fn extract_constraint_name(error: &SqlError) -> Option<String> {
    let message = error.message.as_str();
    match error.sql_state()? {
        "23514" => extract_using_template("violates check constraint \"", "\"", message),
        "23505" => extract_using_template("violates unique constraint \"", "\"", message),
        "23503" => extract_using_template("violates foreign key constraint \"", "\"", message),
        "23502" => extract_using_template(
            "null value in column \"",
            "\" violates not-null constraint",
            message,
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_patterns() {
        assert_eq!(
            interval_pattern("x", TemporalUnit::Quarter, "second").unwrap(),
            "(?2)*interval '3 month'"
        );
        assert_eq!(
            interval_pattern("x", TemporalUnit::Native, "microsecond").unwrap(),
            "(?2)*interval '1 microsecond'"
        );
        assert_eq!(
            timestampadd_pattern("x", TemporalUnit::Hour, TemporalType::Date, None, "second")
                .unwrap(),
            "cast(?3+(?2)*interval '1 hour' as date)"
        );
        assert!(interval_pattern("x", TemporalUnit::DayOfWeek, "second").is_err());
    }

    #[test]
    fn test_constraint_names() {
        let unique = SqlError::new(0, "duplicate key value violates unique constraint \"uk_email\"")
            .with_sql_state("23505");
        assert_eq!(extract_constraint_name(&unique), Some("uk_email".into()));
        let not_null = SqlError::new(
            0,
            "null value in column \"name\" violates not-null constraint",
        )
        .with_sql_state("23502");
        assert_eq!(extract_constraint_name(&not_null), Some("name".into()));
        assert_eq!(extract_constraint_name(&SqlError::new(0, "x")), None);
    }

    #[test]
    fn test_convert_sql_state() {
        let deadlock = SqlError::new(0, "deadlock detected").with_sql_state("40P01");
        assert_eq!(
            convert_sql_state("x", &deadlock, "update", None).unwrap().kind,
            JdbcErrorKind::LockAcquisition
        );
        let other = SqlError::new(0, "syntax").with_sql_state("42601");
        assert!(convert_sql_state("x", &other, "select", None).is_none());
    }
}
