//! Tests for the `timestampadd` and `timestampdiff` patterns of every
//! dialect: placeholders, unit handling and extraction.

mod common;
use common::*;

use oxide_dialect_core::dialect::{TemporalType, TemporalUnit};
use rstest::rstest;

const UNITS: [TemporalUnit; 10] = [
    TemporalUnit::Year,
    TemporalUnit::Quarter,
    TemporalUnit::Month,
    TemporalUnit::Week,
    TemporalUnit::Day,
    TemporalUnit::Hour,
    TemporalUnit::Minute,
    TemporalUnit::Second,
    TemporalUnit::Nanosecond,
    TemporalUnit::Native,
];

#[rstest]
fn timestampadd_reads_both_operands(
    #[values(
        "altibase", "cockroach", "cubrid", "db2", "derby", "firebird", "gaussdb", "h2", "hsql",
        "informix", "iris", "oracle", "singlestore", "sinodb", "spanner", "sqlserver", "sybase",
        "teradata"
    )]
    name: &str,
    #[values(TemporalType::Date, TemporalType::Timestamp)] temporal_type: TemporalType,
) {
    for dialect in version_range(name) {
        for unit in UNITS {
            if let Ok(pattern) = dialect.timestampadd_pattern(unit, temporal_type, None) {
                assert_temporal_placeholders(&pattern);
            }
        }
    }
}

#[rstest]
fn timestampdiff_reads_both_operands(
    #[values(
        "altibase", "cockroach", "cubrid", "db2", "derby", "firebird", "gaussdb", "h2", "hsql",
        "informix", "iris", "oracle", "singlestore", "sinodb", "spanner", "sqlserver", "sybase",
        "teradata"
    )]
    name: &str,
    #[values(TemporalType::Date, TemporalType::Timestamp)] from_type: TemporalType,
    #[values(TemporalType::Date, TemporalType::Timestamp)] to_type: TemporalType,
) {
    for dialect in version_range(name) {
        for unit in UNITS {
            if let Ok(pattern) = dialect.timestampdiff_pattern(unit, from_type, to_type) {
                assert_temporal_placeholders(&pattern);
            }
        }
    }
}

#[test]
fn every_dialect_handles_days() {
    for name in DATABASES {
        let dialect = latest(name);
        assert!(
            dialect
                .timestampadd_pattern(TemporalUnit::Day, TemporalType::Timestamp, None)
                .is_ok(),
            "{name} cannot add days"
        );
        assert!(
            dialect
                .timestampdiff_pattern(
                    TemporalUnit::Day,
                    TemporalType::Timestamp,
                    TemporalType::Timestamp
                )
                .is_ok(),
            "{name} cannot count days"
        );
    }
}

#[rstest]
#[case("altibase", "dateadd(?3,?2,'day')")]
#[case("sybase", "dateadd(day,?2,?3)")]
#[case("cubrid", "adddate(?3,interval ?2 day)")]
fn day_addition(#[case] name: &str, #[case] expected: &str) {
    let pattern = latest(name)
        .timestampadd_pattern(TemporalUnit::Day, TemporalType::Timestamp, None)
        .unwrap();
    assert_eq!(pattern.replace("?1", "day"), expected);
}

#[rstest]
#[case("altibase")]
#[case("cubrid")]
#[case("sybase")]
#[case("teradata")]
fn extract_reads_the_operand(#[case] name: &str) {
    let dialect = latest(name);
    for unit in [TemporalUnit::Year, TemporalUnit::DayOfYear, TemporalUnit::Epoch] {
        let pattern = dialect.extract_pattern(unit).unwrap();
        assert!(pattern.contains("?2"), "{name} {unit:?}: {pattern}");
    }
}
