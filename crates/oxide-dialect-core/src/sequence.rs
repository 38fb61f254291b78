//! Sequence DDL and next-value SQL.
//!
//! Most databases fit [`StandardSequenceSupport`], a table of `?1`
//! patterns where `?1` is the sequence name. Databases without sequences
//! use [`NoSequenceSupport`], which fails with a mapping error.

use core::fmt;

use crate::dialect::render_pattern;
use crate::error::{DialectError, Result};

/// Sequence SQL for one database.
pub trait SequenceSupport: Send + Sync + fmt::Debug {
    /// Returns true if the database has sequences.
    fn supports_sequences(&self) -> bool {
        true
    }

    /// Returns true if increments other than 1 are allowed.
    fn supports_pooled_sequences(&self) -> bool {
        self.supports_sequences()
    }

    /// Expression yielding the next value, for use inside a query.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Mapping`] when sequences are unsupported.
    fn select_sequence_next_val_string(&self, name: &str) -> Result<String>;

    /// Complete statement returning the next value.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Mapping`] when sequences are unsupported.
    fn sequence_next_val_string(&self, name: &str) -> Result<String>;

    /// Statements creating the sequence.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Mapping`] when sequences are unsupported or
    /// the increment cannot be expressed.
    fn create_sequence_strings(&self, name: &str, initial: i64, increment: i64)
        -> Result<Vec<String>>;

    /// Statements dropping the sequence.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Mapping`] when sequences are unsupported.
    fn drop_sequence_strings(&self, name: &str) -> Result<Vec<String>>;
}

/// No sequences at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSequenceSupport;

impl NoSequenceSupport {
    /// Shared instance.
    pub const INSTANCE: Self = Self;

    fn error(name: &str) -> DialectError {
        DialectError::Mapping(format!(
            "cannot use sequence '{name}': the database does not support sequences"
        ))
    }
}

impl SequenceSupport for NoSequenceSupport {
    fn supports_sequences(&self) -> bool {
        false
    }

    fn select_sequence_next_val_string(&self, name: &str) -> Result<String> {
        Err(Self::error(name))
    }

    fn sequence_next_val_string(&self, name: &str) -> Result<String> {
        Err(Self::error(name))
    }

    fn create_sequence_strings(&self, name: &str, _: i64, _: i64) -> Result<Vec<String>> {
        Err(Self::error(name))
    }

    fn drop_sequence_strings(&self, name: &str) -> Result<Vec<String>> {
        Err(Self::error(name))
    }
}

/// How the start value and increment are written in `create` statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceStartStyle {
    /// ` start with I increment by N`.
    StartWithIncrementBy,
    /// ` increment by N start with I`.
    IncrementByStartWith,
    /// Same as [`Self::StartWithIncrementBy`], but the start value is
    /// lowered by one increment to make up for a first-value bug.
    OffByIncrement,
    /// Interbase generators: `create generator` followed by
    /// `set generator x to I-1`. Only an increment of 1 works.
    SetGenerator,
    /// Spanner bit-reversed sequences: ` start counter with I`, without
    /// an increment.
    StartCounterWith,
}

/// Pattern-driven sequence support; `?1` stands for the sequence name.
#[derive(Debug, Clone, Copy)]
pub struct StandardSequenceSupport {
    /// Next value inside a query, e.g. `?1.nextval`.
    pub select_next_val: &'static str,
    /// Complete next-value statement, e.g. `select ?1.nextval from dual`.
    pub next_val: &'static str,
    /// Create statement without the start/increment options.
    pub create: &'static str,
    /// How start and increment are written.
    pub start_style: SequenceStartStyle,
    /// Drop statement.
    pub drop: &'static str,
    /// Whether pooled increments are supported.
    pub pooled: bool,
}

impl StandardSequenceSupport {
    /// ANSI `next value for`, as in H2 2.x, HSQLDB and Firebird 4.
    pub const ANSI: Self = Self {
        select_next_val: "next value for ?1",
        next_val: "values next value for ?1",
        create: "create sequence ?1",
        start_style: SequenceStartStyle::StartWithIncrementBy,
        drop: "drop sequence ?1",
        pooled: true,
    };

    /// Oracle style `seq.nextval ... from dual`.
    pub const ORACLE: Self = Self {
        select_next_val: "?1.nextval",
        next_val: "select ?1.nextval from dual",
        ..Self::ANSI
    };

    /// Derby 10.6 and later.
    pub const DERBY: Self = Self {
        drop: "drop sequence ?1 restrict",
        ..Self::ANSI
    };

    /// DB2 LUW.
    pub const DB2: Self = Self {
        select_next_val: "next value for ?1",
        next_val: "values next value for ?1",
        drop: "drop sequence ?1 restrict",
        ..Self::ANSI
    };

    /// DB2 before 9.7 spells the expression `nextval for`.
    pub const DB2_LEGACY: Self = Self {
        select_next_val: "nextval for ?1",
        next_val: "values nextval for ?1",
        ..Self::DB2
    };

    /// DB2 for z/OS and iSeries, which lack `values` as a statement.
    pub const DB2_ZOS: Self = Self {
        next_val: "select next value for ?1 from sysibm.sysdummy1",
        ..Self::DB2
    };

    /// H2 1.x.
    pub const H2_V1: Self = Self {
        select_next_val: "nextval('?1')",
        next_val: "call next value for ?1",
        drop: "drop sequence if exists ?1",
        ..Self::ANSI
    };

    /// H2 2.x.
    pub const H2_V2: Self = Self {
        drop: "drop sequence if exists ?1",
        ..Self::ANSI
    };

    /// HSQLDB.
    pub const HSQL: Self = Self {
        next_val: "call next value for ?1",
        drop: "drop sequence if exists ?1",
        ..Self::ANSI
    };

    /// Firebird 4 and later.
    pub const FIREBIRD: Self = Self {
        next_val: "select next value for ?1 from rdb$database",
        ..Self::ANSI
    };

    /// Firebird 3 reports the first value one increment too high.
    pub const FIREBIRD_3: Self = Self {
        start_style: SequenceStartStyle::OffByIncrement,
        ..Self::FIREBIRD
    };

    /// Firebird 2.x generators.
    pub const INTERBASE: Self = Self {
        select_next_val: "gen_id(?1,1)",
        next_val: "select gen_id(?1,1) from rdb$database",
        create: "create generator ?1",
        start_style: SequenceStartStyle::SetGenerator,
        drop: "drop generator ?1",
        pooled: false,
    };

    /// Informix, with the increment first.
    pub const INFORMIX: Self = Self {
        select_next_val: "?1.nextval",
        next_val: "select ?1.nextval from informix.systables where tabid=1",
        start_style: SequenceStartStyle::IncrementByStartWith,
        ..Self::ANSI
    };

    /// Informix before 11.70 has no pooled sequences.
    pub const INFORMIX_UNPOOLED: Self = Self {
        pooled: false,
        ..Self::INFORMIX
    };

    /// SQL Server 2012 and later.
    pub const SQL_SERVER: Self = Self {
        next_val: "select next value for ?1",
        ..Self::ANSI
    };

    /// SQL Server 2016 and later.
    pub const SQL_SERVER_16: Self = Self {
        drop: "drop sequence if exists ?1",
        ..Self::SQL_SERVER
    };

    /// CUBRID serials.
    pub const CUBRID: Self = Self {
        select_next_val: "?1.next_value",
        next_val: "select ?1.next_value from table({1}) as T(X)",
        create: "create serial ?1",
        drop: "drop serial ?1",
        ..Self::ANSI
    };

    /// Altibase.
    pub const ALTIBASE: Self = Self::ORACLE;

    /// PostgreSQL `nextval('seq')`, also CockroachDB and GaussDB.
    pub const POSTGRESQL: Self = Self {
        select_next_val: "nextval('?1')",
        next_val: "select nextval('?1')",
        drop: "drop sequence if exists ?1",
        ..Self::ANSI
    };

    /// Spanner, whose sequences hand out bit-reversed values.
    pub const SPANNER: Self = Self {
        create: "create sequence ?1 bit_reversed_positive",
        start_style: SequenceStartStyle::StartCounterWith,
        pooled: false,
        ..Self::POSTGRESQL
    };
}

impl SequenceSupport for StandardSequenceSupport {
    fn supports_pooled_sequences(&self) -> bool {
        self.pooled
    }

    fn select_sequence_next_val_string(&self, name: &str) -> Result<String> {
        render_pattern(self.select_next_val, &[name])
    }

    fn sequence_next_val_string(&self, name: &str) -> Result<String> {
        render_pattern(self.next_val, &[name])
    }

    fn create_sequence_strings(
        &self,
        name: &str,
        initial: i64,
        increment: i64,
    ) -> Result<Vec<String>> {
        let create = render_pattern(self.create, &[name])?;
        let statements = match self.start_style {
            SequenceStartStyle::StartWithIncrementBy => {
                vec![format!("{create} start with {initial} increment by {increment}")]
            }
            SequenceStartStyle::IncrementByStartWith => {
                vec![format!("{create} increment by {increment} start with {initial}")]
            }
            SequenceStartStyle::OffByIncrement => {
                let start = initial.saturating_sub(increment);
                vec![format!("{create} start with {start} increment by {increment}")]
            }
            SequenceStartStyle::SetGenerator => {
                if increment != 1 {
                    return Err(DialectError::Mapping(format!(
                        "cannot create generator '{name}' with increment {increment}: only 1 is supported"
                    )));
                }
                vec![
                    create,
                    format!("set generator {name} to {}", initial.saturating_sub(1)),
                ]
            }
            SequenceStartStyle::StartCounterWith => {
                if increment != 1 {
                    return Err(DialectError::Mapping(format!(
                        "cannot create sequence '{name}' with increment {increment}: bit-reversed sequences have none"
                    )));
                }
                vec![format!("{create} start counter with {initial}")]
            }
        };
        Ok(statements)
    }

    fn drop_sequence_strings(&self, name: &str) -> Result<Vec<String>> {
        Ok(vec![render_pattern(self.drop, &[name])?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_style() {
        let support = StandardSequenceSupport::ORACLE;
        assert_eq!(
            support.select_sequence_next_val_string("seq").unwrap(),
            "seq.nextval"
        );
        assert_eq!(
            support.sequence_next_val_string("seq").unwrap(),
            "select seq.nextval from dual"
        );
        assert_eq!(
            support.create_sequence_strings("seq", 1, 50).unwrap(),
            vec!["create sequence seq start with 1 increment by 50"]
        );
        assert_eq!(
            support.drop_sequence_strings("seq").unwrap(),
            vec!["drop sequence seq"]
        );
    }

    #[test]
    fn test_informix_increment_first() {
        let support = StandardSequenceSupport::INFORMIX;
        assert_eq!(
            support.create_sequence_strings("s", 10, 5).unwrap(),
            vec!["create sequence s increment by 5 start with 10"]
        );
        assert!(!StandardSequenceSupport::INFORMIX_UNPOOLED.supports_pooled_sequences());
    }

    #[test]
    fn test_firebird_variants() {
        assert_eq!(
            StandardSequenceSupport::FIREBIRD_3
                .create_sequence_strings("s", 1, 50)
                .unwrap(),
            vec!["create sequence s start with -49 increment by 50"]
        );
        let generators = StandardSequenceSupport::INTERBASE;
        assert_eq!(
            generators.create_sequence_strings("s", 10, 1).unwrap(),
            vec!["create generator s", "set generator s to 9"]
        );
        assert!(matches!(
            generators.create_sequence_strings("s", 1, 50),
            Err(DialectError::Mapping(_))
        ));
    }

    #[test]
    fn test_postgresql_family() {
        let support = StandardSequenceSupport::POSTGRESQL;
        assert_eq!(
            support.select_sequence_next_val_string("s").unwrap(),
            "nextval('s')"
        );
        assert_eq!(
            support.drop_sequence_strings("s").unwrap(),
            vec!["drop sequence if exists s"]
        );
        let spanner = StandardSequenceSupport::SPANNER;
        assert!(!spanner.supports_pooled_sequences());
        assert_eq!(
            spanner.create_sequence_strings("s", 1000, 1).unwrap(),
            vec!["create sequence s bit_reversed_positive start counter with 1000"]
        );
        assert!(matches!(
            spanner.create_sequence_strings("s", 1, 50),
            Err(DialectError::Mapping(_))
        ));
    }

    #[test]
    fn test_no_sequences() {
        let support = NoSequenceSupport::INSTANCE;
        assert!(!support.supports_sequences());
        assert!(!support.supports_pooled_sequences());
        assert!(matches!(
            support.sequence_next_val_string("s"),
            Err(DialectError::Mapping(_))
        ));
    }
}
