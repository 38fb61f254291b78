//! Identity (auto-increment) columns.

use core::fmt;

use crate::ast::SqlTypeCode;
use crate::dialect::render_pattern;
use crate::error::{DialectError, Result};

/// Identity column SQL for one database.
pub trait IdentityColumnSupport: Send + Sync + fmt::Debug {
    /// Returns true if the database has identity columns.
    fn supports_identity_columns(&self) -> bool;

    /// Returns true if the generated key can be selected in the same
    /// statement as the insert.
    fn supports_insert_select_identity(&self) -> bool {
        false
    }

    /// Returns true if the column type is written before the identity
    /// clause, false if the clause replaces the type.
    fn has_data_type_in_identity_column(&self) -> bool {
        true
    }

    /// Appends the identity select to an insert statement.
    fn append_identity_select_to_insert(&self, sql: &str) -> String {
        sql.to_string()
    }

    /// Statement returning the last generated key.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Mapping`] when the key cannot be selected.
    fn identity_select_string(&self, table: &str, column: &str, code: SqlTypeCode)
        -> Result<String>;

    /// Column definition fragment declaring the identity.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Mapping`] when identities are unsupported.
    fn identity_column_string(&self, code: SqlTypeCode) -> Result<String>;

    /// Value to insert into an identity column, if the column may not be
    /// omitted.
    fn identity_insert_string(&self) -> Option<&'static str> {
        None
    }
}

/// Table-driven identity support. Select patterns take `?1` for the table
/// and `?2` for the column.
#[derive(Debug, Clone, Copy)]
pub struct StandardIdentityColumnSupport {
    /// Identity clause, `None` when unsupported.
    pub column: Option<&'static str>,
    /// Identity clause for `bigint` columns, when it differs.
    pub bigint_column: Option<&'static str>,
    /// Last-key statement.
    pub select: Option<&'static str>,
    /// Last-key statement for `bigint` columns, when it differs.
    pub bigint_select: Option<&'static str>,
    /// Whether the type precedes the clause.
    pub data_type_in_column: bool,
    /// Suffix appended to inserts to select the key.
    pub insert_select_suffix: Option<&'static str>,
    /// Value inserted into the identity column.
    pub insert_value: Option<&'static str>,
}

impl StandardIdentityColumnSupport {
    /// No identity columns.
    pub const NONE: Self = Self {
        column: None,
        bigint_column: None,
        select: None,
        bigint_select: None,
        data_type_in_column: true,
        insert_select_suffix: None,
        insert_value: None,
    };

    /// DB2 LUW and Derby.
    pub const DB2: Self = Self {
        column: Some("generated by default as identity"),
        select: Some("values identity_val_local()"),
        insert_value: Some("default"),
        ..Self::NONE
    };

    /// DB2 for z/OS and iSeries.
    pub const DB2_ZOS: Self = Self {
        select: Some("select identity_val_local() from sysibm.sysdummy1"),
        ..Self::DB2
    };

    /// H2.
    pub const H2: Self = Self {
        column: Some("generated by default as identity"),
        select: Some("call identity()"),
        insert_value: Some("default"),
        ..Self::NONE
    };

    /// HSQLDB.
    pub const HSQL: Self = Self {
        column: Some("generated by default as identity (start with 1)"),
        select: Some("call identity()"),
        insert_value: Some("default"),
        ..Self::NONE
    };

    /// SQL standard clause with keys read from the driver (Oracle 12c,
    /// Firebird 3).
    pub const GENERATED: Self = Self {
        column: Some("generated by default as identity"),
        ..Self::NONE
    };

    /// Teradata.
    pub const TERADATA: Self = Self {
        column: Some("generated by default as identity not null"),
        ..Self::NONE
    };

    /// Informix `serial` types.
    pub const INFORMIX: Self = Self {
        column: Some("serial not null"),
        bigint_column: Some("bigserial not null"),
        select: Some("select dbinfo('sqlca.sqlerrd1') from informix.systables where tabid=1"),
        bigint_select: Some("select dbinfo('bigserial') from informix.systables where tabid=1"),
        data_type_in_column: false,
        insert_value: Some("0"),
        ..Self::NONE
    };

    /// InterSystems IRIS.
    pub const IRIS: Self = Self {
        column: Some("identity"),
        select: Some("select LAST_IDENTITY() from %TSQL_sys.snf"),
        data_type_in_column: false,
        ..Self::NONE
    };

    /// SQL Server.
    pub const SQL_SERVER: Self = Self {
        column: Some("identity not null"),
        select: Some("select @@identity"),
        insert_select_suffix: Some(" select scope_identity()"),
        ..Self::NONE
    };

    /// Sybase ASE.
    pub const SYBASE: Self = Self {
        column: Some("identity not null"),
        select: Some("select @@identity"),
        insert_select_suffix: Some("\nselect @@identity"),
        ..Self::NONE
    };

    /// PostgreSQL family `serial` types, read back with `currval` of the
    /// implicit sequence.
    pub const SERIAL: Self = Self {
        column: Some("serial not null"),
        bigint_column: Some("bigserial not null"),
        select: Some("select currval('?1_?2_seq')"),
        data_type_in_column: false,
        ..Self::NONE
    };

    /// MySQL family (SingleStore, CUBRID).
    pub const AUTO_INCREMENT: Self = Self {
        column: Some("not null auto_increment"),
        select: Some("select last_insert_id()"),
        ..Self::NONE
    };
}

const fn is_bigint(code: SqlTypeCode) -> bool {
    matches!(code, SqlTypeCode::Bigint)
}

impl IdentityColumnSupport for StandardIdentityColumnSupport {
    fn supports_identity_columns(&self) -> bool {
        self.column.is_some()
    }

    fn supports_insert_select_identity(&self) -> bool {
        self.insert_select_suffix.is_some()
    }

    fn has_data_type_in_identity_column(&self) -> bool {
        self.data_type_in_column
    }

    fn append_identity_select_to_insert(&self, sql: &str) -> String {
        match self.insert_select_suffix {
            Some(suffix) => format!("{sql}{suffix}"),
            None => sql.to_string(),
        }
    }

    fn identity_select_string(
        &self,
        table: &str,
        column: &str,
        code: SqlTypeCode,
    ) -> Result<String> {
        let pattern = self
            .bigint_select
            .filter(|_| is_bigint(code))
            .or(self.select)
            .ok_or_else(|| {
                DialectError::Mapping(format!(
                    "cannot select the generated key of {table}.{column}: use the driver's generated keys"
                ))
            })?;
        render_pattern(pattern, &[table, column])
    }

    fn identity_column_string(&self, code: SqlTypeCode) -> Result<String> {
        self.bigint_column
            .filter(|_| is_bigint(code))
            .or(self.column)
            .map(str::to_string)
            .ok_or_else(|| {
                DialectError::Mapping("the database does not support identity columns".into())
            })
    }

    fn identity_insert_string(&self) -> Option<&'static str> {
        self.insert_value
    }
}
