//! Serializable snapshot of what a dialect can do.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{DatabaseVersion, Dialect, DistinctFromStrategy, RowLockStrategy};
use crate::ast::{Size, SqlTypeCode};

/// Flags and limits of a dialect, as reported by its methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub name: String,
    pub version: DatabaseVersion,
    pub minimum_version: DatabaseVersion,
    pub column_types: BTreeMap<SqlTypeCode, String>,
    pub pagination: PaginationCapabilities,
    pub sequences: SequenceCapabilities,
    pub identity: IdentityCapabilities,
    pub locking: LockingCapabilities,
    pub limits: Limits,
    pub features: Features,
    pub quoting: (char, char),
    pub boolean_literals: (String, String),
    pub concat_operator: String,
    pub current_timestamp_select: String,
    pub from_dual_for_select_only: String,
    pub temporary_table_create_command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PaginationCapabilities {
    pub limit_handler: String,
    pub supports_limit: bool,
    pub supports_offset: bool,
    pub supports_variable_limit: bool,
    pub supports_offset_fetch_clause: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceCapabilities {
    pub supports_sequences: bool,
    pub supports_pooled_sequences: bool,
    pub query_sequences: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityCapabilities {
    pub supports_identity_columns: bool,
    pub supports_insert_select_identity: bool,
    pub has_data_type_in_identity_column: bool,
    pub identity_insert: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct LockingCapabilities {
    pub for_update: String,
    pub row_lock_strategy: RowLockStrategy,
    pub uses_lock_hints: bool,
    pub supports_skip_locked: bool,
    pub supports_no_wait: bool,
    pub supports_wait: bool,
    pub supports_lock_timeouts: bool,
    pub supports_outer_join_for_update: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_varchar_length: u32,
    pub max_nvarchar_length: u32,
    pub max_varbinary_length: u32,
    pub default_decimal_precision: u32,
    pub default_timestamp_precision: u32,
    pub float_precision: u32,
    pub double_precision: u32,
    pub max_identifier_length: u32,
    pub default_batch_size: u32,
    pub in_expression_count_limit: Option<u32>,
    pub parameter_count_limit: Option<u32>,
    pub fractional_second_precision_in_nanos: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Features {
    pub window_functions: bool,
    pub lateral: bool,
    pub distinct_from_predicate: bool,
    pub distinct_from_strategy: DistinctFromStrategy,
    pub values_list: bool,
    pub values_list_for_insert: bool,
    pub row_value_constructor: bool,
    pub row_value_constructor_in_in_list: bool,
    pub null_precedence: bool,
    pub intersect: bool,
    pub except: bool,
    pub merge: bool,
    pub conflict_clause: bool,
    pub on_duplicate_key: bool,
    pub update_from: bool,
    pub predicate_as_expression: bool,
    pub boolean_expression_as_predicate: bool,
    pub case_insensitive_like: bool,
    pub temporary_tables: bool,
    pub recursive_cte: bool,
    pub exists_in_select: bool,
    pub untyped_function_parameters: bool,
    pub if_exists_before_table_name: bool,
    pub if_exists_after_table_name: bool,
    pub comment_on: bool,
}

impl Capabilities {
    /// Takes the snapshot.
    #[must_use]
    pub fn of(dialect: &dyn Dialect) -> Self {
        let limit_handler = dialect.limit_handler();
        let sequences = dialect.sequence_support();
        let identity = dialect.identity_column_support();
        Self {
            name: dialect.name().to_string(),
            version: dialect.version(),
            minimum_version: dialect.minimum_version(),
            column_types: SqlTypeCode::ALL
                .into_iter()
                .map(|code| (code, dialect.type_name(code, Size::default())))
                .collect(),
            pagination: PaginationCapabilities {
                limit_handler: limit_handler.name().to_string(),
                supports_limit: limit_handler.supports_limit(),
                supports_offset: limit_handler.supports_offset(),
                supports_variable_limit: limit_handler.supports_variable_limit(),
                supports_offset_fetch_clause: dialect.supports_offset_fetch_clause(),
            },
            sequences: SequenceCapabilities {
                supports_sequences: sequences.supports_sequences(),
                supports_pooled_sequences: sequences.supports_pooled_sequences(),
                query_sequences: dialect.query_sequences_string().map(str::to_string),
            },
            identity: IdentityCapabilities {
                supports_identity_columns: identity.supports_identity_columns(),
                supports_insert_select_identity: identity.supports_insert_select_identity(),
                has_data_type_in_identity_column: identity.has_data_type_in_identity_column(),
                identity_insert: identity.identity_insert_string().map(str::to_string),
            },
            locking: LockingCapabilities {
                for_update: dialect.for_update_string(),
                row_lock_strategy: dialect.row_lock_strategy(),
                uses_lock_hints: dialect.uses_lock_hints(),
                supports_skip_locked: dialect.supports_skip_locked(),
                supports_no_wait: dialect.supports_no_wait(),
                supports_wait: dialect.supports_wait(),
                supports_lock_timeouts: dialect.supports_lock_timeouts(),
                supports_outer_join_for_update: dialect.supports_outer_join_for_update(),
            },
            limits: Limits {
                max_varchar_length: dialect.max_varchar_length(),
                max_nvarchar_length: dialect.max_nvarchar_length(),
                max_varbinary_length: dialect.max_varbinary_length(),
                default_decimal_precision: dialect.default_decimal_precision(),
                default_timestamp_precision: dialect.default_timestamp_precision(),
                float_precision: dialect.float_precision(),
                double_precision: dialect.double_precision(),
                max_identifier_length: dialect.max_identifier_length(),
                default_batch_size: dialect.default_batch_size(),
                in_expression_count_limit: dialect.in_expression_count_limit(),
                parameter_count_limit: dialect.parameter_count_limit(),
                fractional_second_precision_in_nanos: dialect
                    .fractional_second_precision_in_nanos(),
            },
            features: Features {
                window_functions: dialect.supports_window_functions(),
                lateral: dialect.supports_lateral(),
                distinct_from_predicate: dialect.supports_distinct_from_predicate(),
                distinct_from_strategy: dialect.distinct_from_strategy(),
                values_list: dialect.supports_values_list(),
                values_list_for_insert: dialect.supports_values_list_for_insert(),
                row_value_constructor: dialect.supports_row_value_constructor_syntax(),
                row_value_constructor_in_in_list: dialect
                    .supports_row_value_constructor_syntax_in_in_list(),
                null_precedence: dialect.supports_null_precedence(),
                intersect: dialect.supports_intersect(),
                except: dialect.supports_except(),
                merge: dialect.supports_merge(),
                conflict_clause: dialect.supports_conflict_clause(),
                on_duplicate_key: dialect.supports_on_duplicate_key(),
                update_from: dialect.supports_update_from(),
                predicate_as_expression: dialect.supports_predicate_as_expression(),
                boolean_expression_as_predicate: dialect
                    .supports_boolean_expression_as_predicate(),
                case_insensitive_like: dialect.supports_case_insensitive_like(),
                temporary_tables: dialect.supports_temporary_tables(),
                recursive_cte: dialect.supports_recursive_cte(),
                exists_in_select: dialect.supports_exists_in_select(),
                untyped_function_parameters: dialect.supports_untyped_function_parameters(),
                if_exists_before_table_name: dialect.supports_if_exists_before_table_name(),
                if_exists_after_table_name: dialect.supports_if_exists_after_table_name(),
                comment_on: dialect.supports_comment_on(),
            },
            quoting: (dialect.open_quote(), dialect.close_quote()),
            boolean_literals: (
                dialect.to_boolean_value_string(true).to_string(),
                dialect.to_boolean_value_string(false).to_string(),
            ),
            concat_operator: dialect.concat_operator().to_string(),
            current_timestamp_select: dialect.current_timestamp_select_string(),
            from_dual_for_select_only: dialect.from_dual_for_select_only().to_string(),
            temporary_table_create_command: dialect.temporary_table_create_command().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;

    #[test]
    fn test_snapshot_is_stable() {
        let a = GenericDialect::new().capabilities();
        let b = GenericDialect::new().capabilities();
        assert_eq!(a, b);
        assert_eq!(a.pagination.limit_handler, "offset-fetch");
        assert_eq!(a.column_types[&SqlTypeCode::Varchar], "varchar(255)");
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(GenericDialect::new().capabilities()).unwrap();
        assert_eq!(json["name"], "generic");
        assert_eq!(json["features"]["merge"], true);
        assert_eq!(json["column_types"]["BOOLEAN"], "boolean");
    }
}
