//! SQL reading and writing the components of aggregate columns, that is
//! embeddables mapped to a single JSON, XML or composite-type column.

use oxide_dialect_core::ast::SqlTypeCode;
use oxide_dialect_core::{DialectError, Result};

const XML_ROOT_TAG: &str = "e";
const XML_EXTRACT_START: &str = "xmlelement(name \"e\",(select xmlagg(t.v) from xmltable(";
const XML_EXTRACT_SEPARATOR: &str = "/*' passing ";
const XML_EXTRACT_END: &str = " columns v xml path '.')t))";
const XML_QUERY_START: &str = "(select xmlagg(t.v) from xmltable(";
const XML_QUERY_SEPARATOR: &str = "' passing ";
const XML_QUERY_END: &str = " columns v xml path '.')t)";

/// How an aggregate column stores its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    /// A `jsonb` document.
    Json,
    /// An `xml` document under an `<e>` root.
    Xml,
    /// A composite type.
    Struct,
}

/// One component of an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateComponent<'a> {
    /// Name of the component inside the aggregate.
    pub name: &'a str,
    /// Type of the component.
    pub code: SqlTypeCode,
    /// Column definition, used as a cast target, e.g. `integer`.
    pub definition: &'a str,
}

impl<'a> AggregateComponent<'a> {
    /// Creates a component.
    #[must_use]
    pub const fn new(name: &'a str, code: SqlTypeCode, definition: &'a str) -> Self {
        Self {
            name,
            code,
            definition,
        }
    }
}

/// A component assigned by an aggregate update. `path` lists the names
/// from the aggregate down to the component, nested aggregates first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentUpdate<'a> {
    /// Names leading to the component.
    pub path: Vec<&'a str>,
    /// Type of the component.
    pub code: SqlTypeCode,
    /// Write expression with `?` for the value.
    pub write_expression: &'a str,
}

const fn is_binary(code: SqlTypeCode) -> bool {
    matches!(
        code,
        SqlTypeCode::Binary | SqlTypeCode::Varbinary | SqlTypeCode::Long32varbinary
    )
}

/// Aggregate column support of GaussDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussDbAggregateSupport;

impl GaussDbAggregateSupport {
    /// Shared instance.
    pub const INSTANCE: Self = Self;

    /// Replaces `placeholder` in `template` with the expression reading
    /// `component` out of the aggregate read by `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Mapping`] when the template has no
    /// placeholder.
    pub fn component_read_expression(
        &self,
        template: &str,
        placeholder: &str,
        parent: &str,
        kind: AggregateKind,
        component: &AggregateComponent<'_>,
    ) -> Result<String> {
        if placeholder.is_empty() || !template.contains(placeholder) {
            return Err(DialectError::Mapping(format!(
                "read template '{template}' lacks the placeholder '{placeholder}'"
            )));
        }
        let name = component.name;
        let read = match kind {
            AggregateKind::Json => match component.code {
                SqlTypeCode::Json => format!("{parent}->'{name}'"),
                // binary data is stored as hex
                code if is_binary(code) => format!("decode({parent}->>'{name}','hex')"),
                _ => format!("cast({parent}->>'{name}' as {})", component.definition),
            },
            AggregateKind::Xml => match component.code {
                SqlTypeCode::Sqlxml => format!(
                    "{XML_EXTRACT_START}{}{XML_EXTRACT_END}",
                    xml_extract_arguments(parent, &format!("{name}/*"))
                ),
                code if is_binary(code) => format!(
                    "decode((select t.v from xmltable({} columns v text path '.') t),'hex')",
                    xml_extract_arguments(parent, name)
                ),
                _ => format!(
                    "(select t.v from xmltable({} columns v {} path '.') t)",
                    xml_extract_arguments(parent, name),
                    component.definition
                ),
            },
            AggregateKind::Struct => format!("({parent}).{name}"),
        };
        Ok(template.replace(placeholder, &read))
    }

    /// Target of an assignment to `column`. JSON and XML documents are
    /// always replaced as a whole.
    #[must_use]
    pub fn component_assignment_expression(
        &self,
        parent: &str,
        column: &str,
        kind: AggregateKind,
    ) -> String {
        match kind {
            AggregateKind::Json | AggregateKind::Xml => parent.to_string(),
            AggregateKind::Struct => format!("{parent}.{column}"),
        }
    }

    /// Returns true if updates of the aggregate need
    /// [`Self::json_update_expression`] or its XML counterpart.
    #[must_use]
    pub const fn requires_custom_write_renderer(&self, kind: AggregateKind) -> bool {
        matches!(kind, AggregateKind::Json | AggregateKind::Xml)
    }

    /// Returns true if the aggregate is selected as one value. The driver
    /// cannot read composite types, so those are read component-wise.
    #[must_use]
    pub const fn prefers_select_aggregate_mapping(&self, kind: AggregateKind) -> bool {
        !matches!(kind, AggregateKind::Struct)
    }

    /// Write expression of a component stored in a JSON document.
    #[must_use]
    pub fn json_write_expression(&self, write_expression: &str, code: SqlTypeCode) -> String {
        if is_binary(code) {
            format!("to_jsonb(encode({write_expression},'hex'))")
        } else {
            format!("to_jsonb({write_expression})")
        }
    }

    /// Write expression of a component stored in an XML document.
    #[must_use]
    pub fn xml_write_expression(&self, write_expression: &str, code: SqlTypeCode) -> String {
        if is_binary(code) {
            format!("encode({write_expression},'hex')")
        } else {
            write_expression.to_string()
        }
    }

    /// New value of the JSON aggregate `column`, merging the updated
    /// components into the current document. Nested aggregates missing
    /// from the document start out empty.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::Mapping`] for a component without a path
    /// or a write expression without exactly one `?`.
    pub fn json_update_expression(
        &self,
        column: &str,
        qualifier: Option<&str>,
        nullable: bool,
        updates: &[ComponentUpdate<'_>],
    ) -> Result<String> {
        let mut root = JsonNode::default();
        for update in updates {
            let (leaf, parents) = update.path.split_last().ok_or_else(|| {
                DialectError::Mapping(format!("component of '{column}' has an empty path"))
            })?;
            let write = self.json_write_expression(update.write_expression, update.code);
            let (start, end) = write.split_once('?').ok_or_else(|| {
                DialectError::Mapping(format!("write expression '{write}' has no parameter"))
            })?;
            if end.contains('?') {
                return Err(DialectError::Mapping(format!(
                    "write expression '{write}' has more than one parameter"
                )));
            }
            root.nested(parents)
                .children
                .push(((*leaf).to_string(), JsonValue::Value(format!("{start}?{end}"))));
        }
        let base = match qualifier.filter(|q| !q.trim().is_empty()) {
            Some(qualifier) => format!("{qualifier}.{column}"),
            None => column.to_string(),
        };
        let mut sql = if nullable {
            format!("coalesce({base},'{{}}')")
        } else {
            base.clone()
        };
        root.append(&mut sql, &base);
        Ok(sql)
    }
}

#[derive(Debug, Default)]
struct JsonNode {
    children: Vec<(String, JsonValue)>,
}

#[derive(Debug)]
enum JsonValue {
    Value(String),
    Nested(JsonNode),
}

impl JsonNode {
    fn nested(&mut self, path: &[&str]) -> &mut Self {
        let Some((first, rest)) = path.split_first() else {
            return self;
        };
        let index = match self
            .children
            .iter()
            .position(|(name, value)| name == first && matches!(value, JsonValue::Nested(_)))
        {
            Some(index) => index,
            None => {
                self.children
                    .push(((*first).to_string(), JsonValue::Nested(Self::default())));
                self.children.len() - 1
            }
        };
        match &mut self.children[index].1 {
            JsonValue::Nested(node) => node.nested(rest),
            JsonValue::Value(_) => unreachable!("position() only matches nested nodes"),
        }
    }

    fn append(&self, sql: &mut String, path: &str) {
        sql.push_str("||jsonb_build_object");
        let mut separator = '(';
        for (name, value) in &self.children {
            sql.push(separator);
            sql.push_str(&format!("'{name}',"));
            match value {
                JsonValue::Value(expression) => sql.push_str(expression),
                JsonValue::Nested(node) => {
                    let sub_path = format!("{path}->'{name}'");
                    sql.push_str(&format!("coalesce({sub_path},'{{}}')"));
                    node.append(sql, &sub_path);
                }
            }
            separator = ',';
        }
        sql.push(')');
    }
}

/// `xmltable` arguments selecting `fragment` below the document read by
/// `parent`. A parent that is itself an extraction is folded into one
/// path.
fn xml_extract_arguments(parent: &str, fragment: &str) -> String {
    let nested = |start: &str, separator: &str, end: &str, skip: usize| {
        let inner = parent.strip_prefix(start)?.strip_suffix(end)?;
        let index = inner.find(separator)?;
        Some(format!(
            "{}/{fragment}{}",
            &inner[..index],
            &inner[index + skip..]
        ))
    };
    nested(XML_EXTRACT_START, XML_EXTRACT_SEPARATOR, XML_EXTRACT_END, 2)
        .or_else(|| nested(XML_QUERY_START, XML_QUERY_SEPARATOR, XML_QUERY_END, 0))
        .unwrap_or_else(|| format!("'/{XML_ROOT_TAG}/{fragment}' passing {parent}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(kind: AggregateKind, component: &AggregateComponent<'_>) -> String {
        GaussDbAggregateSupport::INSTANCE
            .component_read_expression("?", "?", "t.data", kind, component)
            .unwrap()
    }

    #[test]
    fn test_json_read_expressions() {
        let number = AggregateComponent::new("amount", SqlTypeCode::Integer, "integer");
        assert_eq!(
            read(AggregateKind::Json, &number),
            "cast(t.data->>'amount' as integer)"
        );
        let nested = AggregateComponent::new("address", SqlTypeCode::Json, "jsonb");
        assert_eq!(read(AggregateKind::Json, &nested), "t.data->'address'");
        let bytes = AggregateComponent::new("hash", SqlTypeCode::Varbinary, "bytea");
        assert_eq!(
            read(AggregateKind::Json, &bytes),
            "decode(t.data->>'hash','hex')"
        );
    }

    #[test]
    fn test_xml_read_expressions() {
        let name = AggregateComponent::new("name", SqlTypeCode::Varchar, "varchar(255)");
        assert_eq!(
            read(AggregateKind::Xml, &name),
            "(select t.v from xmltable('/e/name' passing t.data columns v varchar(255) path '.') t)"
        );
        let address = AggregateComponent::new("address", SqlTypeCode::Sqlxml, "xml");
        let parent = read(AggregateKind::Xml, &address);
        assert_eq!(
            parent,
            "xmlelement(name \"e\",(select xmlagg(t.v) from xmltable('/e/address/*' passing t.data columns v xml path '.')t))"
        );
        let city = AggregateComponent::new("city", SqlTypeCode::Varchar, "varchar(255)");
        assert_eq!(
            GaussDbAggregateSupport::INSTANCE
                .component_read_expression("?", "?", &parent, AggregateKind::Xml, &city)
                .unwrap(),
            "(select t.v from xmltable('/e/address/city' passing t.data columns v varchar(255) path '.') t)"
        );
    }

    #[test]
    fn test_struct_components() {
        let support = GaussDbAggregateSupport::INSTANCE;
        let city = AggregateComponent::new("city", SqlTypeCode::Varchar, "varchar(255)");
        assert_eq!(read(AggregateKind::Struct, &city), "(t.data).city");
        assert_eq!(
            support.component_assignment_expression("data", "city", AggregateKind::Struct),
            "data.city"
        );
        assert_eq!(
            support.component_assignment_expression("data", "city", AggregateKind::Json),
            "data"
        );
        assert!(!support.prefers_select_aggregate_mapping(AggregateKind::Struct));
        assert!(support.requires_custom_write_renderer(AggregateKind::Xml));
        assert!(support
            .component_read_expression("x", "?", "t.data", AggregateKind::Struct, &city)
            .is_err());
    }

    #[test]
    fn test_json_update_expression() {
        let updates = [
            ComponentUpdate {
                path: vec!["name"],
                code: SqlTypeCode::Varchar,
                write_expression: "?",
            },
            ComponentUpdate {
                path: vec!["address", "city"],
                code: SqlTypeCode::Varchar,
                write_expression: "?",
            },
            ComponentUpdate {
                path: vec!["hash"],
                code: SqlTypeCode::Binary,
                write_expression: "?",
            },
        ];
        let sql = GaussDbAggregateSupport::INSTANCE
            .json_update_expression("data", Some("t"), true, &updates)
            .unwrap();
        assert_eq!(
            sql,
            "coalesce(t.data,'{}')||jsonb_build_object('name',to_jsonb(?),'address',coalesce(t.data->'address','{}')||jsonb_build_object('city',to_jsonb(?)),'hash',to_jsonb(encode(?,'hex')))"
        );
        let bad = [ComponentUpdate {
            path: vec!["name"],
            code: SqlTypeCode::Varchar,
            write_expression: "upper(name)",
        }];
        assert!(GaussDbAggregateSupport::INSTANCE
            .json_update_expression("data", None, false, &bad)
            .is_err());
    }
}
