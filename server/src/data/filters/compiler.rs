//! Filter compiler
//!
//! Walks a [`FilterNode`] tree and emits a parameterized SQLite predicate.
//! Bad input never widens the result: an unknown column, an unparseable date
//! or an ill-shaped value compiles to `1 = 0`; only an unknown operator drops
//! its leaf. Every such decision is recorded as a diagnostic.

use crate::utils::sql::{LikeAnchor, like_pattern};

use super::dates::{parse_date, to_sql_day};
use super::parser::parse_filter;
use super::types::{
    DiagnosticKind, FilterDiagnostic, FilterNode, FilterValue, Leaf, LogicOp, Operator,
    Predicate, Scalar, SqlValue, UNSATISFIABLE,
};

/// Column whitelists for filterable entities
pub mod columns {
    use super::FilterSchema;

    pub const USER_FILTERABLE: &[&str] = &[
        "id",
        "name",
        "email",
        "email_verified_at",
        "created_at",
        "updated_at",
    ];

    pub const USER_SORTABLE: &[&str] = USER_FILTERABLE;

    /// Unix-second columns compared by calendar day
    pub const USER_DATE_FIELDS: &[&str] = &["email_verified_at", "created_at", "updated_at"];

    pub const USER_SCHEMA: FilterSchema = FilterSchema {
        filterable: USER_FILTERABLE,
        date_fields: USER_DATE_FIELDS,
    };
}

/// Which columns a filter may reference, and which of those hold dates
#[derive(Debug, Clone, Copy)]
pub struct FilterSchema {
    pub filterable: &'static [&'static str],
    pub date_fields: &'static [&'static str],
}

impl FilterSchema {
    fn is_filterable(&self, field: &str) -> bool {
        self.filterable.contains(&field)
    }

    fn is_date(&self, field: &str) -> bool {
        self.date_fields.contains(&field)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FilterCompiler<'a> {
    schema: &'a FilterSchema,
    alias: &'a str,
}

impl<'a> FilterCompiler<'a> {
    pub fn new(schema: &'a FilterSchema) -> Self {
        Self { schema, alias: "" }
    }

    /// Prefix every column with a table alias (e.g. "u" → "u.name")
    pub fn with_alias(mut self, alias: &'a str) -> Self {
        self.alias = alias;
        self
    }

    /// Parse and compile the raw `filter` query param
    ///
    /// An absent filter yields the identity predicate; a malformed one yields
    /// an unsatisfiable predicate carrying a `malformed_filter` diagnostic.
    pub fn compile_json(&self, raw: Option<&str>) -> Predicate {
        let Some(raw) = raw else {
            return Predicate::identity();
        };
        match parse_filter(raw) {
            Ok(Some(node)) => self.compile(&node, Predicate::identity()),
            Ok(None) => Predicate::identity(),
            Err(e) => Predicate::unsatisfiable(FilterDiagnostic::new(
                DiagnosticKind::MalformedFilter,
                None,
                e.to_string(),
            )),
        }
    }

    /// AND the compiled node into `target`
    pub fn compile(&self, node: &FilterNode, mut target: Predicate) -> Predicate {
        if let Some(clause) = self.compile_node(node, &mut target) {
            target.push_clause(clause);
        }
        target
    }

    /// Returns `None` when the node is a no-op
    fn compile_node(&self, node: &FilterNode, out: &mut Predicate) -> Option<String> {
        match node {
            FilterNode::Leaf(leaf) => self.compile_leaf(leaf, out),
            FilterNode::And(left, right) => {
                let left = self.compile_node(left, out);
                let right = self.compile_node(right, out);
                group(LogicOp::And, left, right)
            }
            FilterNode::Or(left, right) => {
                let left = self.compile_node(left, out);
                let right = self.compile_node(right, out);
                group(LogicOp::Or, left, right)
            }
        }
    }

    fn compile_leaf(&self, leaf: &Leaf, out: &mut Predicate) -> Option<String> {
        let field = leaf.field.as_str();

        if !self.schema.is_filterable(field) {
            return unsatisfiable(
                out,
                DiagnosticKind::UnknownColumn,
                field,
                format!("unknown column '{field}'"),
            );
        }

        if let Operator::Unknown(token) = &leaf.operator {
            out.diagnose(FilterDiagnostic::new(
                DiagnosticKind::UnknownOperator,
                Some(field),
                format!("unknown operator '{token}', condition ignored"),
            ));
            return None;
        }

        let col = self.column(field);
        if self.schema.is_date(field) {
            self.compile_date_leaf(leaf, &col, out)
        } else {
            self.compile_value_leaf(leaf, &col, out)
        }
    }

    fn compile_date_leaf(&self, leaf: &Leaf, col: &str, out: &mut Predicate) -> Option<String> {
        let field = leaf.field.as_str();
        let day_expr = format!("date({col}, 'unixepoch')");

        if leaf.operator.is_pattern() {
            return unsatisfiable(
                out,
                DiagnosticKind::UnsupportedOperator,
                field,
                format!("operator {:?} is not supported on date column", leaf.operator),
            );
        }

        if leaf.operator.is_range() {
            let FilterValue::List(items) = &leaf.value else {
                return unsatisfiable(
                    out,
                    DiagnosticKind::InvalidValue,
                    field,
                    "range operator requires a [from, to] pair",
                );
            };
            let days: Vec<String> = items
                .iter()
                .filter_map(Scalar::as_text)
                .filter_map(|s| parse_date(&s))
                .map(to_sql_day)
                .collect();
            let [lo, hi, ..] = days.as_slice() else {
                return unsatisfiable(
                    out,
                    DiagnosticKind::InvalidDate,
                    field,
                    "date range needs two valid dates",
                );
            };
            out.params.push(SqlValue::Text(lo.clone()));
            out.params.push(SqlValue::Text(hi.clone()));
            return Some(if leaf.operator == Operator::Between {
                format!("{day_expr} BETWEEN ? AND ?")
            } else {
                format!("({day_expr} < ? OR {day_expr} > ?)")
            });
        }

        let sql_op = leaf.operator.comparison_sql()?;
        match &leaf.value {
            FilterValue::Scalar(Scalar::Null) => null_check(&leaf.operator, col, field, out),
            FilterValue::Scalar(value) => {
                let Some(day) = value.as_text().and_then(|s| parse_date(&s)) else {
                    return unsatisfiable(
                        out,
                        DiagnosticKind::InvalidDate,
                        field,
                        format!("invalid date value {}", describe(value)),
                    );
                };
                out.params.push(SqlValue::Text(to_sql_day(day)));
                Some(format!("{day_expr} {sql_op} ?"))
            }
            FilterValue::List(_) => unsatisfiable(
                out,
                DiagnosticKind::InvalidValue,
                field,
                "comparison operator requires a single value",
            ),
        }
    }

    fn compile_value_leaf(&self, leaf: &Leaf, col: &str, out: &mut Predicate) -> Option<String> {
        let field = leaf.field.as_str();

        if leaf.operator.is_pattern() {
            let Some(text) = scalar_text(&leaf.value) else {
                return unsatisfiable(
                    out,
                    DiagnosticKind::InvalidValue,
                    field,
                    "string operator requires a non-null value",
                );
            };
            let (anchor, keyword) = match leaf.operator {
                Operator::Contains => (LikeAnchor::Anywhere, "LIKE"),
                Operator::NotContains => (LikeAnchor::Anywhere, "NOT LIKE"),
                Operator::StartsWith => (LikeAnchor::Start, "LIKE"),
                _ => (LikeAnchor::End, "LIKE"),
            };
            out.params.push(SqlValue::Text(like_pattern(&text, anchor)));
            return Some(format!("{col} {keyword} ? ESCAPE '\\'"));
        }

        if leaf.operator.is_range() {
            let bounds = match &leaf.value {
                FilterValue::List(items) if items.len() == 2 && !items.contains(&Scalar::Null) => {
                    items
                }
                _ => {
                    return unsatisfiable(
                        out,
                        DiagnosticKind::InvalidValue,
                        field,
                        "range operator requires exactly two non-null values",
                    );
                }
            };
            for bound in bounds {
                out.params.push(bound.to_sql_value());
            }
            return Some(if leaf.operator == Operator::Between {
                format!("{col} BETWEEN ? AND ?")
            } else {
                format!("NOT ({col} BETWEEN ? AND ?)")
            });
        }

        let sql_op = leaf.operator.comparison_sql()?;
        match &leaf.value {
            FilterValue::Scalar(Scalar::Null) => null_check(&leaf.operator, col, field, out),
            FilterValue::Scalar(value) => {
                out.params.push(value.to_sql_value());
                Some(format!("{col} {sql_op} ?"))
            }
            FilterValue::List(_) => unsatisfiable(
                out,
                DiagnosticKind::InvalidValue,
                field,
                "comparison operator requires a single value",
            ),
        }
    }

    fn column(&self, field: &str) -> String {
        if self.alias.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.alias, field)
        }
    }
}

/// Combine two compiled sides; a no-op side drops out of the group
fn group(op: LogicOp, left: Option<String>, right: Option<String>) -> Option<String> {
    match (left, right) {
        (Some(l), Some(r)) => Some(match op {
            LogicOp::And => format!("({l} AND {r})"),
            LogicOp::Or => format!("(({l}) OR ({r}))"),
        }),
        (Some(side), None) | (None, Some(side)) => Some(side),
        (None, None) => None,
    }
}

fn null_check(op: &Operator, col: &str, field: &str, out: &mut Predicate) -> Option<String> {
    match op {
        Operator::Eq => Some(format!("{col} IS NULL")),
        Operator::Ne => Some(format!("{col} IS NOT NULL")),
        _ => unsatisfiable(
            out,
            DiagnosticKind::InvalidValue,
            field,
            "null can only be compared with = or <>",
        ),
    }
}

fn unsatisfiable(
    out: &mut Predicate,
    kind: DiagnosticKind,
    field: &str,
    message: impl Into<String>,
) -> Option<String> {
    out.diagnose(FilterDiagnostic::new(kind, Some(field), message));
    Some(UNSATISFIABLE.to_string())
}

fn scalar_text(value: &FilterValue) -> Option<String> {
    match value {
        FilterValue::Scalar(scalar) => scalar.as_text(),
        FilterValue::List(_) => None,
    }
}

fn describe(value: &Scalar) -> String {
    match value.as_text() {
        Some(text) => format!("'{text}'"),
        None => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::columns::USER_SCHEMA;
    use super::*;

    fn compile(json: &str) -> Predicate {
        FilterCompiler::new(&USER_SCHEMA).compile_json(Some(json))
    }

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.to_string())
    }

    #[test]
    fn absent_filter_is_identity() {
        let compiler = FilterCompiler::new(&USER_SCHEMA);
        assert_eq!(compiler.compile_json(None).where_clause(), "1 = 1");
        assert_eq!(compiler.compile_json(Some("[]")).where_clause(), "1 = 1");
        assert_eq!(compiler.compile_json(Some("")).where_clause(), "1 = 1");
    }

    #[test]
    fn malformed_filter_is_unsatisfiable() {
        let predicate = compile(r#"["name", "="]"#);
        assert_eq!(predicate.where_clause(), "1 = 0");
        assert_eq!(predicate.diagnostics.len(), 1);
        assert_eq!(predicate.diagnostics[0].kind, DiagnosticKind::MalformedFilter);

        let predicate = compile("{not json");
        assert_eq!(predicate.where_clause(), "1 = 0");
    }

    #[test]
    fn equality_leaf() {
        let predicate = compile(r#"["email", "=", "a@b.io"]"#);
        assert_eq!(predicate.where_clause(), "email = ?");
        assert_eq!(predicate.params.values, vec![text("a@b.io")]);
        assert!(predicate.diagnostics.is_empty());
    }

    #[test]
    fn comparison_operators() {
        for (op, sql) in [
            ("<>", "<>"),
            ("!=", "<>"),
            (">", ">"),
            (">=", ">="),
            ("<", "<"),
            ("<=", "<="),
        ] {
            let predicate = compile(&format!(r#"["id", "{op}", 7]"#));
            assert_eq!(predicate.where_clause(), format!("id {sql} ?"));
            assert_eq!(predicate.params.values, vec![SqlValue::Integer(7)]);
        }
    }

    #[test]
    fn pattern_operators_escape_wildcards() {
        let predicate = compile(r#"["name", "contains", "50%_off"]"#);
        assert_eq!(predicate.where_clause(), "name LIKE ? ESCAPE '\\'");
        assert_eq!(predicate.params.values, vec![text("%50\\%\\_off%")]);

        let predicate = compile(r#"["name", "notcontains", "x"]"#);
        assert_eq!(predicate.where_clause(), "name NOT LIKE ? ESCAPE '\\'");
        assert_eq!(predicate.params.values, vec![text("%x%")]);

        let predicate = compile(r#"["email", "StartsWith", "adm"]"#);
        assert_eq!(predicate.params.values, vec![text("adm%")]);

        let predicate = compile(r#"["email", "endswith", "@x.io"]"#);
        assert_eq!(predicate.params.values, vec![text("%@x.io")]);
    }

    #[test]
    fn null_comparisons() {
        let predicate = compile(r#"["email_verified_at", "=", null]"#);
        assert_eq!(predicate.where_clause(), "email_verified_at IS NULL");
        assert!(predicate.params.values.is_empty());

        let predicate = compile(r#"["name", "<>", null]"#);
        assert_eq!(predicate.where_clause(), "name IS NOT NULL");

        let predicate = compile(r#"["id", ">", null]"#);
        assert_eq!(predicate.where_clause(), "1 = 0");
    }

    #[test]
    fn value_between_and_notbetween() {
        let predicate = compile(r#"["id", "between", [3, 9]]"#);
        assert_eq!(predicate.where_clause(), "id BETWEEN ? AND ?");
        assert_eq!(
            predicate.params.values,
            vec![SqlValue::Integer(3), SqlValue::Integer(9)]
        );

        let predicate = compile(r#"["id", "notbetween", [3, 9]]"#);
        assert_eq!(predicate.where_clause(), "NOT (id BETWEEN ? AND ?)");
    }

    #[test]
    fn value_between_with_bad_shape_is_unsatisfiable() {
        for json in [
            r#"["id", "between", [3]]"#,
            r#"["id", "between", [3, null]]"#,
            r#"["id", "between", 3]"#,
        ] {
            let predicate = compile(json);
            assert_eq!(predicate.where_clause(), "1 = 0", "{json}");
            assert!(predicate.params.values.is_empty());
            assert_eq!(predicate.diagnostics[0].kind, DiagnosticKind::InvalidValue);
        }
    }

    #[test]
    fn date_equality_compares_calendar_day() {
        let predicate = compile(r#"["created_at", "=", "2024-03-05T18:45:00Z"]"#);
        assert_eq!(predicate.where_clause(), "date(created_at, 'unixepoch') = ?");
        assert_eq!(predicate.params.values, vec![text("2024-03-05")]);
    }

    #[test]
    fn date_day_month_year_fallback() {
        let predicate = compile(r#"["updated_at", ">=", "05-03-2024"]"#);
        assert_eq!(predicate.where_clause(), "date(updated_at, 'unixepoch') >= ?");
        assert_eq!(predicate.params.values, vec![text("2024-03-05")]);
    }

    #[test]
    fn invalid_date_is_unsatisfiable() {
        let predicate = compile(r#"["created_at", "=", "not-a-date"]"#);
        assert_eq!(predicate.where_clause(), "1 = 0");
        assert!(predicate.params.values.is_empty());
        assert_eq!(predicate.diagnostics[0].kind, DiagnosticKind::InvalidDate);
        assert_eq!(predicate.diagnostics[0].field.as_deref(), Some("created_at"));
    }

    #[test]
    fn date_between() {
        let predicate = compile(r#"["created_at", "between", ["2024-01-01", "2024-01-31"]]"#);
        assert_eq!(
            predicate.where_clause(),
            "date(created_at, 'unixepoch') BETWEEN ? AND ?"
        );
        assert_eq!(
            predicate.params.values,
            vec![text("2024-01-01"), text("2024-01-31")]
        );
    }

    #[test]
    fn date_notbetween_is_grouped() {
        let predicate = compile(r#"["created_at", "notbetween", ["2024-01-01", "2024-01-31"]]"#);
        assert_eq!(
            predicate.where_clause(),
            "(date(created_at, 'unixepoch') < ? OR date(created_at, 'unixepoch') > ?)"
        );
    }

    #[test]
    fn date_range_with_one_invalid_entry_is_unsatisfiable() {
        let predicate = compile(r#"["created_at", "between", ["2024-01-01", "garbage"]]"#);
        assert_eq!(predicate.where_clause(), "1 = 0");
        assert!(predicate.params.values.is_empty());
        assert_eq!(predicate.diagnostics[0].kind, DiagnosticKind::InvalidDate);
    }

    #[test]
    fn date_range_drops_invalid_entries() {
        let predicate = compile(
            r#"["created_at", "between", ["bad", "2024-01-01", "2024-02-01"]]"#,
        );
        assert_eq!(
            predicate.params.values,
            vec![text("2024-01-01"), text("2024-02-01")]
        );
    }

    #[test]
    fn pattern_operator_on_date_is_unsatisfiable() {
        let predicate = compile(r#"["created_at", "contains", "2024"]"#);
        assert_eq!(predicate.where_clause(), "1 = 0");
        assert_eq!(
            predicate.diagnostics[0].kind,
            DiagnosticKind::UnsupportedOperator
        );
    }

    #[test]
    fn unknown_column_is_unsatisfiable() {
        let predicate = compile(r#"["password", "=", "x"]"#);
        assert_eq!(predicate.where_clause(), "1 = 0");
        assert_eq!(predicate.diagnostics[0].kind, DiagnosticKind::UnknownColumn);
    }

    #[test]
    fn unknown_operator_is_noop() {
        let predicate = compile(r#"["name", "like", "x"]"#);
        assert_eq!(predicate.where_clause(), "1 = 1");
        assert_eq!(predicate.diagnostics[0].kind, DiagnosticKind::UnknownOperator);
    }

    #[test]
    fn unknown_operator_drops_out_of_group() {
        let predicate = compile(r#"[["name", "like", "x"], "or", ["id", "=", 2]]"#);
        assert_eq!(predicate.where_clause(), "id = ?");
        assert_eq!(predicate.params.values, vec![SqlValue::Integer(2)]);
    }

    #[test]
    fn and_or_nesting() {
        let predicate = compile(
            r#"[[["name","=","a"],"and",["email","=","b"]],"or",["id","=",3]]"#,
        );
        assert_eq!(
            predicate.where_clause(),
            "(((name = ? AND email = ?)) OR (id = ?))"
        );
        assert_eq!(
            predicate.params.values,
            vec![text("a"), text("b"), SqlValue::Integer(3)]
        );
    }

    #[test]
    fn or_inside_and_stays_grouped() {
        let predicate = compile(
            r#"[["id",">",1],"and",[["name","=","a"],"or",["name","=","b"]]]"#,
        );
        assert_eq!(
            predicate.where_clause(),
            "(id > ? AND ((name = ?) OR (name = ?)))"
        );
    }

    #[test]
    fn compile_conjoins_with_existing_target() {
        let compiler = FilterCompiler::new(&USER_SCHEMA);
        let mut target = Predicate::identity();
        target.push_clause("id > 0".to_string());
        let node = FilterNode::leaf("name", Operator::Eq, FilterValue::text("a"));
        let predicate = compiler.compile(&node, target);
        assert_eq!(predicate.where_clause(), "id > 0 AND name = ?");
    }

    #[test]
    fn alias_prefixes_columns() {
        let compiler = FilterCompiler::new(&USER_SCHEMA).with_alias("u");
        let predicate = compiler.compile_json(Some(
            r#"[["name","contains","a"],"and",["created_at","<","2024-01-01"]]"#,
        ));
        assert_eq!(
            predicate.where_clause(),
            "(u.name LIKE ? ESCAPE '\\' AND date(u.created_at, 'unixepoch') < ?)"
        );
    }

    #[test]
    fn list_with_comparison_is_unsatisfiable() {
        let predicate = compile(r#"["id", "=", [1, 2]]"#);
        assert_eq!(predicate.where_clause(), "1 = 0");
    }
}
