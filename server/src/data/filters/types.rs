//! Filter type definitions
//!
//! Defines the filter expression tree sent by the data grid, the operators it
//! may use, and the predicate the compiler produces from it.

use serde::Serialize;
use sqlx::Arguments;
use sqlx::sqlite::SqliteArguments;
use thiserror::Error;
use utoipa::ToSchema;

/// SQL fragment that matches no rows
pub const UNSATISFIABLE: &str = "1 = 0";

/// SQL fragment that matches every row
pub const IDENTITY: &str = "1 = 1";

/// Filter expression tree
///
/// External form is a 3-element JSON array: `[field, operator, value]` for a
/// leaf, `[left, "and" | "or", right]` for a logic node.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Leaf(Leaf),
    And(Box<FilterNode>, Box<FilterNode>),
    Or(Box<FilterNode>, Box<FilterNode>),
}

impl FilterNode {
    pub fn leaf(field: impl Into<String>, operator: Operator, value: FilterValue) -> Self {
        Self::Leaf(Leaf {
            field: field.into(),
            operator,
            value,
        })
    }

    pub fn and(left: FilterNode, right: FilterNode) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: FilterNode, right: FilterNode) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }
}

/// Single field comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub field: String,
    pub operator: Operator,
    pub value: FilterValue,
}

/// Logical connective of a logic node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

impl LogicOp {
    /// Case-insensitive match on `and` / `or`
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Between,
    NotBetween,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Token the grid sent that we do not understand (kept for diagnostics)
    Unknown(String),
}

impl Operator {
    /// Case-insensitive match on the grid's operator token
    pub fn parse(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "=" => Self::Eq,
            "<>" | "!=" => Self::Ne,
            "contains" => Self::Contains,
            "notcontains" => Self::NotContains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "between" => Self::Between,
            "notbetween" => Self::NotBetween,
            ">" => Self::Gt,
            ">=" => Self::Gte,
            "<" => Self::Lt,
            "<=" => Self::Lte,
            _ => Self::Unknown(token.to_string()),
        }
    }

    /// Substring/prefix/suffix operators (string columns only)
    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            Self::Contains | Self::NotContains | Self::StartsWith | Self::EndsWith
        )
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Self::Between | Self::NotBetween)
    }

    /// SQL comparison operator for the scalar comparison operators
    pub fn comparison_sql(&self) -> Option<&'static str> {
        match self {
            Self::Eq => Some("="),
            Self::Ne => Some("<>"),
            Self::Gt => Some(">"),
            Self::Gte => Some(">="),
            Self::Lt => Some("<"),
            Self::Lte => Some("<="),
            _ => None,
        }
    }
}

/// Scalar value from the filter JSON
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Scalar {
    /// Text rendering used by pattern operators (`contains` on a number matches its digits)
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            Self::Integer(i) => Some(i.to_string()),
            Self::Real(f) => Some(f.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }

    pub fn to_sql_value(&self) -> SqlValue {
        match self {
            Self::Null => SqlValue::Null,
            Self::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Self::Integer(i) => SqlValue::Integer(*i),
            Self::Real(f) => SqlValue::Real(*f),
            Self::Text(s) => SqlValue::Text(s.clone()),
        }
    }
}

/// Leaf value: a scalar, or a list for `between` / `notbetween`
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl FilterValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Text(s.into()))
    }

    pub fn integer(i: i64) -> Self {
        Self::Scalar(Scalar::Integer(i))
    }
}

/// Value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Clone, Default)]
pub struct SqlParams {
    pub values: Vec<SqlValue>,
}

impl SqlParams {
    pub fn push(&mut self, value: SqlValue) {
        self.values.push(value);
    }

    /// Build sqlx arguments in placeholder order
    pub fn to_arguments(&self) -> Result<SqliteArguments<'_>, sqlx::Error> {
        let mut args = SqliteArguments::default();
        for value in &self.values {
            let added = match value {
                SqlValue::Null => args.add(Option::<i64>::None),
                SqlValue::Integer(i) => args.add(*i),
                SqlValue::Real(f) => args.add(*f),
                SqlValue::Text(s) => args.add(s.as_str()),
            };
            added.map_err(sqlx::Error::Encode)?;
        }
        Ok(args)
    }
}

/// Why part of a filter was ignored or forced empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MalformedFilter,
    UnknownColumn,
    UnknownOperator,
    UnsupportedOperator,
    InvalidDate,
    InvalidValue,
}

/// Structured note attached to a compiled predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FilterDiagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl FilterDiagnostic {
    pub fn new(kind: DiagnosticKind, field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.map(String::from),
            message: message.into(),
        }
    }
}

/// Compiled WHERE predicate: conjoined clauses, their parameters, and diagnostics
#[derive(Debug, Clone, Default)]
pub struct Predicate {
    clauses: Vec<String>,
    pub params: SqlParams,
    pub diagnostics: Vec<FilterDiagnostic>,
}

impl Predicate {
    /// Predicate matching every row
    pub fn identity() -> Self {
        Self::default()
    }

    /// Predicate matching no rows, with the reason recorded
    pub fn unsatisfiable(diagnostic: FilterDiagnostic) -> Self {
        Self {
            clauses: vec![UNSATISFIABLE.to_string()],
            params: SqlParams::default(),
            diagnostics: vec![diagnostic],
        }
    }

    pub fn push_clause(&mut self, clause: String) {
        self.clauses.push(clause);
    }

    pub fn diagnose(&mut self, diagnostic: FilterDiagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// WHERE clause body (without the keyword)
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            IDENTITY.to_string()
        } else {
            self.clauses.join(" AND ")
        }
    }
}

/// Filter JSON that could not be parsed into a [`FilterNode`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedFilterError {
    #[error("filter exceeds maximum size of {max} bytes")]
    TooLarge { max: usize },

    #[error("filter is not valid JSON: {0}")]
    Json(String),

    #[error("filter node must be a JSON array")]
    NotAnArray,

    #[error("filter node must have 3 elements, found {0}")]
    Arity(usize),

    #[error("filter field must be a string")]
    FieldNotString,

    #[error("filter operator must be a string")]
    OperatorNotString,

    #[error("unsupported filter value: {0}")]
    InvalidValue(String),

    #[error("filter nesting exceeds maximum depth of {0}")]
    TooDeep(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_parse_is_case_insensitive() {
        assert_eq!(Operator::parse("Contains"), Operator::Contains);
        assert_eq!(Operator::parse("NOTBETWEEN"), Operator::NotBetween);
        assert_eq!(Operator::parse("!="), Operator::Ne);
        assert_eq!(Operator::parse("<>"), Operator::Ne);
        assert_eq!(
            Operator::parse("like"),
            Operator::Unknown("like".to_string())
        );
    }

    #[test]
    fn logic_op_parse() {
        assert_eq!(LogicOp::parse("and"), Some(LogicOp::And));
        assert_eq!(LogicOp::parse("Or"), Some(LogicOp::Or));
        assert_eq!(LogicOp::parse("="), None);
    }

    #[test]
    fn identity_predicate_where_clause() {
        let predicate = Predicate::identity();
        assert_eq!(predicate.where_clause(), "1 = 1");
        assert!(predicate.params.values.is_empty());
    }

    #[test]
    fn unsatisfiable_predicate_keeps_diagnostic() {
        let predicate = Predicate::unsatisfiable(FilterDiagnostic::new(
            DiagnosticKind::MalformedFilter,
            None,
            "bad",
        ));
        assert_eq!(predicate.where_clause(), "1 = 0");
        assert_eq!(predicate.diagnostics.len(), 1);
    }

    #[test]
    fn clauses_are_conjoined() {
        let mut predicate = Predicate::identity();
        predicate.push_clause("a = ?".to_string());
        predicate.push_clause("(b = ? OR c = ?)".to_string());
        assert_eq!(predicate.where_clause(), "a = ? AND (b = ? OR c = ?)");
    }

    #[test]
    fn scalar_bool_binds_as_integer() {
        assert_eq!(Scalar::Bool(true).to_sql_value(), SqlValue::Integer(1));
        assert_eq!(Scalar::Null.as_text(), None);
    }

    #[test]
    fn diagnostic_serializes_without_missing_field() {
        let diag = FilterDiagnostic::new(DiagnosticKind::MalformedFilter, None, "oops");
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "malformed_filter");
        assert!(json.get("field").is_none());
    }
}
