//! Filter parsing
//!
//! Parses the grid's positional JSON filter into a [`FilterNode`] tree. All
//! shape checks happen here so the compiler only ever sees well-formed nodes.

use serde_json::Value;

use super::types::{FilterNode, FilterValue, Leaf, LogicOp, MalformedFilterError, Operator, Scalar};

/// Maximum size of filter JSON in bytes (64KB)
pub const MAX_FILTER_JSON_SIZE: usize = 64 * 1024;

/// Maximum nesting of logic nodes
pub const MAX_FILTER_DEPTH: usize = 32;

/// Parse a filter from the `filter` query param
///
/// Returns `Ok(None)` for an absent filter (`""`, `null`, `[]`).
pub fn parse_filter(json_str: &str) -> Result<Option<FilterNode>, MalformedFilterError> {
    if json_str.len() > MAX_FILTER_JSON_SIZE {
        return Err(MalformedFilterError::TooLarge {
            max: MAX_FILTER_JSON_SIZE,
        });
    }

    let trimmed = json_str.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| MalformedFilterError::Json(e.to_string()))?;

    match &value {
        Value::Null => Ok(None),
        Value::Array(items) if items.is_empty() => Ok(None),
        _ => parse_node(&value, 0).map(Some),
    }
}

fn parse_node(value: &Value, depth: usize) -> Result<FilterNode, MalformedFilterError> {
    if depth >= MAX_FILTER_DEPTH {
        return Err(MalformedFilterError::TooDeep(MAX_FILTER_DEPTH));
    }

    let items = value.as_array().ok_or(MalformedFilterError::NotAnArray)?;

    // A logic node is recognised by its middle element alone
    let logic = items
        .get(1)
        .and_then(Value::as_str)
        .and_then(LogicOp::parse);

    let [first, second, third] = items.as_slice() else {
        return Err(MalformedFilterError::Arity(items.len()));
    };

    if let Some(op) = logic {
        let left = parse_node(first, depth + 1)?;
        let right = parse_node(third, depth + 1)?;
        return Ok(match op {
            LogicOp::And => FilterNode::and(left, right),
            LogicOp::Or => FilterNode::or(left, right),
        });
    }

    let field = first
        .as_str()
        .ok_or(MalformedFilterError::FieldNotString)?;
    let operator = second
        .as_str()
        .ok_or(MalformedFilterError::OperatorNotString)?;

    Ok(FilterNode::Leaf(Leaf {
        field: field.to_string(),
        operator: Operator::parse(operator),
        value: parse_value(third)?,
    }))
}

fn parse_value(value: &Value) -> Result<FilterValue, MalformedFilterError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(parse_scalar)
            .collect::<Result<Vec<_>, _>>()
            .map(FilterValue::List),
        other => parse_scalar(other).map(FilterValue::Scalar),
    }
}

fn parse_scalar(value: &Value) -> Result<Scalar, MalformedFilterError> {
    match value {
        Value::Null => Ok(Scalar::Null),
        Value::Bool(b) => Ok(Scalar::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Scalar::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Scalar::Real(f))
            } else {
                Err(MalformedFilterError::InvalidValue(n.to_string()))
            }
        }
        Value::String(s) => Ok(Scalar::Text(s.clone())),
        Value::Array(_) => Err(MalformedFilterError::InvalidValue(
            "nested array".to_string(),
        )),
        Value::Object(_) => Err(MalformedFilterError::InvalidValue("object".to_string())),
    }
}
