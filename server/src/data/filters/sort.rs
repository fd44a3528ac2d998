//! Grid sort specification
//!
//! Parses `[{"selector": "name", "desc": false}, ...]` against a column
//! whitelist and renders the ORDER BY list.

use serde::Deserialize;
use thiserror::Error;

/// Maximum number of sort keys accepted in one request
pub const MAX_SORT_KEYS: usize = 8;

/// Maximum size of sort JSON in bytes
pub const MAX_SORT_JSON_SIZE: usize = 4 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One validated sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: &'static str,
    pub direction: OrderDirection,
}

impl SortSpec {
    pub fn asc(column: &'static str) -> Self {
        Self {
            column,
            direction: OrderDirection::Asc,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            direction: OrderDirection::Desc,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SortError {
    #[error("The sort parameter must be a JSON array of {{selector, desc}} objects.")]
    Invalid,

    #[error("The sort parameter exceeds {max} bytes.")]
    TooLarge { max: usize },

    #[error("Cannot sort by '{0}'.")]
    UnknownColumn(String),

    #[error("At most {0} sort keys are allowed.")]
    TooManyKeys(usize),
}

#[derive(Deserialize)]
struct RawSortKey {
    selector: String,
    #[serde(default)]
    desc: bool,
}

/// Parse the raw `sort` query param
///
/// Column names are resolved to the whitelist entries so the returned specs
/// only ever carry static, known-safe identifiers.
pub fn parse_sort(raw: &str, allowed: &[&'static str]) -> Result<Vec<SortSpec>, SortError> {
    if raw.len() > MAX_SORT_JSON_SIZE {
        return Err(SortError::TooLarge {
            max: MAX_SORT_JSON_SIZE,
        });
    }

    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        return Ok(Vec::new());
    }

    let keys: Vec<RawSortKey> = serde_json::from_str(raw).map_err(|_| SortError::Invalid)?;
    if keys.len() > MAX_SORT_KEYS {
        return Err(SortError::TooManyKeys(MAX_SORT_KEYS));
    }

    keys.into_iter()
        .map(|key| {
            let column = allowed
                .iter()
                .copied()
                .find(|c| *c == key.selector)
                .ok_or_else(|| SortError::UnknownColumn(key.selector.clone()))?;
            Ok(SortSpec {
                column,
                direction: if key.desc {
                    OrderDirection::Desc
                } else {
                    OrderDirection::Asc
                },
            })
        })
        .collect()
}

/// Render ORDER BY terms (without the keyword)
///
/// `tiebreaker` is appended ascending unless a sort key already names it, which
/// keeps paging stable when sort keys tie.
pub fn order_by_sql(specs: &[SortSpec], alias: &str, tiebreaker: &str) -> String {
    let col = |name: &str| {
        if alias.is_empty() {
            name.to_string()
        } else {
            format!("{alias}.{name}")
        }
    };

    let mut terms: Vec<String> = specs
        .iter()
        .map(|s| format!("{} {}", col(s.column), s.direction.as_sql()))
        .collect();

    if !specs.iter().any(|s| s.column == tiebreaker) {
        terms.push(format!("{} ASC", col(tiebreaker)));
    }

    terms.join(", ")
}
