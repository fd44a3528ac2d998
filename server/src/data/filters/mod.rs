//! Grid filter and sort compilation
//!
//! Turns the data grid's `filter` and `sort` query params into SQL fragments
//! with bound parameters. Pure and synchronous; the repositories execute the
//! result.

mod compiler;
mod dates;
mod parser;
mod sort;
mod types;

pub use compiler::{FilterCompiler, FilterSchema, columns};
pub use dates::parse_date;
pub use parser::{MAX_FILTER_DEPTH, MAX_FILTER_JSON_SIZE, parse_filter};
pub use sort::{
    MAX_SORT_KEYS, OrderDirection, SortError, SortSpec, order_by_sql, parse_sort,
};
pub use types::{
    DiagnosticKind, FilterDiagnostic, FilterNode, FilterValue, IDENTITY, Leaf, LogicOp,
    MalformedFilterError, Operator, Predicate, Scalar, SqlParams, SqlValue, UNSATISFIABLE,
};
