//! CSV export endpoints
//!
//! Rows are pulled from a database cursor and written to the response body
//! as they arrive. A database error mid-stream aborts the body, so the client
//! sees a failed download instead of a silently truncated file.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use chrono::DateTime;
use futures::StreamExt;

use crate::api::extractors::ValidatedQuery;
use crate::api::routes::users::log_diagnostics;
use crate::core::config::ExportConfig;
use crate::core::constants::{EXPORT_REPORT_FILENAME, EXPORT_USERS_FILENAME};
use crate::data::TransactionalService;
use crate::data::filters::FilterCompiler;
use crate::data::filters::columns::USER_SCHEMA;
use crate::data::types::{ExportUsersParams, UserExportRow};
use crate::utils::csv::csv_row;

use super::users::types::ExportUsersQuery;

/// Which export file is being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportKind {
    Users,
    /// Adds a `Posts` column with the user's post titles
    Report,
}

impl ExportKind {
    fn with_posts(self) -> bool {
        self == Self::Report
    }

    fn filename(self) -> &'static str {
        match self {
            Self::Users => EXPORT_USERS_FILENAME,
            Self::Report => EXPORT_REPORT_FILENAME,
        }
    }

    fn header(self) -> &'static [&'static str] {
        match self {
            Self::Users => &["ID", "Name", "Email", "Email Verified At", "Registered On"],
            Self::Report => &[
                "ID",
                "Name",
                "Email",
                "Email Verified At",
                "Registered On",
                "Posts",
            ],
        }
    }

    fn content_disposition(self) -> HeaderValue {
        HeaderValue::try_from(format!("attachment; filename=\"{}\"", self.filename()))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
    }
}

/// Shared state for export endpoints
#[derive(Clone)]
pub struct ExportApiState {
    pub database: Arc<TransactionalService>,
    pub config: ExportConfig,
}

/// Build export routes
pub fn routes(database: Arc<TransactionalService>, config: ExportConfig) -> Router<()> {
    let state = ExportApiState { database, config };

    Router::new()
        .route("/export-users-excel", get(export_users))
        .route("/export-users-report", get(export_users_report))
        .with_state(state)
}

/// Export timestamps as `YYYY-MM-DD HH:MM:SS` (UTC); absent values stay empty
fn format_timestamp(ts: Option<i64>) -> String {
    ts.and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn render_row(row: UserExportRow, with_posts: bool) -> String {
    let mut cells = vec![
        row.id.to_string(),
        row.name,
        row.email,
        format_timestamp(row.email_verified_at),
        format_timestamp(Some(row.created_at)),
    ];
    if with_posts {
        cells.push(row.posts.unwrap_or_default());
    }
    csv_row(cells)
}

fn stream_export(state: &ExportApiState, filter: Option<&str>, kind: ExportKind) -> Response {
    let predicate = FilterCompiler::new(&USER_SCHEMA)
        .with_alias("u")
        .compile_json(filter);
    log_diagnostics(&predicate.diagnostics);

    let with_posts = kind.with_posts();
    let mut rows = state.database.repository().export_users(ExportUsersParams {
        predicate,
        max_rows: state.config.max_rows,
        with_posts,
    });
    let header_line = csv_row(kind.header());

    let body = async_stream::stream! {
        yield Ok::<Bytes, std::io::Error>(Bytes::from(header_line));

        let mut written: u64 = 0;
        while let Some(item) = rows.next().await {
            match item {
                Ok(row) => {
                    written += 1;
                    yield Ok(Bytes::from(render_row(row, with_posts)));
                }
                Err(e) => {
                    tracing::error!(error = %e, rows = written, "Export aborted");
                    yield Err(std::io::Error::other(e.to_string()));
                    return;
                }
            }
        }
        tracing::debug!(rows = written, file = kind.filename(), "Export finished");
    };

    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, kind.content_disposition()),
        ],
        Body::from_stream(body),
    )
        .into_response()
}

/// Download users as CSV
#[utoipa::path(
    get,
    path = "/api/export-users-excel",
    tag = "export",
    params(ExportUsersQuery),
    responses(
        (status = 200, description = "CSV attachment (users.csv)", content_type = "text/csv")
    )
)]
pub async fn export_users(
    State(state): State<ExportApiState>,
    ValidatedQuery(query): ValidatedQuery<ExportUsersQuery>,
) -> Response {
    stream_export(&state, query.filter.as_deref(), ExportKind::Users)
}

/// Download users with their post titles as CSV
#[utoipa::path(
    get,
    path = "/api/export-users-report",
    tag = "export",
    params(ExportUsersQuery),
    responses(
        (status = 200, description = "CSV attachment (users-report.csv)", content_type = "text/csv")
    )
)]
pub async fn export_users_report(
    State(state): State<ExportApiState>,
    ValidatedQuery(query): ValidatedQuery<ExportUsersQuery>,
) -> Response {
    stream_export(&state, query.filter.as_deref(), ExportKind::Report)
}
