//! User repository for SQLite operations

use futures::TryStreamExt;
use futures::stream::BoxStream;
use sqlx::{Arguments, SqlitePool};

use crate::data::filters::order_by_sql;
use crate::data::sqlite::SqliteError;
use crate::data::types::{
    ExportUsersParams, ListUsersParams, NewUser, USER_COLUMNS, UserChanges, UserExportRow,
    UserExportTuple, UserRow, UserTuple,
};

/// Message for a duplicate email at the storage layer
pub const EMAIL_TAKEN: &str = "The email has already been taken.";

/// List users matching the predicate, with the filtered total
///
/// The count ignores the page window; `take == 0` skips the page query.
pub async fn list_users(
    pool: &SqlitePool,
    params: &ListUsersParams,
) -> Result<(Vec<UserRow>, u64), SqliteError> {
    let where_clause = params.predicate.where_clause();

    let count_sql = format!("SELECT COUNT(*) FROM users WHERE {}", where_clause);
    let total: i64 = sqlx::query_scalar_with(&count_sql, params.predicate.params.to_arguments()?)
        .fetch_one(pool)
        .await?;

    if params.page.take == 0 {
        return Ok((Vec::new(), total as u64));
    }

    let sql = format!(
        "SELECT {} FROM users WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
        USER_COLUMNS,
        where_clause,
        order_by_sql(&params.sort, "", "id"),
    );

    let mut args = params.predicate.params.to_arguments()?;
    args.add(params.page.take).map_err(sqlx::Error::Encode)?;
    args.add(params.page.skip).map_err(sqlx::Error::Encode)?;

    let rows = sqlx::query_as_with::<_, UserTuple, _>(&sql, args)
        .fetch_all(pool)
        .await?;

    Ok((rows.into_iter().map(UserRow::from).collect(), total as u64))
}

/// Get a user by ID
pub async fn get_user(pool: &SqlitePool, id: i64) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(UserRow::from))
}

/// Get a user by email (ASCII case-insensitive)
pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!(
        "SELECT {} FROM users WHERE email = ?",
        USER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(UserRow::from))
}

/// Insert a user; a duplicate email becomes [`SqliteError::Conflict`]
pub async fn create_user(pool: &SqlitePool, user: &NewUser) -> Result<UserRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "INSERT INTO users (name, email, email_verified_at, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(user.email_verified_at)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_write(e, EMAIL_TAKEN))?;

    Ok(UserRow {
        id: result.last_insert_rowid(),
        name: user.name.clone(),
        email: user.email.clone(),
        email_verified_at: user.email_verified_at,
        created_at: now,
        updated_at: now,
    })
}

/// Apply a partial update; returns `None` when the user does not exist
pub async fn update_user(
    pool: &SqlitePool,
    id: i64,
    changes: &UserChanges,
) -> Result<Option<UserRow>, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "UPDATE users SET name = COALESCE(?, name), email = COALESCE(?, email), updated_at = ? WHERE id = ?",
    )
    .bind(changes.name.as_deref())
    .bind(changes.email.as_deref())
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| SqliteError::from_write(e, EMAIL_TAKEN))?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_user(pool, id).await
}

/// Delete a user by ID (posts cascade)
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Stream users for export from a forward-only cursor
///
/// Rows are ordered by id and capped at `max_rows`. The predicate must be
/// compiled against the `u` alias.
pub fn export_users(
    pool: SqlitePool,
    params: ExportUsersParams,
) -> BoxStream<'static, Result<UserExportRow, SqliteError>> {
    Box::pin(async_stream::try_stream! {
        let posts_column = if params.with_posts {
            "(SELECT GROUP_CONCAT(p.title, '; ') FROM posts p WHERE p.user_id = u.id)"
        } else {
            "NULL"
        };
        let sql = format!(
            "SELECT u.id, u.name, u.email, u.email_verified_at, u.created_at, {} AS posts \
             FROM users u WHERE {} ORDER BY u.id ASC LIMIT ?",
            posts_column,
            params.predicate.where_clause(),
        );

        let mut args = params.predicate.params.to_arguments()?;
        let limit = i64::try_from(params.max_rows).unwrap_or(i64::MAX);
        args.add(limit).map_err(sqlx::Error::Encode)?;

        let mut rows = sqlx::query_as_with::<_, UserExportTuple, _>(&sql, args).fetch(&pool);
        while let Some(row) = rows.try_next().await? {
            yield UserExportRow::from(row);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filters::{FilterCompiler, SortSpec, columns::USER_SCHEMA};
    use crate::data::sqlite::SqliteService;
    use crate::data::sqlite::repositories::post::{count_for_user, create_post};
    use crate::data::types::PageRequest;

    async fn setup_test_pool() -> SqlitePool {
        SqliteService::in_memory().await.unwrap().pool().clone()
    }

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            email_verified_at: None,
        }
    }

    async fn insert_with_created_at(pool: &SqlitePool, name: &str, email: &str, created_at: i64) {
        sqlx::query(
            "INSERT INTO users (name, email, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(created_at)
        .bind(created_at)
        .execute(pool)
        .await
        .unwrap();
    }

    fn filtered(filter: &str) -> ListUsersParams {
        ListUsersParams {
            predicate: FilterCompiler::new(&USER_SCHEMA).compile_json(Some(filter)),
            sort: Vec::new(),
            page: PageRequest::new(None, Some(100)),
        }
    }

    async fn names(pool: &SqlitePool, params: &ListUsersParams) -> Vec<String> {
        let (rows, _) = list_users(pool, params).await.unwrap();
        rows.into_iter().map(|u| u.name).collect()
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let pool = setup_test_pool().await;
        let user = create_user(&pool, &new_user("Ann", "ann@example.com"))
            .await
            .unwrap();

        assert!(user.id > 0);
        let fetched = get_user(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(fetched, user);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let pool = setup_test_pool().await;
        create_user(&pool, &new_user("Ann", "ann@example.com"))
            .await
            .unwrap();

        let err = create_user(&pool, &new_user("Other", "ANN@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, SqliteError::Conflict(_)));

        let (_, total) = list_users(&pool, &ListUsersParams::default()).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_get_by_email_ignores_case() {
        let pool = setup_test_pool().await;
        create_user(&pool, &new_user("Ann", "ann@example.com"))
            .await
            .unwrap();

        let fetched = get_by_email(&pool, "Ann@Example.com").await.unwrap();
        assert_eq!(fetched.unwrap().name, "Ann");
        assert!(get_by_email(&pool, "nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_user_partial() {
        let pool = setup_test_pool().await;
        let user = create_user(&pool, &new_user("Ann", "ann@example.com"))
            .await
            .unwrap();

        let changes = UserChanges {
            name: Some("Anna".to_string()),
            email: None,
        };
        let updated = update_user(&pool, user.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.name, "Anna");
        assert_eq!(updated.email, "ann@example.com");

        assert!(update_user(&pool, 9999, &changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_to_taken_email_is_conflict() {
        let pool = setup_test_pool().await;
        create_user(&pool, &new_user("Ann", "ann@example.com"))
            .await
            .unwrap();
        let bob = create_user(&pool, &new_user("Bob", "bob@example.com"))
            .await
            .unwrap();

        let changes = UserChanges {
            name: None,
            email: Some("ann@example.com".to_string()),
        };
        let err = update_user(&pool, bob.id, &changes).await.unwrap_err();
        assert!(matches!(err, SqliteError::Conflict(_)));

        let bob = get_user(&pool, bob.id).await.unwrap().unwrap();
        assert_eq!(bob.email, "bob@example.com");
    }

    #[tokio::test]
    async fn test_delete_user_cascades_posts() {
        let pool = setup_test_pool().await;
        let user = create_user(&pool, &new_user("Ann", "ann@example.com"))
            .await
            .unwrap();
        create_post(&pool, user.id, "Hello").await.unwrap();

        assert!(delete_user(&pool, user.id).await.unwrap());
        assert!(get_user(&pool, user.id).await.unwrap().is_none());

        assert_eq!(count_for_user(&pool, user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_missing_user_leaves_data() {
        let pool = setup_test_pool().await;
        create_user(&pool, &new_user("Ann", "ann@example.com"))
            .await
            .unwrap();

        assert!(!delete_user(&pool, 9999).await.unwrap());
        let (_, total) = list_users(&pool, &ListUsersParams::default()).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_total_count_ignores_page_window() {
        let pool = setup_test_pool().await;
        for i in 0..60 {
            let name = if i < 57 { format!("match {i}") } else { format!("other {i}") };
            create_user(&pool, &new_user(&name, &format!("u{i}@example.com")))
                .await
                .unwrap();
        }

        let params = ListUsersParams {
            predicate: FilterCompiler::new(&USER_SCHEMA)
                .compile_json(Some(r#"["name", "startswith", "match"]"#)),
            sort: Vec::new(),
            page: PageRequest::new(Some(40), Some(20)),
        };
        let (rows, total) = list_users(&pool, &params).await.unwrap();
        assert_eq!(rows.len(), 17);
        assert_eq!(total, 57);
    }

    #[tokio::test]
    async fn test_take_zero_still_counts() {
        let pool = setup_test_pool().await;
        for i in 0..3 {
            create_user(&pool, &new_user("A", &format!("u{i}@example.com")))
                .await
                .unwrap();
        }

        let params = ListUsersParams {
            page: PageRequest::new(None, Some(0)),
            ..Default::default()
        };
        let (rows, total) = list_users(&pool, &params).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn test_sort_name_asc_then_id_desc() {
        let pool = setup_test_pool().await;
        let b1 = create_user(&pool, &new_user("Bob", "b1@example.com")).await.unwrap();
        let a1 = create_user(&pool, &new_user("Ann", "a1@example.com")).await.unwrap();
        let b2 = create_user(&pool, &new_user("Bob", "b2@example.com")).await.unwrap();
        let a2 = create_user(&pool, &new_user("Ann", "a2@example.com")).await.unwrap();

        let params = ListUsersParams {
            sort: vec![SortSpec::asc("name"), SortSpec::desc("id")],
            ..Default::default()
        };
        let (rows, _) = list_users(&pool, &params).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![a2.id, a1.id, b2.id, b1.id]);
    }

    #[tokio::test]
    async fn test_default_order_is_by_id() {
        let pool = setup_test_pool().await;
        for name in ["Cy", "Ann", "Bob"] {
            create_user(&pool, &new_user(name, &format!("{name}@example.com")))
                .await
                .unwrap();
        }
        assert_eq!(
            names(&pool, &ListUsersParams::default()).await,
            vec!["Cy", "Ann", "Bob"]
        );
    }

    #[tokio::test]
    async fn test_nested_filter_semantics() {
        let pool = setup_test_pool().await;
        create_user(&pool, &new_user("a", "one@x.io")).await.unwrap();
        create_user(&pool, &new_user("a", "two@y.io")).await.unwrap();
        create_user(&pool, &new_user("b", "three@x.io")).await.unwrap();
        create_user(&pool, &new_user("c", "four@z.io")).await.unwrap();

        // ((name = a AND email endswith @x.io) OR name = c)
        let params = filtered(
            r#"[[["name","=","a"],"and",["email","endswith","@x.io"]],"or",["name","=","c"]]"#,
        );
        let (rows, total) = list_users(&pool, &params).await.unwrap();
        let emails: Vec<&str> = rows.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["one@x.io", "four@z.io"]);
        assert_eq!(total, 2);

        // (name <> c AND (email contains "two" OR email contains "three"))
        let params = filtered(
            r#"[["name","<>","c"],"and",[["email","contains","two"],"or",["email","contains","three"]]]"#,
        );
        assert_eq!(names(&pool, &params).await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_like_wildcards_are_literal() {
        let pool = setup_test_pool().await;
        create_user(&pool, &new_user("100% real", "a@example.com")).await.unwrap();
        create_user(&pool, &new_user("1000 real", "b@example.com")).await.unwrap();

        let params = filtered(r#"["name", "contains", "0%"]"#);
        assert_eq!(names(&pool, &params).await, vec!["100% real"]);
    }

    #[tokio::test]
    async fn test_date_filters_compare_calendar_day() {
        let pool = setup_test_pool().await;
        // 2024-01-10 08:00:00 UTC and 2024-01-10 23:59:00 UTC
        insert_with_created_at(&pool, "early", "e@example.com", 1_704_873_600).await;
        insert_with_created_at(&pool, "late", "l@example.com", 1_704_931_140).await;
        // 2024-02-01 00:00:00 UTC
        insert_with_created_at(&pool, "feb", "f@example.com", 1_706_745_600).await;

        let params = filtered(r#"["created_at", "=", "2024-01-10"]"#);
        assert_eq!(names(&pool, &params).await, vec!["early", "late"]);

        let params = filtered(r#"["created_at", "between", ["10-01-2024", "2024-01-31"]]"#);
        assert_eq!(names(&pool, &params).await, vec!["early", "late"]);

        let params = filtered(r#"["created_at", "notbetween", ["2024-01-01", "2024-01-31"]]"#);
        assert_eq!(names(&pool, &params).await, vec!["feb"]);

        let params = filtered(r#"["created_at", ">", "2024-01-10T12:00:00Z"]"#);
        assert_eq!(names(&pool, &params).await, vec!["feb"]);
    }

    #[tokio::test]
    async fn test_invalid_date_never_returns_unfiltered_rows() {
        let pool = setup_test_pool().await;
        create_user(&pool, &new_user("Ann", "ann@example.com")).await.unwrap();

        let (rows, total) = list_users(&pool, &filtered(r#"["created_at", "=", "not-a-date"]"#))
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);

        let params = filtered(r#"["created_at", "between", ["2024-01-01", "bogus"]]"#);
        assert!(names(&pool, &params).await.is_empty());
    }

    #[tokio::test]
    async fn test_null_filter_on_verified_at() {
        let pool = setup_test_pool().await;
        create_user(&pool, &new_user("unverified", "u@example.com")).await.unwrap();
        create_user(
            &pool,
            &NewUser {
                name: "verified".to_string(),
                email: "v@example.com".to_string(),
                email_verified_at: Some(1_704_873_600),
            },
        )
        .await
        .unwrap();

        let params = filtered(r#"["email_verified_at", "=", null]"#);
        assert_eq!(names(&pool, &params).await, vec!["unverified"]);

        let params = filtered(r#"["email_verified_at", "<>", null]"#);
        assert_eq!(names(&pool, &params).await, vec!["verified"]);
    }

    #[tokio::test]
    async fn test_export_streams_with_posts_and_cap() {
        let pool = setup_test_pool().await;
        let ann = create_user(&pool, &new_user("Ann", "ann@example.com")).await.unwrap();
        create_user(&pool, &new_user("Bob", "bob@example.com")).await.unwrap();
        create_user(&pool, &new_user("Cy", "cy@example.com")).await.unwrap();
        create_post(&pool, ann.id, "First").await.unwrap();
        create_post(&pool, ann.id, "Second").await.unwrap();

        let params = ExportUsersParams {
            predicate: FilterCompiler::new(&USER_SCHEMA)
                .with_alias("u")
                .compile_json(None),
            max_rows: 2,
            with_posts: true,
        };
        let rows: Vec<UserExportRow> = export_users(pool.clone(), params)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].posts.as_deref(), Some("First; Second"));
        assert_eq!(rows[1].name, "Bob");
        assert_eq!(rows[1].posts, None);
    }

    #[tokio::test]
    async fn test_export_applies_filter() {
        let pool = setup_test_pool().await;
        create_user(&pool, &new_user("Ann", "ann@example.com")).await.unwrap();
        create_user(&pool, &new_user("Bob", "bob@example.com")).await.unwrap();

        let params = ExportUsersParams {
            predicate: FilterCompiler::new(&USER_SCHEMA)
                .with_alias("u")
                .compile_json(Some(r#"["name", "=", "Bob"]"#)),
            max_rows: 100,
            with_posts: false,
        };
        let rows: Vec<UserExportRow> = export_users(pool.clone(), params)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "bob@example.com");
        assert_eq!(rows[0].posts, None);
    }
}
