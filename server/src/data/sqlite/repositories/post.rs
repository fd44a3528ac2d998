//! Post repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::PostRow;

/// Create a post owned by `user_id`
pub async fn create_post(
    pool: &SqlitePool,
    user_id: i64,
    title: &str,
) -> Result<PostRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query("INSERT INTO posts (user_id, title, created_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(title)
        .bind(now)
        .execute(pool)
        .await?;

    Ok(PostRow {
        id: result.last_insert_rowid(),
        user_id,
        title: title.to_string(),
        created_at: now,
    })
}

/// Count posts owned by `user_id`
pub async fn count_for_user(pool: &SqlitePool, user_id: i64) -> Result<i64, SqliteError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::SqliteService;

    async fn setup_pool_with_user() -> (SqlitePool, i64) {
        let pool = SqliteService::in_memory().await.unwrap().pool().clone();
        let result = sqlx::query(
            "INSERT INTO users (name, email, created_at, updated_at) VALUES ('Ann', 'ann@example.com', 0, 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        (pool, result.last_insert_rowid())
    }

    #[tokio::test]
    async fn test_create_post() {
        let (pool, user_id) = setup_pool_with_user().await;
        let post = create_post(&pool, user_id, "Hello").await.unwrap();

        assert!(post.id > 0);
        assert_eq!(post.user_id, user_id);
        assert_eq!(count_for_user(&pool, user_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_post_for_missing_user_fails() {
        let (pool, _) = setup_pool_with_user().await;
        let err = create_post(&pool, 9999, "Orphan").await.unwrap_err();
        assert!(matches!(err, SqliteError::Database(_)));
    }
}
