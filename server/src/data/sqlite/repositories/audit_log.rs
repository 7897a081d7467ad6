//! Audit log repository for SQLite operations

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::data::sqlite::SqliteError;
use crate::data::types::{AuditLogFilter, AuditLogRow, NewAuditLog};

/// Shown when an entry's actor has no matching user
const UNKNOWN_USERNAME: &str = "Unknown";

/// Insert an audit entry
pub async fn insert_log(pool: &SqlitePool, entry: &NewAuditLog) -> Result<i64, SqliteError> {
    let result = sqlx::query(
        "INSERT INTO logs (created_at, user_id, http_method, request_url, request_body, response_code) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(entry.created_at)
    .bind(entry.actor_id)
    .bind(&entry.method)
    .bind(&entry.request_url)
    .bind(&entry.request_body)
    .bind(i64::from(entry.response_code))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// List entries newest first
pub async fn list_logs(
    pool: &SqlitePool,
    filter: &AuditLogFilter,
) -> Result<Vec<AuditLogRow>, SqliteError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT l.id, l.created_at, l.user_id, l.http_method, l.request_url, l.request_body, \
         l.response_code, u.username FROM logs l LEFT JOIN users u ON u.id = l.user_id WHERE 1 = 1",
    );

    if let Some(actor_id) = filter.actor_id {
        qb.push(" AND l.user_id = ").push_bind(actor_id);
    }
    if let Some(method) = filter.method {
        qb.push(" AND upper(l.http_method) = ")
            .push_bind(method.as_str());
    }
    qb.push(" ORDER BY l.created_at DESC, l.id DESC");

    let rows = qb
        .build_query_as::<(i64, i64, i64, String, String, String, i64, Option<String>)>()
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(
            |(
                id,
                created_at,
                user_id,
                http_method,
                request_url,
                request_body,
                response_code,
                username,
            )| AuditLogRow {
                id,
                created_at,
                user_id,
                http_method,
                request_url,
                request_body,
                response_code,
                instance_username: filter
                    .with_username
                    .then(|| username.unwrap_or_else(|| UNKNOWN_USERNAME.to_string())),
            },
        )
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::HttpMethodFilter;

    async fn setup_test_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query(crate::data::sqlite::schema::SCHEMA)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO users (id, username, password_hash) VALUES (3, 'technician', 'x')")
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    fn entry(created_at: i64, actor_id: i64, method: &str) -> NewAuditLog {
        NewAuditLog {
            created_at,
            actor_id,
            method: method.to_string(),
            request_url: "127.0.0.1:5000 /api/v1/units".to_string(),
            request_body: String::new(),
            response_code: 200,
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_newest_first() {
        let pool = setup_test_pool().await;
        let first = insert_log(&pool, &entry(10, 3, "GET")).await.unwrap();
        let second = insert_log(&pool, &entry(20, -1, "POST")).await.unwrap();
        let third = insert_log(&pool, &entry(20, 3, "DELETE")).await.unwrap();

        let rows = list_logs(&pool, &AuditLogFilter::default()).await.unwrap();
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third, second, first]);
        assert!(rows.iter().all(|r| r.instance_username.is_none()));
    }

    #[tokio::test]
    async fn test_filters() {
        let pool = setup_test_pool().await;
        insert_log(&pool, &entry(10, 3, "GET")).await.unwrap();
        insert_log(&pool, &entry(11, 3, "POST")).await.unwrap();
        insert_log(&pool, &entry(12, -1, "POST")).await.unwrap();

        let by_actor = list_logs(
            &pool,
            &AuditLogFilter {
                actor_id: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_actor.len(), 2);

        let by_method = list_logs(
            &pool,
            &AuditLogFilter {
                method: Some(HttpMethodFilter::Post),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(by_method.len(), 2);
        assert!(by_method.iter().all(|r| r.http_method == "POST"));
    }

    #[tokio::test]
    async fn test_fill_username() {
        let pool = setup_test_pool().await;
        insert_log(&pool, &entry(10, 3, "GET")).await.unwrap();
        insert_log(&pool, &entry(11, -1, "POST")).await.unwrap();

        let rows = list_logs(
            &pool,
            &AuditLogFilter {
                with_username: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(rows[0].instance_username.as_deref(), Some("Unknown"));
        assert_eq!(rows[1].instance_username.as_deref(), Some("technician"));
    }
}
