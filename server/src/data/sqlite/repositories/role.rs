//! Role repository for SQLite operations

use sqlx::SqlitePool;

use crate::core::constants::{ADMIN_ROLE_ID, LAB_TECHNICIAN_ROLE_ID};
use crate::data::sqlite::SqliteError;
use crate::data::types::RoleRow;

/// Roles inserted into an empty `roles` table
const DEFAULT_ROLES: &[(i64, &str)] = &[
    (ADMIN_ROLE_ID, "admin"),
    (LAB_TECHNICIAN_ROLE_ID, "lab technician"),
];

/// Insert the default roles when the table is empty
pub async fn seed_roles(pool: &SqlitePool) -> Result<(), SqliteError> {
    let mut tx = pool.begin().await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
        .fetch_one(&mut *tx)
        .await?;
    if count > 0 {
        tracing::debug!(count, "Roles already present, skipping seed");
        return Ok(());
    }

    for (id, name) in DEFAULT_ROLES {
        sqlx::query("INSERT INTO roles (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::debug!(count = DEFAULT_ROLES.len(), "Seeded default roles");
    Ok(())
}

/// List all roles ordered by id
pub async fn list_roles(pool: &SqlitePool) -> Result<Vec<RoleRow>, SqliteError> {
    let rows = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM roles ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, name)| RoleRow { id, name })
        .collect())
}

/// Get a role by ID
pub async fn get_role(pool: &SqlitePool, id: i64) -> Result<Option<RoleRow>, SqliteError> {
    let row = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM roles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(id, name)| RoleRow { id, name }))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query(crate::data::sqlite::schema::SCHEMA)
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn test_seed_roles() {
        let pool = setup_test_pool().await;
        seed_roles(&pool).await.unwrap();

        let roles = list_roles(&pool).await.unwrap();
        assert_eq!(
            roles,
            vec![
                RoleRow {
                    id: 1,
                    name: "admin".into()
                },
                RoleRow {
                    id: 2,
                    name: "lab technician".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_seed_roles_skips_populated_table() {
        let pool = setup_test_pool().await;
        sqlx::query("INSERT INTO roles (id, name) VALUES (7, 'custom')")
            .execute(&pool)
            .await
            .unwrap();

        seed_roles(&pool).await.unwrap();

        let roles = list_roles(&pool).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "custom");
    }

    #[tokio::test]
    async fn test_get_role() {
        let pool = setup_test_pool().await;
        seed_roles(&pool).await.unwrap();

        assert_eq!(get_role(&pool, 1).await.unwrap().unwrap().name, "admin");
        assert!(get_role(&pool, 42).await.unwrap().is_none());
    }
}
