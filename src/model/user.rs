use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// argon2 PHC string
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// What the API exposes about a user; never carries the password hash.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[schema(example = json!({
    "id": 7,
    "name": "Jane Doe",
    "email": "jane@company.com",
    "role": "employee",
    "manager_id": 2
}))]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub manager_id: Option<i64>,
}

const SUMMARY_SELECT: &str = r#"
    SELECT u.id, u.name, u.email, u.role, t.manager_id
    FROM users u
    LEFT JOIN team_assignments t ON t.employee_id = u.id
"#;

impl User {
    pub async fn create(
        db: &SqlitePool,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, password, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(Utc::now())
        .execute(db)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password, role, created_at, last_login_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_role(db: &SqlitePool, id: i64) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_scalar::<_, Role>("SELECT role FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn id_for_email(db: &SqlitePool, email: &str) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(db)
            .await
    }

    pub async fn touch_last_login(db: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn update_name(db: &SqlitePool, id: i64, name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn update_role(db: &SqlitePool, id: i64, role: Role) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role)
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl UserSummary {
    pub async fn get(db: &SqlitePool, id: i64) -> Result<Option<UserSummary>, sqlx::Error> {
        sqlx::query_as::<_, UserSummary>(&format!("{SUMMARY_SELECT} WHERE u.id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Direct reports of a manager, by name.
    pub async fn list_reports(
        db: &SqlitePool,
        manager_id: i64,
    ) -> Result<Vec<UserSummary>, sqlx::Error> {
        sqlx::query_as::<_, UserSummary>(&format!(
            "{SUMMARY_SELECT} WHERE t.manager_id = ? ORDER BY u.name, u.id"
        ))
        .bind(manager_id)
        .fetch_all(db)
        .await
    }
}
