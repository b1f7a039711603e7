use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use utoipa::ToSchema;

/// Links an employee to the single manager who decides their leave.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TeamAssignment {
    pub id: i64,
    pub manager_id: i64,
    pub employee_id: i64,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl TeamAssignment {
    /// Assign, replacing any previous manager of the employee.
    pub async fn upsert(
        db: &SqlitePool,
        manager_id: i64,
        employee_id: i64,
    ) -> Result<TeamAssignment, sqlx::Error> {
        sqlx::query_as::<_, TeamAssignment>(
            r#"
            INSERT INTO team_assignments (manager_id, employee_id, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT (employee_id) DO UPDATE
                SET manager_id = excluded.manager_id, created_at = excluded.created_at
            RETURNING id, manager_id, employee_id, created_at
            "#,
        )
        .bind(manager_id)
        .bind(employee_id)
        .bind(Utc::now())
        .fetch_one(db)
        .await
    }

    pub async fn remove(db: &SqlitePool, employee_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM team_assignments WHERE employee_id = ?")
            .bind(employee_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn manages(
        conn: &mut SqliteConnection,
        manager_id: i64,
        employee_id: i64,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM team_assignments
                WHERE manager_id = ? AND employee_id = ?
            )
            "#,
        )
        .bind(manager_id)
        .bind(employee_id)
        .fetch_one(conn)
        .await
    }
}
