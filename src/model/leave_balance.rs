use serde::Serialize;
use sqlx::{FromRow, SqliteConnection};
use utoipa::ToSchema;

use crate::config::Allotments;
use crate::model::leave_request::LeaveType;

/// Remaining days per leave type for one user and one accounting year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRow, ToSchema)]
#[schema(example = json!({
    "period_year": 2026,
    "casual": 9,
    "sick": 10,
    "earned": 15
}))]
pub struct LeaveBalance {
    pub period_year: i32,
    pub casual: i64,
    pub sick: i64,
    pub earned: i64,
}

impl LeaveBalance {
    pub fn remaining(&self, leave_type: LeaveType) -> i64 {
        match leave_type {
            LeaveType::Casual => self.casual,
            LeaveType::Sick => self.sick,
            LeaveType::Earned => self.earned,
        }
    }

    /// Seed the period's row with the full allotment if it does not exist yet.
    pub async fn ensure(
        conn: &mut SqliteConnection,
        user_id: i64,
        period_year: i32,
        allotments: &Allotments,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO leave_balances (user_id, period_year, casual, sick, earned)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (user_id, period_year) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(period_year)
        .bind(allotments.casual)
        .bind(allotments.sick)
        .bind(allotments.earned)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn fetch(
        conn: &mut SqliteConnection,
        user_id: i64,
        period_year: i32,
    ) -> Result<LeaveBalance, sqlx::Error> {
        sqlx::query_as::<_, LeaveBalance>(
            r#"
            SELECT period_year, casual, sick, earned
            FROM leave_balances
            WHERE user_id = ? AND period_year = ?
            "#,
        )
        .bind(user_id)
        .bind(period_year)
        .fetch_one(conn)
        .await
    }

    /// Subtract `days` only if enough remain. Returns false when the balance
    /// is short, leaving the row untouched.
    pub async fn deduct(
        conn: &mut SqliteConnection,
        user_id: i64,
        period_year: i32,
        leave_type: LeaveType,
        days: i64,
    ) -> Result<bool, sqlx::Error> {
        let column = leave_type.balance_column();
        let result = sqlx::query(&format!(
            r#"
            UPDATE leave_balances
            SET {column} = {column} - ?
            WHERE user_id = ? AND period_year = ?
            AND {column} >= ?
            "#
        ))
        .bind(days)
        .bind(user_id)
        .bind(period_year)
        .bind(days)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
