use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use utoipa::ToSchema;

/// A submitted expense claim. Terminal on creation; there is no approval step.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[schema(example = json!({
    "id": 3,
    "user_id": 7,
    "amount": 42.5,
    "category": "travel",
    "expense_date": "2026-02-11",
    "description": "Taxi to client site",
    "submitted_at": "2026-02-12T08:00:00Z"
}))]
pub struct ExpenseRecord {
    pub id: i64,
    pub user_id: i64,
    pub amount: f64,
    pub category: String,
    #[schema(value_type = String, format = "date")]
    pub expense_date: NaiveDate,
    pub description: String,
    #[schema(value_type = String, format = "date-time")]
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: f64,
    pub category: String,
    pub expense_date: NaiveDate,
    pub description: String,
}

impl ExpenseRecord {
    pub async fn insert(
        db: &SqlitePool,
        user_id: i64,
        expense: &NewExpense,
    ) -> Result<ExpenseRecord, sqlx::Error> {
        sqlx::query_as::<_, ExpenseRecord>(
            r#"
            INSERT INTO expenses (user_id, amount, category, expense_date, description, submitted_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, amount, category, expense_date, description, submitted_at
            "#,
        )
        .bind(user_id)
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(expense.expense_date)
        .bind(&expense.description)
        .bind(Utc::now())
        .fetch_one(db)
        .await
    }

    /// Newest submission first.
    pub async fn list_for_user(
        db: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<ExpenseRecord>, sqlx::Error> {
        sqlx::query_as::<_, ExpenseRecord>(
            r#"
            SELECT id, user_id, amount, category, expense_date, description, submitted_at
            FROM expenses
            WHERE user_id = ?
            ORDER BY submitted_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}
