use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum LeaveType {
    Casual,
    Sick,
    Earned,
}

impl LeaveType {
    /// Column holding this type's counter in `leave_balances`.
    pub fn balance_column(&self) -> &'static str {
        match self {
            LeaveType::Casual => "casual",
            LeaveType::Sick => "sick",
            LeaveType::Earned => "earned",
        }
    }
}

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }

    /// Only `pending` moves, and only forward into a terminal state.
    pub fn can_transition_to(&self, next: LeaveStatus) -> bool {
        matches!(
            (self, next),
            (
                LeaveStatus::Pending,
                LeaveStatus::Approved | LeaveStatus::Rejected | LeaveStatus::Cancelled
            )
        )
    }
}

/// Manager verdict on a pending request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for LeaveStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => LeaveStatus::Approved,
            Decision::Rejected => LeaveStatus::Rejected,
        }
    }
}

/// Inclusive calendar-day span; weekends and holidays count.
pub fn day_count(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    (end_date - start_date).num_days() + 1
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "user_id": 7,
    "leave_type": "casual",
    "start_date": "2026-03-02",
    "end_date": "2026-03-04",
    "days": 3,
    "reason": "Family event",
    "contact": "+8801712345678",
    "status": "pending",
    "manager_comment": null,
    "decided_by": null,
    "applied_at": "2026-02-20T09:30:00Z",
    "decided_at": null
}))]
pub struct LeaveRequest {
    pub id: i64,
    pub user_id: i64,
    pub leave_type: LeaveType,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub days: i64,
    pub reason: String,
    pub contact: Option<String>,
    pub status: LeaveStatus,
    pub manager_comment: Option<String>,
    pub decided_by: Option<i64>,
    #[schema(value_type = String, format = "date-time")]
    pub applied_at: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub decided_at: Option<DateTime<Utc>>,
}

/// Validated input for a new request.
#[derive(Debug, Clone)]
pub struct NewLeave {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
    pub reason: String,
    pub contact: Option<String>,
}

const LEAVE_COLUMNS: &str = r#"
    id, user_id, leave_type, start_date, end_date, days, reason, contact,
    status, manager_comment, decided_by, applied_at, decided_at
"#;

impl LeaveRequest {
    pub async fn insert(
        db: &SqlitePool,
        user_id: i64,
        leave: &NewLeave,
    ) -> Result<LeaveRequest, sqlx::Error> {
        sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            INSERT INTO leave_requests
                (user_id, leave_type, start_date, end_date, days, reason, contact, status, applied_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?)
            RETURNING {LEAVE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(leave.leave_type)
        .bind(leave.start_date)
        .bind(leave.end_date)
        .bind(leave.days)
        .bind(&leave.reason)
        .bind(&leave.contact)
        .bind(Utc::now())
        .fetch_one(db)
        .await
    }

    pub async fn get(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<LeaveRequest>, sqlx::Error> {
        sqlx::query_as::<_, LeaveRequest>(&format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Newest application first.
    pub async fn list_for_user(
        db: &SqlitePool,
        user_id: i64,
    ) -> Result<Vec<LeaveRequest>, sqlx::Error> {
        sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            SELECT {LEAVE_COLUMNS}
            FROM leave_requests
            WHERE user_id = ?
            ORDER BY applied_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Pending requests, system-wide.
    pub async fn list_pending(db: &SqlitePool) -> Result<Vec<LeaveRequest>, sqlx::Error> {
        sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            SELECT {LEAVE_COLUMNS}
            FROM leave_requests
            WHERE status = 'pending'
            ORDER BY applied_at DESC, id DESC
            "#
        ))
        .fetch_all(db)
        .await
    }

    /// Pending requests of the manager's direct reports.
    pub async fn list_pending_for_manager(
        db: &SqlitePool,
        manager_id: i64,
    ) -> Result<Vec<LeaveRequest>, sqlx::Error> {
        sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            SELECT {LEAVE_COLUMNS}
            FROM leave_requests
            WHERE status = 'pending'
            AND user_id IN (SELECT employee_id FROM team_assignments WHERE manager_id = ?)
            ORDER BY applied_at DESC, id DESC
            "#
        ))
        .bind(manager_id)
        .fetch_all(db)
        .await
    }

    /// Owner-initiated `pending -> cancelled`. Returns false when nothing matched.
    pub async fn mark_cancelled(
        conn: &mut SqliteConnection,
        id: i64,
        user_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = 'cancelled', decided_at = ?
            WHERE id = ?
            AND user_id = ?
            AND status = 'pending'
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .bind(user_id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Manager-initiated `pending -> approved|rejected`. Returns false when the
    /// request was no longer pending.
    pub async fn mark_decided(
        conn: &mut SqliteConnection,
        id: i64,
        status: LeaveStatus,
        manager_id: i64,
        comment: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, decided_by = ?, manager_comment = ?, decided_at = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(status)
        .bind(manager_id)
        .bind(comment)
        .bind(Utc::now())
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
