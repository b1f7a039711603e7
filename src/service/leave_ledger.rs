//! Per-employee, per-type leave allotment and consumption.
//!
//! The accounting period is the calendar year. Each `(user, year)` row starts
//! at the configured allotment and only ever decreases, by approvals.

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::config::Allotments;
use crate::error::AppError;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::LeaveType;
use crate::model::user::User;

pub fn current_period() -> i32 {
    Utc::now().year()
}

/// The period an approved request is charged to: the year it starts in.
pub fn period_of(start_date: NaiveDate) -> i32 {
    start_date.year()
}

/// Remaining balance for the current period.
pub async fn get_balance(
    db: &SqlitePool,
    user_id: i64,
    allotments: &Allotments,
) -> Result<LeaveBalance, AppError> {
    balance_for_period(db, user_id, current_period(), allotments).await
}

pub async fn balance_for_period(
    db: &SqlitePool,
    user_id: i64,
    period_year: i32,
    allotments: &Allotments,
) -> Result<LeaveBalance, AppError> {
    if User::find_role(db, user_id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    let mut conn = db.acquire().await?;
    LeaveBalance::ensure(&mut conn, user_id, period_year, allotments).await?;
    Ok(LeaveBalance::fetch(&mut conn, user_id, period_year).await?)
}

/// Commit `days` of `leave_type` against the period's balance.
///
/// Must run on the same transaction as the status change it accompanies; on
/// `InsufficientBalance` the caller drops the transaction and nothing changes.
pub async fn reserve_or_deduct(
    conn: &mut SqliteConnection,
    user_id: i64,
    leave_type: LeaveType,
    days: i64,
    period_year: i32,
    allotments: &Allotments,
) -> Result<(), AppError> {
    LeaveBalance::ensure(conn, user_id, period_year, allotments).await?;

    if LeaveBalance::deduct(conn, user_id, period_year, leave_type, days).await? {
        debug!(user_id, %leave_type, days, period_year, "Leave balance deducted");
        return Ok(());
    }

    let balance = LeaveBalance::fetch(conn, user_id, period_year).await?;
    Err(AppError::InsufficientBalance {
        leave_type,
        available: balance.remaining(leave_type),
        requested: days,
    })
}
