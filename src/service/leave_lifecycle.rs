//! Leave request lifecycle: `pending` is the only live state.
//!
//! ```text
//! apply ──> pending ──cancel (owner)──────────> cancelled
//!              │
//!              ├──decide approved (manager)───> approved   (balance deducted)
//!              └──decide rejected (manager)───> rejected
//! ```
//!
//! Every transition is a conditional `UPDATE ... WHERE status = 'pending'`, so
//! two racing calls on one request cannot both succeed, and approval deducts the
//! balance in the same transaction.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::config::Allotments;
use crate::error::{AppError, ValidationErrorBuilder};
use crate::model::leave_request::{
    Decision, LeaveRequest, LeaveStatus, LeaveType, NewLeave, day_count,
};
use crate::model::role::Role;
use crate::model::team_assignment::TeamAssignment;
use crate::model::user::UserSummary;
use crate::notification::{LeaveEmail, Notifier};
use crate::service::leave_ledger;

const MAX_REASON_LEN: usize = 1000;
const MAX_CONTACT_LEN: usize = 200;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeaveApplication {
    #[schema(example = "casual")]
    pub leave_type: LeaveType,
    #[schema(example = "2026-03-02", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-03-04", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family event")]
    pub reason: String,
    #[schema(example = "+8801712345678", nullable = true)]
    pub contact: Option<String>,
}

/// Field checks for a new application. Balance is not consulted here.
pub fn validate_application(input: &LeaveApplication) -> Result<NewLeave, AppError> {
    let mut errors = ValidationErrorBuilder::new();

    let reason = input.reason.trim();
    if reason.is_empty() {
        errors.add("reason", "Reason is required");
    } else if reason.chars().count() > MAX_REASON_LEN {
        errors.add(
            "reason",
            format!("Reason is too long (max {MAX_REASON_LEN} characters)"),
        );
    }

    let contact = input
        .contact
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    if contact.is_some_and(|c| c.chars().count() > MAX_CONTACT_LEN) {
        errors.add(
            "contact",
            format!("Contact is too long (max {MAX_CONTACT_LEN} characters)"),
        );
    }

    let days = day_count(input.start_date, input.end_date);
    if days < 1 {
        errors.add("end_date", "end_date must not be before start_date");
    }

    errors.finish()?;

    Ok(NewLeave {
        leave_type: input.leave_type,
        start_date: input.start_date,
        end_date: input.end_date,
        days,
        reason: reason.to_string(),
        contact: contact.map(str::to_string),
    })
}

#[instrument(name = "leave_apply", skip(db, input), fields(leave_type = %input.leave_type))]
pub async fn apply(
    db: &SqlitePool,
    user_id: i64,
    input: &LeaveApplication,
) -> Result<LeaveRequest, AppError> {
    let new_leave = validate_application(input)?;
    let leave = LeaveRequest::insert(db, user_id, &new_leave).await?;

    info!(leave_id = leave.id, days = leave.days, "Leave request submitted");
    Ok(leave)
}

/// Explain why `current -> next` was refused.
fn transition_error(current: LeaveStatus, next: LeaveStatus) -> AppError {
    if current.is_terminal() {
        AppError::invalid_state(format!(
            "Leave request is already {current} and cannot become {next}"
        ))
    } else if current.can_transition_to(next) {
        AppError::invalid_state("Leave request changed while it was being updated")
    } else {
        AppError::invalid_state(format!("Leave request cannot move from {current} to {next}"))
    }
}

#[instrument(name = "leave_cancel", skip(db))]
pub async fn cancel(
    db: &SqlitePool,
    request_id: i64,
    caller_id: i64,
) -> Result<LeaveRequest, AppError> {
    let mut tx = db.begin().await?;

    // write first so the transaction holds the write lock before it reads
    let claimed = LeaveRequest::mark_cancelled(&mut tx, request_id, caller_id).await?;
    let leave = LeaveRequest::get(&mut tx, request_id)
        .await?
        .ok_or_else(|| AppError::not_found("Leave request not found"))?;

    if leave.user_id != caller_id {
        return Err(AppError::forbidden(
            "Only the owner can cancel a leave request",
        ));
    }
    if !claimed {
        return Err(transition_error(leave.status, LeaveStatus::Cancelled));
    }

    tx.commit().await?;
    info!("Leave request cancelled");
    Ok(leave)
}

/// Whether `caller` may see and decide requests owned by `owner_id`.
async fn can_review(
    conn: &mut sqlx::SqliteConnection,
    caller: &AuthUser,
    owner_id: i64,
) -> Result<bool, AppError> {
    Ok(match caller.role {
        Role::Admin => true,
        Role::Manager => TeamAssignment::manages(conn, caller.user_id, owner_id).await?,
        Role::Employee => false,
    })
}

#[instrument(
    name = "leave_decide",
    skip(db, allotments, notifier, manager, comment),
    fields(manager_id = manager.user_id)
)]
pub async fn decide(
    db: &SqlitePool,
    allotments: &Allotments,
    notifier: &Notifier,
    request_id: i64,
    manager: &AuthUser,
    outcome: Decision,
    comment: Option<&str>,
) -> Result<LeaveRequest, AppError> {
    manager.require_manager_or_admin()?;

    let next = LeaveStatus::from(outcome);
    let comment = comment.map(str::trim).filter(|c| !c.is_empty());

    let mut tx = db.begin().await?;

    let claimed =
        LeaveRequest::mark_decided(&mut tx, request_id, next, manager.user_id, comment).await?;
    let leave = LeaveRequest::get(&mut tx, request_id)
        .await?
        .ok_or_else(|| AppError::not_found("Leave request not found"))?;

    if leave.user_id == manager.user_id {
        return Err(AppError::forbidden("You cannot decide your own leave request"));
    }
    if !can_review(&mut tx, manager, leave.user_id).await? {
        return Err(AppError::forbidden(
            "Leave request does not belong to a member of your team",
        ));
    }
    if !claimed {
        return Err(transition_error(leave.status, next));
    }

    if outcome == Decision::Approved {
        leave_ledger::reserve_or_deduct(
            &mut tx,
            leave.user_id,
            leave.leave_type,
            leave.days,
            leave_ledger::period_of(leave.start_date),
            allotments,
        )
        .await?;
    }

    tx.commit().await?;
    info!(status = %leave.status, "Leave request decided");

    match UserSummary::get(db, leave.user_id).await {
        Ok(Some(owner)) => {
            notifier.dispatch(LeaveEmail::decision(&owner.name, &owner.email, &leave))
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Could not load leave owner for notification"),
    }

    Ok(leave)
}

pub async fn list_mine(db: &SqlitePool, user_id: i64) -> Result<Vec<LeaveRequest>, AppError> {
    Ok(LeaveRequest::list_for_user(db, user_id).await?)
}

/// Admins see every pending request; managers only their team's.
pub async fn list_pending_for_manager(
    db: &SqlitePool,
    caller: &AuthUser,
) -> Result<Vec<LeaveRequest>, AppError> {
    caller.require_manager_or_admin()?;

    if caller.is_admin() {
        Ok(LeaveRequest::list_pending(db).await?)
    } else {
        Ok(LeaveRequest::list_pending_for_manager(db, caller.user_id).await?)
    }
}

/// Visible to the owner, the owner's manager, and admins.
pub async fn get_visible(
    db: &SqlitePool,
    request_id: i64,
    caller: &AuthUser,
) -> Result<LeaveRequest, AppError> {
    let mut conn = db.acquire().await?;
    let leave = LeaveRequest::get(&mut conn, request_id)
        .await?
        .ok_or_else(|| AppError::not_found("Leave request not found"))?;

    if leave.user_id == caller.user_id || can_review(&mut conn, caller, leave.user_id).await? {
        Ok(leave)
    } else {
        Err(AppError::forbidden("You cannot view this leave request"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::leave_ledger::{balance_for_period, get_balance};
    use crate::testutil::{assign, auth_user, create_user, file_pool, test_pool};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn application(leave_type: LeaveType, start: &str, end: &str) -> LeaveApplication {
        LeaveApplication {
            leave_type,
            start_date: date(start),
            end_date: date(end),
            reason: "Family event".into(),
            contact: None,
        }
    }

    /// Dates inside the current accounting year, so the balance endpoint
    /// reflects the deduction.
    fn this_year(month_day: &str) -> String {
        format!("{}-{month_day}", leave_ledger::current_period())
    }

    struct Team {
        pool: SqlitePool,
        employee: AuthUser,
        manager: AuthUser,
    }

    async fn team() -> Team {
        let pool = test_pool().await;
        let employee_id = create_user(&pool, "employee@company.com", Role::Employee).await;
        let manager_id = create_user(&pool, "manager@company.com", Role::Manager).await;
        assign(&pool, manager_id, employee_id).await;

        Team {
            employee: auth_user(employee_id, Role::Employee),
            manager: auth_user(manager_id, Role::Manager),
            pool,
        }
    }

    async fn approve(t: &Team, id: i64) -> Result<LeaveRequest, AppError> {
        decide(
            &t.pool,
            &Allotments::default(),
            &Notifier::disabled(),
            id,
            &t.manager,
            Decision::Approved,
            None,
        )
        .await
    }

    async fn reject(t: &Team, id: i64, comment: Option<&str>) -> Result<LeaveRequest, AppError> {
        decide(
            &t.pool,
            &Allotments::default(),
            &Notifier::disabled(),
            id,
            &t.manager,
            Decision::Rejected,
            comment,
        )
        .await
    }

    #[test]
    fn test_transition_error_names_terminal_state() {
        match transition_error(LeaveStatus::Approved, LeaveStatus::Rejected) {
            AppError::InvalidState(message) => {
                assert!(message.contains("already approved"), "{message}")
            }
            other => panic!("expected InvalidState, got {other:?}"),
        }
        match transition_error(LeaveStatus::Pending, LeaveStatus::Approved) {
            AppError::InvalidState(message) => assert!(message.contains("changed"), "{message}"),
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_collects_fields() {
        let mut input = application(LeaveType::Casual, "2026-03-04", "2026-03-02");
        input.reason = "   ".into();

        match validate_application(&input) {
            Err(AppError::Validation(errors)) => {
                assert!(errors.contains_key("reason"));
                assert!(errors.contains_key("end_date"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_trims_and_counts_days() {
        let mut input = application(LeaveType::Sick, "2026-03-02", "2026-03-06");
        input.reason = "  flu  ".into();
        input.contact = Some("   ".into());

        let leave = validate_application(&input).unwrap();
        assert_eq!(leave.days, 5);
        assert_eq!(leave.reason, "flu");
        assert_eq!(leave.contact, None);
    }

    #[test]
    fn test_day_count_matches_span_for_many_ranges() {
        let start = date("2026-01-01");
        for offset in 0..400 {
            let end = start + chrono::Duration::days(offset);
            let input = LeaveApplication {
                end_date: end,
                ..application(LeaveType::Earned, "2026-01-01", "2026-01-01")
            };
            assert_eq!(validate_application(&input).unwrap().days, offset + 1);
        }
    }

    #[actix_web::test]
    async fn test_approval_deducts_and_blocks_later_rejection() {
        let t = team().await;
        let input = application(LeaveType::Casual, &this_year("03-02"), &this_year("03-04"));

        let leave = apply(&t.pool, t.employee.user_id, &input).await.unwrap();
        assert_eq!(leave.status, LeaveStatus::Pending);
        assert_eq!(leave.days, 3);

        let before = get_balance(&t.pool, t.employee.user_id, &Allotments::default())
            .await
            .unwrap();
        assert_eq!(before.casual, 12);

        let approved = approve(&t, leave.id).await.unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(approved.decided_by, Some(t.manager.user_id));
        assert!(approved.decided_at.is_some());

        let after = get_balance(&t.pool, t.employee.user_id, &Allotments::default())
            .await
            .unwrap();
        assert_eq!(after.casual, 9);

        let err = reject(&t, leave.id, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        let after_reject = get_balance(&t.pool, t.employee.user_id, &Allotments::default())
            .await
            .unwrap();
        assert_eq!(after_reject.casual, 9);
    }

    #[actix_web::test]
    async fn test_insufficient_balance_keeps_request_pending() {
        let t = team().await;
        let allotments = Allotments {
            sick: 3,
            ..Allotments::default()
        };
        let input = application(LeaveType::Sick, &this_year("04-06"), &this_year("04-10"));
        let leave = apply(&t.pool, t.employee.user_id, &input).await.unwrap();

        let err = decide(
            &t.pool,
            &allotments,
            &Notifier::disabled(),
            leave.id,
            &t.manager,
            Decision::Approved,
            Some("ok"),
        )
        .await
        .unwrap_err();

        match err {
            AppError::InsufficientBalance {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 3);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientBalance, got {other:?}"),
        }

        let reloaded = get_visible(&t.pool, leave.id, &t.employee).await.unwrap();
        assert_eq!(reloaded.status, LeaveStatus::Pending);
        assert_eq!(reloaded.manager_comment, None);
        assert_eq!(reloaded.decided_by, None);

        let balance = get_balance(&t.pool, t.employee.user_id, &allotments).await.unwrap();
        assert_eq!(balance.sick, 3);
    }

    #[actix_web::test]
    async fn test_rejection_stores_comment_and_keeps_balance() {
        let t = team().await;
        let input = application(LeaveType::Earned, &this_year("05-04"), &this_year("05-05"));
        let leave = apply(&t.pool, t.employee.user_id, &input).await.unwrap();

        let rejected = reject(&t, leave.id, Some("  Release week  ")).await.unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
        assert_eq!(rejected.manager_comment.as_deref(), Some("Release week"));

        let balance = get_balance(&t.pool, t.employee.user_id, &Allotments::default())
            .await
            .unwrap();
        assert_eq!(balance.earned, 15);
    }

    #[actix_web::test]
    async fn test_owner_cancels_pending_request() {
        let t = team().await;
        let input = application(LeaveType::Casual, &this_year("06-01"), &this_year("06-02"));
        let leave = apply(&t.pool, t.employee.user_id, &input).await.unwrap();

        let cancelled = cancel(&t.pool, leave.id, t.employee.user_id).await.unwrap();
        assert_eq!(cancelled.status, LeaveStatus::Cancelled);

        let balance = get_balance(&t.pool, t.employee.user_id, &Allotments::default())
            .await
            .unwrap();
        assert_eq!(balance.casual, 12);

        // terminal
        let err = cancel(&t.pool, leave.id, t.employee.user_id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        let err = approve(&t, leave.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[actix_web::test]
    async fn test_non_owner_cannot_cancel() {
        let t = team().await;
        let input = application(LeaveType::Casual, "2026-06-01", "2026-06-02");
        let leave = apply(&t.pool, t.employee.user_id, &input).await.unwrap();

        let err = cancel(&t.pool, leave.id, t.manager.user_id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let reloaded = get_visible(&t.pool, leave.id, &t.employee).await.unwrap();
        assert_eq!(reloaded.status, LeaveStatus::Pending);
    }

    #[actix_web::test]
    async fn test_cannot_cancel_approved_request() {
        let t = team().await;
        let input = application(LeaveType::Casual, "2026-07-01", "2026-07-01");
        let leave = apply(&t.pool, t.employee.user_id, &input).await.unwrap();
        approve(&t, leave.id).await.unwrap();

        let err = cancel(&t.pool, leave.id, t.employee.user_id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[actix_web::test]
    async fn test_unknown_request_is_not_found() {
        let t = team().await;
        assert!(matches!(
            cancel(&t.pool, 404, t.employee.user_id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            approve(&t, 404).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[actix_web::test]
    async fn test_employee_cannot_decide() {
        let t = team().await;
        let colleague_id = create_user(&t.pool, "colleague@company.com", Role::Employee).await;
        let input = application(LeaveType::Casual, "2026-08-03", "2026-08-03");
        let leave = apply(&t.pool, colleague_id, &input).await.unwrap();

        let err = decide(
            &t.pool,
            &Allotments::default(),
            &Notifier::disabled(),
            leave.id,
            &t.employee,
            Decision::Approved,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[actix_web::test]
    async fn test_manager_scope_is_team_only() {
        let t = team().await;
        let outsider_id = create_user(&t.pool, "outsider@company.com", Role::Employee).await;
        let input = application(LeaveType::Casual, "2026-08-03", "2026-08-04");
        let outsider_leave = apply(&t.pool, outsider_id, &input).await.unwrap();
        let team_leave = apply(&t.pool, t.employee.user_id, &input).await.unwrap();

        let err = approve(&t, outsider_leave.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let still_pending = get_visible(&t.pool, outsider_leave.id, &auth_user(outsider_id, Role::Employee))
            .await
            .unwrap();
        assert_eq!(still_pending.status, LeaveStatus::Pending);

        let pending = list_pending_for_manager(&t.pool, &t.manager).await.unwrap();
        let ids: Vec<i64> = pending.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![team_leave.id]);

        let admin_id = create_user(&t.pool, "admin@company.com", Role::Admin).await;
        let admin = auth_user(admin_id, Role::Admin);
        let all = list_pending_for_manager(&t.pool, &admin).await.unwrap();
        assert_eq!(all.len(), 2);

        let decided = decide(
            &t.pool,
            &Allotments::default(),
            &Notifier::disabled(),
            outsider_leave.id,
            &admin,
            Decision::Approved,
            None,
        )
        .await
        .unwrap();
        assert_eq!(decided.status, LeaveStatus::Approved);
    }

    #[actix_web::test]
    async fn test_manager_cannot_decide_own_request() {
        let t = team().await;
        let admin_id = create_user(&t.pool, "boss@company.com", Role::Admin).await;
        let admin = auth_user(admin_id, Role::Admin);
        let input = application(LeaveType::Casual, "2026-09-01", "2026-09-01");
        let own = apply(&t.pool, admin_id, &input).await.unwrap();

        let err = decide(
            &t.pool,
            &Allotments::default(),
            &Notifier::disabled(),
            own.id,
            &admin,
            Decision::Approved,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[actix_web::test]
    async fn test_list_mine_newest_first() {
        let t = team().await;
        let first = apply(
            &t.pool,
            t.employee.user_id,
            &application(LeaveType::Casual, "2026-01-05", "2026-01-05"),
        )
        .await
        .unwrap();
        let second = apply(
            &t.pool,
            t.employee.user_id,
            &application(LeaveType::Sick, "2026-01-02", "2026-01-02"),
        )
        .await
        .unwrap();

        let mine = list_mine(&t.pool, t.employee.user_id).await.unwrap();
        let ids: Vec<i64> = mine.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);

        assert!(list_mine(&t.pool, t.manager.user_id).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_visibility() {
        let t = team().await;
        let stranger_id = create_user(&t.pool, "stranger@company.com", Role::Employee).await;
        let leave = apply(
            &t.pool,
            t.employee.user_id,
            &application(LeaveType::Casual, "2026-02-02", "2026-02-02"),
        )
        .await
        .unwrap();

        assert!(get_visible(&t.pool, leave.id, &t.employee).await.is_ok());
        assert!(get_visible(&t.pool, leave.id, &t.manager).await.is_ok());
        assert!(matches!(
            get_visible(&t.pool, leave.id, &auth_user(stranger_id, Role::Employee))
                .await
                .unwrap_err(),
            AppError::Forbidden(_)
        ));
    }

    #[actix_web::test]
    async fn test_approval_charges_start_year() {
        let t = team().await;
        let leave = apply(
            &t.pool,
            t.employee.user_id,
            &application(LeaveType::Earned, "2030-12-30", "2031-01-02"),
        )
        .await
        .unwrap();
        assert_eq!(leave.days, 4);
        approve(&t, leave.id).await.unwrap();

        let allotments = Allotments::default();
        let charged = balance_for_period(&t.pool, t.employee.user_id, 2030, &allotments)
            .await
            .unwrap();
        let next = balance_for_period(&t.pool, t.employee.user_id, 2031, &allotments)
            .await
            .unwrap();
        assert_eq!(charged.earned, 11);
        assert_eq!(next.earned, 15);
    }

    #[actix_web::test]
    async fn test_concurrent_decisions_deduct_once() {
        let t = team().await;
        let leave = apply(
            &t.pool,
            t.employee.user_id,
            &application(LeaveType::Casual, &this_year("10-05"), &this_year("10-07")),
        )
        .await
        .unwrap();

        let (a, b) = futures::join!(approve(&t, leave.id), approve(&t, leave.id));
        let outcomes = [a, b];
        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(outcomes.iter().any(|r| matches!(
            r,
            Err(AppError::InvalidState(_)) | Err(AppError::InsufficientBalance { .. })
        )));

        let balance = get_balance(&t.pool, t.employee.user_id, &Allotments::default())
            .await
            .unwrap();
        assert_eq!(balance.casual, 9);
    }

    #[actix_web::test]
    async fn test_parallel_decisions_on_file_database() {
        let db = file_pool(5).await;
        let employee_id = create_user(&db.pool, "employee@company.com", Role::Employee).await;
        let manager_id = create_user(&db.pool, "manager@company.com", Role::Manager).await;
        let admin_id = create_user(&db.pool, "admin@company.com", Role::Admin).await;
        assign(&db.pool, manager_id, employee_id).await;

        let deciders = [
            auth_user(manager_id, Role::Manager),
            auth_user(admin_id, Role::Admin),
            auth_user(manager_id, Role::Manager),
            auth_user(admin_id, Role::Admin),
        ];
        let allotments = Allotments::default();
        let notifier = Notifier::disabled();

        let rounds = 3;
        for round in 0..rounds {
            let day = this_year(&format!("11-{:02}", round + 2));
            let leave = apply(
                &db.pool,
                employee_id,
                &application(LeaveType::Casual, &day, &day),
            )
            .await
            .unwrap();

            let outcomes = futures::future::join_all(deciders.iter().map(|decider| {
                decide(
                    &db.pool,
                    &allotments,
                    &notifier,
                    leave.id,
                    decider,
                    Decision::Approved,
                    None,
                )
            }))
            .await;

            assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(
                outcomes
                    .iter()
                    .filter(|r| r.is_err())
                    .all(|r| matches!(r, Err(AppError::InvalidState(_)))),
                "{outcomes:?}"
            );
        }

        let balance = get_balance(&db.pool, employee_id, &allotments)
            .await
            .unwrap();
        assert_eq!(balance.casual, 12 - rounds);
    }

    #[actix_web::test]
    async fn test_email_failure_does_not_undo_decision() {
        let t = team().await;
        let smtp = crate::config::SmtpConfig {
            host: "127.0.0.1".into(),
            port: 1,
            username: None,
            password: None,
            from: "noreply@company.com".into(),
            tls: false,
        };
        let notifier = Notifier::from_config(Some(&smtp)).unwrap();
        let leave = apply(
            &t.pool,
            t.employee.user_id,
            &application(LeaveType::Casual, "2026-11-02", "2026-11-02"),
        )
        .await
        .unwrap();

        let decided = decide(
            &t.pool,
            &Allotments::default(),
            &notifier,
            leave.id,
            &t.manager,
            Decision::Rejected,
            None,
        )
        .await
        .unwrap();
        assert_eq!(decided.status, LeaveStatus::Rejected);
    }
}
