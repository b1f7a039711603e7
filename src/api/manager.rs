use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::AppError;
use crate::model::leave_request::{Decision, LeaveRequest};
use crate::model::user::UserSummary;
use crate::notification::Notifier;
use crate::service::{leave_lifecycle, team};

#[derive(Deserialize, ToSchema, Default)]
pub struct DecisionComment {
    #[schema(example = "Enjoy your time off", nullable = true)]
    pub comment: Option<String>,
}

/// An empty body means no comment; anything else must be a valid `DecisionComment`.
fn parse_comment(body: &[u8]) -> Result<Option<String>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let parsed: DecisionComment = serde_json::from_slice(body)
        .map_err(|e| AppError::validation_field("comment", format!("Malformed request body: {e}")))?;
    Ok(parsed.comment)
}

/// Pending requests the caller may decide
#[utoipa::path(
    get,
    path = "/api/manager/leaves/pending",
    responses(
        (status = 200, description = "Pending requests, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager or admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Manager"
)]
pub async fn pending_leaves(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let leaves = leave_lifecycle::list_pending_for_manager(pool.get_ref(), &auth).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

async fn decide(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    notifier: web::Data<Notifier>,
    leave_id: i64,
    outcome: Decision,
    body: web::Bytes,
) -> actix_web::Result<HttpResponse> {
    let comment = parse_comment(&body)?;

    let leave = leave_lifecycle::decide(
        pool.get_ref(),
        &config.allotments,
        notifier.get_ref(),
        leave_id,
        &auth,
        outcome,
        comment.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Approve leave (Manager/Admin)
========================= */
#[utoipa::path(
    patch,
    path = "/api/manager/leaves/approve/{leave_id}",
    params(("leave_id" = i64, Path, description = "ID of the leave request to approve")),
    request_body(content = DecisionComment, description = "Optional body; the comment may be omitted", content_type = "application/json"),
    responses(
        (status = 200, description = "Leave approved, balance deducted", body = LeaveRequest),
        (status = 400, description = "Malformed request body"),
        (status = 403, description = "Not a manager of this employee"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Already decided or insufficient balance", body = Object, example = json!({
            "error": {
                "code": "insufficient_balance",
                "message": "Insufficient sick leave balance: 3 day(s) available, 5 requested",
                "details": { "leave_type": "sick", "available": 3, "requested": 5 }
            }
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Manager"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    notifier: web::Data<Notifier>,
    path: web::Path<i64>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    decide(
        auth,
        pool,
        config,
        notifier,
        path.into_inner(),
        Decision::Approved,
        body,
    )
    .await
}

/* =========================
Reject leave (Manager/Admin)
========================= */
#[utoipa::path(
    patch,
    path = "/api/manager/leaves/reject/{leave_id}",
    params(("leave_id" = i64, Path, description = "ID of the leave request to reject")),
    request_body(content = DecisionComment, description = "Optional body; the comment may be omitted", content_type = "application/json"),
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 400, description = "Malformed request body"),
        (status = 403, description = "Not a manager of this employee"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "Manager"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    notifier: web::Data<Notifier>,
    path: web::Path<i64>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    decide(
        auth,
        pool,
        config,
        notifier,
        path.into_inner(),
        Decision::Rejected,
        body,
    )
    .await
}

/// Direct reports of the caller
#[utoipa::path(
    get,
    path = "/api/manager/team",
    responses(
        (status = 200, body = [UserSummary]),
        (status = 403, description = "Manager or admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Manager"
)]
pub async fn my_team(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;
    let members = team::list_team(pool.get_ref(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(members))
}
