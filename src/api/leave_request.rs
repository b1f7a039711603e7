use actix_web::{HttpResponse, Responder, web};
use sqlx::SqlitePool;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::LeaveRequest;
use crate::service::leave_lifecycle::{self, LeaveApplication};
use crate::service::leave_ledger;

/* =========================
Apply for leave
========================= */
#[utoipa::path(
    post,
    path = "/api/leaves/apply",
    request_body(
        content = LeaveApplication,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted, status pending", body = LeaveRequest),
        (status = 400, description = "Validation error", body = Object, example = json!({
            "error": {
                "code": "validation_error",
                "message": "end_date must not be before start_date",
                "details": { "end_date": ["end_date must not be before start_date"] }
            }
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn apply_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<LeaveApplication>,
) -> actix_web::Result<impl Responder> {
    let leave = leave_lifecycle::apply(pool.get_ref(), auth.user_id, &payload).await?;
    Ok(HttpResponse::Created().json(leave))
}

/* =========================
Caller's leave history
========================= */
#[utoipa::path(
    get,
    path = "/api/leaves/history",
    responses(
        (status = 200, description = "Caller's leave requests, newest first", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_history(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let leaves = leave_lifecycle::list_mine(pool.get_ref(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

/* =========================
Cancel own pending leave
========================= */
#[utoipa::path(
    patch,
    path = "/api/leaves/cancel/{leave_id}",
    params(("leave_id" = i64, Path, description = "ID of the leave request to cancel")),
    responses(
        (status = 200, description = "Leave request cancelled", body = LeaveRequest),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request is no longer pending")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let leave = leave_lifecycle::cancel(pool.get_ref(), path.into_inner(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/// Leave request details, for the owner, their manager, or an admin
#[utoipa::path(
    get,
    path = "/api/leaves/{leave_id}",
    params(("leave_id" = i64, Path, description = "ID of the leave request to fetch")),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let leave = leave_lifecycle::get_visible(pool.get_ref(), path.into_inner(), &auth).await?;
    Ok(HttpResponse::Ok().json(leave))
}

/// Remaining leave for the current year
#[utoipa::path(
    get,
    path = "/api/leaves/balance",
    responses(
        (status = 200, description = "Remaining days per leave type", body = LeaveBalance),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_balance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let balance =
        leave_ledger::get_balance(pool.get_ref(), auth.user_id, &config.allotments).await?;
    Ok(HttpResponse::Ok().json(balance))
}
