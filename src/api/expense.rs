use actix_web::{HttpResponse, Responder, web};
use sqlx::SqlitePool;

use crate::auth::auth::AuthUser;
use crate::model::expense::ExpenseRecord;
use crate::service::expense::{self, ExpenseSubmission};

/* =========================
Submit expense
========================= */
#[utoipa::path(
    post,
    path = "/api/expenses/submit",
    request_body = ExpenseSubmission,
    responses(
        (status = 201, description = "Expense recorded", body = ExpenseRecord),
        (status = 400, description = "Validation error", body = Object, example = json!({
            "error": {
                "code": "validation_error",
                "message": "Amount must be greater than zero",
                "details": { "amount": ["Amount must be greater than zero"] }
            }
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Expense"
)]
pub async fn submit_expense(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<ExpenseSubmission>,
) -> actix_web::Result<impl Responder> {
    let record = expense::submit(pool.get_ref(), auth.user_id, &payload).await?;
    Ok(HttpResponse::Created().json(record))
}

#[utoipa::path(
    get,
    path = "/api/expenses/history",
    responses(
        (status = 200, description = "Caller's expenses, newest first", body = [ExpenseRecord]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Expense"
)]
pub async fn expense_history(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let records = expense::list_mine(pool.get_ref(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(records))
}
