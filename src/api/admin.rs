use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::team_assignment::TeamAssignment;
use crate::service::team;

#[derive(Deserialize, ToSchema)]
pub struct AssignTeam {
    #[schema(example = 2)]
    pub manager_id: i64,
    #[schema(example = 7)]
    pub employee_id: i64,
}

/// Put an employee under a manager, replacing the previous one
#[utoipa::path(
    put,
    path = "/api/admin/team",
    request_body = AssignTeam,
    responses(
        (status = 200, body = TeamAssignment),
        (status = 400, description = "Self-assignment or manager lacks an approver role"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn assign_team(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<AssignTeam>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let assignment = team::assign(pool.get_ref(), payload.manager_id, payload.employee_id).await?;
    Ok(HttpResponse::Ok().json(assignment))
}

#[utoipa::path(
    delete,
    path = "/api/admin/team/{employee_id}",
    params(("employee_id" = i64, Path, description = "Employee to detach from their manager")),
    responses(
        (status = 204, description = "Assignment removed"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee has no manager assigned")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn unassign_team(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    team::unassign(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
