use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::auth::session;
use crate::config::Config;
use crate::error::AppError;
use crate::model::role::Role;
use crate::model::user::UserSummary;
use crate::models::{LoginReqDto, LoginResponse, RegisterReqDto};

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Register a new employee account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReqDto,
    responses(
        (status = 201, description = "User registered", body = UserSummary),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Auth"
)]
pub async fn register(
    payload: web::Json<RegisterReqDto>,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let user = session::register(
        pool.get_ref(),
        &payload.name,
        &payload.email,
        &payload.password,
    )
    .await?;

    Ok(HttpResponse::Created().json(user))
}

/// Exchange email and password for an access and refresh token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    info!("Login request received");
    let response =
        session::authenticate(pool.get_ref(), &config, &payload.email, &payload.password).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Rotate the refresh token sent as `Authorization: Bearer <refresh_token>`
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = Object, example = json!({
            "token": "eyJ...",
            "refresh_token": "eyJ..."
        })),
        (status = 401, description = "Invalid, expired or revoked refresh token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    let token = bearer(&req).ok_or_else(|| {
        AppError::InvalidOrExpiredCredential("Missing refresh token".to_string())
    })?;

    let (token, refresh_token) = session::refresh(pool.get_ref(), &config, token).await?;

    Ok(HttpResponse::Ok().json(json!({
        "token": token,
        "refresh_token": refresh_token
    })))
}

/// Revoke the refresh token sent as bearer. Always 204.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> actix_web::Result<impl Responder> {
    if let Some(token) = bearer(&req) {
        session::revoke(pool.get_ref(), &config, token).await?;
    }
    Ok(HttpResponse::NoContent().finish())
}

/// Current user
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, body = UserSummary),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser, pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let user = UserSummary::get(pool.get_ref(), auth.user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(HttpResponse::Ok().json(user))
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfile {
    #[schema(example = "Jane Q. Doe")]
    pub name: String,
}

/// Edit the current user's profile
#[utoipa::path(
    patch,
    path = "/api/me",
    request_body = UpdateProfile,
    responses(
        (status = 200, body = UserSummary),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn update_me(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<UpdateProfile>,
) -> actix_web::Result<impl Responder> {
    let user = session::update_profile(pool.get_ref(), auth.user_id, &payload.name).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[derive(Deserialize, ToSchema)]
pub struct ChangeRole {
    #[schema(example = "manager")]
    pub role: Role,
}

/// Change a user's role (admin)
#[utoipa::path(
    patch,
    path = "/api/admin/users/{user_id}/role",
    params(("user_id" = i64, Path, description = "User to update")),
    request_body = ChangeRole,
    responses(
        (status = 200, body = UserSummary),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn set_user_role(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<ChangeRole>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let user_id = path.into_inner();
    if user_id == auth.user_id && payload.role != Role::Admin {
        return Err(AppError::validation_field("role", "Admins cannot demote themselves").into());
    }

    let user = session::set_role(pool.get_ref(), user_id, payload.role).await?;
    Ok(HttpResponse::Ok().json(user))
}
