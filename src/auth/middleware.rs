use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use sqlx::SqlitePool;
use tracing::debug;

use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::model::user::User;
use crate::models::TokenType;

/// Resolve the bearer access token into an `AuthUser`.
///
/// The role is re-read from the database so role changes and deleted users
/// take effect before the token expires.
pub async fn authorize(
    header: Option<&str>,
    config: &Config,
    pool: &SqlitePool,
) -> Result<AuthUser, AppError> {
    let header = header.ok_or_else(|| {
        AppError::InvalidOrExpiredCredential("Missing Authorization header".to_string())
    })?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::InvalidOrExpiredCredential(
            "Authorization header must start with Bearer".to_string(),
        )
    })?;

    let claims =
        verify_token(token, &config.jwt_secret).map_err(AppError::InvalidOrExpiredCredential)?;

    if claims.token_type != TokenType::Access {
        return Err(AppError::InvalidOrExpiredCredential(
            "Access token required".to_string(),
        ));
    }

    let role = User::find_role(pool, claims.user_id)
        .await?
        .ok_or_else(|| AppError::InvalidOrExpiredCredential("Unknown user".to_string()))?;

    Ok(AuthUser {
        user_id: claims.user_id,
        email: claims.sub,
        role,
    })
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| AppError::internal("App config missing"))?;
    let pool = req
        .app_data::<Data<SqlitePool>>()
        .cloned()
        .ok_or_else(|| AppError::internal("Database pool missing"))?;

    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(str::to_owned);

    match authorize(header.as_deref(), &config, &pool).await {
        Ok(auth_user) => {
            req.extensions_mut().insert(auth_user);
            next.call(req).await
        }
        Err(e) => {
            debug!(error = %e, path = %req.path(), "Rejected unauthenticated request");
            Ok(req.into_response(e.error_response()))
        }
    }
}
