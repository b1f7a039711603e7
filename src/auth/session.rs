//! Credential checks and token issuance. Tokens are stateless JWTs; only
//! refresh-token ids are persisted so they can be rotated and revoked.

use sqlx::SqlitePool;
use tracing::{debug, error, info, instrument};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, verify_token};
use crate::auth::password::{hash_password, verify_password};
use crate::config::Config;
use crate::error::{AppError, ValidationErrorBuilder};
use crate::model::role::Role;
use crate::model::user::{User, UserSummary};
use crate::models::{Claims, LoginResponse, TokenType};
use crate::utils::{email_cache, email_filter};

const MIN_PASSWORD_LEN: usize = 8;

/// true  => email AVAILABLE
/// false => email TAKEN
pub async fn is_email_available(email: &str, pool: &SqlitePool) -> Result<bool, AppError> {
    let email = email_filter::normalize(email);

    // cuckoo filter: fast negative
    if !email_filter::might_exist(&email) {
        return Ok(true);
    }

    // moka cache: fast positive
    if email_cache::owner_of(&email).await.is_some() {
        return Ok(false);
    }

    match User::id_for_email(pool, &email).await? {
        Some(id) => {
            email_cache::remember(&email, id).await;
            Ok(false)
        }
        None => Ok(true),
    }
}

fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), AppError> {
    let mut errors = ValidationErrorBuilder::new();
    if name.trim().is_empty() {
        errors.add("name", "Name is required");
    }
    let email = email.trim();
    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        errors.add("email", "Email is not a valid address");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
    errors.finish()
}

async fn create_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<UserSummary, AppError> {
    let hashed = hash_password(password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        AppError::internal("Failed to register user")
    })?;

    let id = User::create(pool, name.trim(), email, &hashed, role).await?;
    email_filter::insert(email);
    email_cache::remember(email, id).await;

    UserSummary::get(pool, id)
        .await?
        .ok_or_else(|| AppError::internal("Registered user vanished"))
}

/// Self-service signup; every new account starts as `employee`.
#[instrument(name = "auth_register", skip(pool, name, password))]
pub async fn register(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password: &str,
) -> Result<UserSummary, AppError> {
    validate_registration(name, email, password)?;
    let email = email_filter::normalize(email);

    if !is_email_available(&email, pool).await? {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    // the UNIQUE constraint still catches a concurrent signup
    let user = create_user(pool, name, &email, password, Role::Employee).await?;
    info!(user_id = user.id, "User registered");
    Ok(user)
}

/// Seed an admin account if it does not exist yet.
pub async fn bootstrap_admin(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    let email = email_filter::normalize(email);
    if User::id_for_email(pool, &email).await?.is_some() {
        debug!("Bootstrap admin already present");
        return Ok(());
    }

    let user = create_user(pool, "Administrator", &email, password, Role::Admin).await?;
    info!(user_id = user.id, "Bootstrap admin created");
    Ok(())
}

async fn issue_tokens(
    pool: &SqlitePool,
    config: &Config,
    user_id: i64,
    email: &str,
    role: Role,
) -> Result<(String, String), AppError> {
    let access_token = generate_access_token(
        user_id,
        email,
        role,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign access token");
        AppError::internal("Failed to issue token")
    })?;

    let (refresh_token, refresh_claims) = generate_refresh_token(
        user_id,
        email,
        role,
        &config.jwt_secret,
        config.refresh_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign refresh token");
        AppError::internal("Failed to issue token")
    })?;

    debug!(user_id, jti = %refresh_claims.jti, "Storing refresh token");
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool)
    .await?;

    Ok((access_token, refresh_token))
}

/// `authenticate(email, password) -> (credential, userSummary)`.
#[instrument(name = "auth_login", skip(pool, config, password))]
pub async fn authenticate(
    pool: &SqlitePool,
    config: &Config,
    email: &str,
    password: &str,
) -> Result<LoginResponse, AppError> {
    let email = email_filter::normalize(email);
    if email.is_empty() || password.is_empty() {
        return Err(AppError::InvalidCredentials);
    }

    let user = match User::find_by_email(pool, &email).await? {
        Some(user) => user,
        None => {
            info!("Invalid credentials: user not found");
            return Err(AppError::InvalidCredentials);
        }
    };

    if let Err(e) = verify_password(password, &user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::InvalidCredentials);
    }

    let (token, refresh_token) = issue_tokens(pool, config, user.id, &user.email, user.role).await?;

    if let Err(e) = User::touch_last_login(pool, user.id).await {
        // not fatal for the login itself
        error!(error = %e, "Failed to update last_login_at");
    }
    email_cache::remember(&user.email, user.id).await;

    let summary = UserSummary::get(pool, user.id)
        .await?
        .ok_or_else(|| AppError::InvalidCredentials)?;

    info!(user_id = user.id, "Login successful");
    Ok(LoginResponse {
        token,
        refresh_token,
        user: summary,
    })
}

fn refresh_claims(token: &str, config: &Config) -> Result<Claims, AppError> {
    let claims =
        verify_token(token, &config.jwt_secret).map_err(AppError::InvalidOrExpiredCredential)?;
    if claims.token_type != TokenType::Refresh {
        return Err(AppError::InvalidOrExpiredCredential(
            "Refresh token required".to_string(),
        ));
    }
    Ok(claims)
}

/// Rotate a refresh token: revoke the presented one, issue a new pair.
pub async fn refresh(
    pool: &SqlitePool,
    config: &Config,
    token: &str,
) -> Result<(String, String), AppError> {
    let claims = refresh_claims(token, config)?;

    let revoked = sqlx::query(
        "UPDATE refresh_tokens SET revoked = 1 WHERE jti = ? AND revoked = 0",
    )
    .bind(&claims.jti)
    .execute(pool)
    .await?;
    if revoked.rows_affected() == 0 {
        return Err(AppError::InvalidOrExpiredCredential(
            "Refresh token revoked or unknown".to_string(),
        ));
    }

    // pick up role changes made since the last login
    let role = User::find_role(pool, claims.user_id)
        .await?
        .ok_or_else(|| AppError::InvalidOrExpiredCredential("Unknown user".to_string()))?;

    issue_tokens(pool, config, claims.user_id, &claims.sub, role).await
}

/// Revoke a refresh token. Idempotent; invalid tokens are ignored.
pub async fn revoke(pool: &SqlitePool, config: &Config, token: &str) -> Result<(), AppError> {
    let Ok(claims) = refresh_claims(token, config) else {
        return Ok(());
    };

    sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE jti = ?")
        .bind(&claims.jti)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_role(pool: &SqlitePool, user_id: i64, role: Role) -> Result<UserSummary, AppError> {
    if !User::update_role(pool, user_id, role).await? {
        return Err(AppError::not_found("User not found"));
    }
    info!(user_id, %role, "User role changed");
    UserSummary::get(pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

pub async fn update_profile(
    pool: &SqlitePool,
    user_id: i64,
    name: &str,
) -> Result<UserSummary, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation_field("name", "Name is required"));
    }
    if !User::update_name(pool, user_id, name).await? {
        return Err(AppError::not_found("User not found"));
    }
    UserSummary::get(pool, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}
