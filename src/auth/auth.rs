use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

use crate::error::AppError;
use crate::model::role::Role;

/// Caller identity attached by `auth_middleware` to every protected request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<AuthUser>().cloned();
        ready(user.ok_or_else(|| {
            AppError::InvalidOrExpiredCredential("Missing credential".to_string()).into()
        }))
    }
}

/// The one role guard: fails with `Forbidden` unless `identity.role` is allowed.
pub fn require_role(identity: &AuthUser, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&identity.role) {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "Role {} is not permitted for this action",
            identity.role
        )))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        require_role(self, &[Role::Admin])
    }

    pub fn require_manager_or_admin(&self) -> Result<(), AppError> {
        require_role(self, Role::APPROVERS)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
