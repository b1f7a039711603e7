use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;
use crate::model::user::UserSummary;

#[derive(Deserialize, ToSchema)]
pub struct RegisterReqDto {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane@company.com", format = "email")]
    pub email: String,
    #[schema(example = "correct horse battery")]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "jane@company.com", format = "email")]
    pub email: String,
    #[schema(example = "correct horse battery")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Access token for the `Authorization: Bearer` header
    pub token: String,
    pub refresh_token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    /// email
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
