use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

impl Role {
    /// Roles that may review and decide other people's leave.
    pub const APPROVERS: &'static [Role] = &[Role::Manager, Role::Admin];

    pub fn is_approver(&self) -> bool {
        Self::APPROVERS.contains(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_and_display() {
        assert_eq!(Role::from_str("manager").unwrap(), Role::Manager);
        assert_eq!(Role::Admin.to_string(), "admin");
        assert!(Role::from_str("hr").is_err());
    }

    #[test]
    fn test_approvers() {
        assert!(Role::Manager.is_approver());
        assert!(Role::Admin.is_approver());
        assert!(!Role::Employee.is_approver());
    }
}
