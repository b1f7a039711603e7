use sqlx::SqlitePool;
use tracing::info;

use crate::error::AppError;
use crate::model::team_assignment::TeamAssignment;
use crate::model::user::{User, UserSummary};

/// Put `employee_id` under `manager_id`, replacing any earlier manager.
pub async fn assign(
    db: &SqlitePool,
    manager_id: i64,
    employee_id: i64,
) -> Result<TeamAssignment, AppError> {
    if manager_id == employee_id {
        return Err(AppError::validation_field(
            "employee_id",
            "An employee cannot be their own manager",
        ));
    }

    let manager_role = User::find_role(db, manager_id)
        .await?
        .ok_or_else(|| AppError::not_found("Manager not found"))?;
    if !manager_role.is_approver() {
        return Err(AppError::validation_field(
            "manager_id",
            format!("User {manager_id} is not a manager"),
        ));
    }
    if User::find_role(db, employee_id).await?.is_none() {
        return Err(AppError::not_found("Employee not found"));
    }

    let assignment = TeamAssignment::upsert(db, manager_id, employee_id).await?;
    info!(manager_id, employee_id, "Team assignment saved");
    Ok(assignment)
}

pub async fn unassign(db: &SqlitePool, employee_id: i64) -> Result<(), AppError> {
    if TeamAssignment::remove(db, employee_id).await? {
        info!(employee_id, "Team assignment removed");
        Ok(())
    } else {
        Err(AppError::not_found("Employee has no manager assigned"))
    }
}

pub async fn list_team(db: &SqlitePool, manager_id: i64) -> Result<Vec<UserSummary>, AppError> {
    Ok(UserSummary::list_reports(db, manager_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::testutil::{create_user, test_pool};

    #[actix_web::test]
    async fn test_assign_and_reassign() {
        let pool = test_pool().await;
        let first = create_user(&pool, "first@company.com", Role::Manager).await;
        let second = create_user(&pool, "second@company.com", Role::Admin).await;
        let employee = create_user(&pool, "worker@company.com", Role::Employee).await;

        assign(&pool, first, employee).await.unwrap();
        assert_eq!(list_team(&pool, first).await.unwrap().len(), 1);

        let moved = assign(&pool, second, employee).await.unwrap();
        assert_eq!(moved.manager_id, second);
        assert!(list_team(&pool, first).await.unwrap().is_empty());

        let team = list_team(&pool, second).await.unwrap();
        assert_eq!(team.len(), 1);
        assert_eq!(team[0].id, employee);
        assert_eq!(team[0].manager_id, Some(second));
    }

    #[actix_web::test]
    async fn test_assign_rejects_bad_pairs() {
        let pool = test_pool().await;
        let manager = create_user(&pool, "lead@company.com", Role::Manager).await;
        let employee = create_user(&pool, "dev@company.com", Role::Employee).await;

        assert!(matches!(
            assign(&pool, manager, manager).await.unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            assign(&pool, employee, manager).await.unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            assign(&pool, manager, 999).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[actix_web::test]
    async fn test_unassign() {
        let pool = test_pool().await;
        let manager = create_user(&pool, "m@company.com", Role::Manager).await;
        let employee = create_user(&pool, "e@company.com", Role::Employee).await;
        assign(&pool, manager, employee).await.unwrap();

        unassign(&pool, employee).await.unwrap();
        assert!(list_team(&pool, manager).await.unwrap().is_empty());
        assert!(matches!(
            unassign(&pool, employee).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
