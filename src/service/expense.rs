use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use utoipa::ToSchema;

use crate::error::{AppError, ValidationErrorBuilder};
use crate::model::expense::{ExpenseRecord, NewExpense};

const MAX_CATEGORY_LEN: usize = 100;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExpenseSubmission {
    #[schema(example = 42.5)]
    pub amount: f64,
    #[schema(example = "travel")]
    pub category: String,
    #[schema(example = "2026-02-11", format = "date", value_type = String)]
    pub expense_date: NaiveDate,
    #[schema(example = "Taxi to client site")]
    #[serde(default)]
    pub description: String,
}

pub fn validate_submission(input: &ExpenseSubmission) -> Result<NewExpense, AppError> {
    let mut errors = ValidationErrorBuilder::new();

    if !input.amount.is_finite() || input.amount <= 0.0 {
        errors.add("amount", "Amount must be greater than zero");
    }

    let category = input.category.trim();
    if category.is_empty() {
        errors.add("category", "Category is required");
    } else if category.chars().count() > MAX_CATEGORY_LEN {
        errors.add(
            "category",
            format!("Category is too long (max {MAX_CATEGORY_LEN} characters)"),
        );
    }

    errors.finish()?;

    Ok(NewExpense {
        amount: input.amount,
        category: category.to_string(),
        expense_date: input.expense_date,
        description: input.description.trim().to_string(),
    })
}

pub async fn submit(
    db: &SqlitePool,
    user_id: i64,
    input: &ExpenseSubmission,
) -> Result<ExpenseRecord, AppError> {
    let expense = validate_submission(input)?;
    let record = ExpenseRecord::insert(db, user_id, &expense).await?;

    info!(user_id, expense_id = record.id, amount = record.amount, "Expense submitted");
    Ok(record)
}

pub async fn list_mine(db: &SqlitePool, user_id: i64) -> Result<Vec<ExpenseRecord>, AppError> {
    Ok(ExpenseRecord::list_for_user(db, user_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::testutil::{create_user, test_pool};

    fn submission(amount: f64) -> ExpenseSubmission {
        ExpenseSubmission {
            amount,
            category: "travel".into(),
            expense_date: NaiveDate::from_ymd_opt(2026, 2, 11).unwrap(),
            description: "Taxi".into(),
        }
    }

    #[test]
    fn test_non_positive_amounts_are_rejected() {
        for amount in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            match validate_submission(&submission(amount)) {
                Err(AppError::Validation(errors)) => assert!(errors.contains_key("amount")),
                other => panic!("expected validation error for {amount}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_category_required() {
        let mut input = submission(10.0);
        input.category = " ".into();
        assert!(matches!(
            validate_submission(&input),
            Err(AppError::Validation(_))
        ));
    }

    #[actix_web::test]
    async fn test_submit_and_list_newest_first() {
        let pool = test_pool().await;
        let user = create_user(&pool, "spender@company.com", Role::Employee).await;
        let other = create_user(&pool, "other@company.com", Role::Employee).await;

        let first = submit(&pool, user, &submission(12.0)).await.unwrap();
        let second = submit(&pool, user, &submission(30.25)).await.unwrap();
        submit(&pool, other, &submission(5.0)).await.unwrap();

        assert_eq!(second.amount, 30.25);
        assert_eq!(second.category, "travel");

        let mine = list_mine(&pool, user).await.unwrap();
        let ids: Vec<i64> = mine.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}
