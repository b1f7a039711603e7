//! Recently active accounts, keyed by normalized email.
//!
//! Registration consults this before touching the database: a hit means the
//! address already belongs to the cached user id. Entries come from signups,
//! successful logins and a startup warmup over recent `last_login_at` values.

use anyhow::Result;
use futures_util::TryStreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::SqlitePool;
use std::time::Duration;

use crate::utils::email_filter::normalize;

static ACTIVE_ACCOUNTS: Lazy<Cache<String, i64>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .time_to_idle(Duration::from_secs(7 * 86400))
        .build()
});

pub async fn remember(email: &str, user_id: i64) {
    ACTIVE_ACCOUNTS.insert(normalize(email), user_id).await;
}

/// Id of the account owning `email`, if it is cached.
pub async fn owner_of(email: &str) -> Option<i64> {
    ACTIVE_ACCOUNTS.get(&normalize(email)).await
}

/// Load accounts that logged in within the last `days` days, `batch_size`
/// rows at a time. Returns how many were cached.
pub async fn warmup_email_cache(pool: &SqlitePool, days: u32, batch_size: usize) -> Result<usize> {
    let since = chrono::Utc::now() - chrono::Duration::days(i64::from(days));
    let mut batches = sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT id, email
        FROM users
        WHERE last_login_at >= ?
        ORDER BY last_login_at DESC
        "#,
    )
    .bind(since)
    .fetch(pool)
    .try_chunks(batch_size.max(1));

    let mut cached = 0usize;
    while let Some(batch) = batches.try_next().await.map_err(|e| e.1)? {
        cached += batch.len();
        futures::future::join_all(batch.iter().map(|(id, email)| remember(email, *id))).await;
    }

    log::info!("Email cache warmup complete: {cached} accounts active in the last {days} days");
    Ok(cached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::model::user::User;
    use crate::testutil::{create_user, test_pool};

    #[actix_web::test]
    async fn test_owner_lookup_is_case_insensitive() {
        assert_eq!(owner_of("cache-case@company.com").await, None);
        remember("Cache-Case@Company.com", 41).await;
        assert_eq!(owner_of("cache-case@company.com").await, Some(41));
    }

    #[actix_web::test]
    async fn test_warmup_loads_only_recent_logins() {
        let pool = test_pool().await;
        let recent = create_user(&pool, "warm-recent@company.com", Role::Employee).await;
        create_user(&pool, "warm-never@company.com", Role::Employee).await;
        User::touch_last_login(&pool, recent).await.unwrap();

        let cached = warmup_email_cache(&pool, 30, 1).await.unwrap();

        assert_eq!(cached, 1);
        assert_eq!(owner_of("warm-recent@company.com").await, Some(recent));
        assert_eq!(owner_of("warm-never@company.com").await, None);
    }
}
