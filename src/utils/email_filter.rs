use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::SqlitePool;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Expected capacity and false-positive rate.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

/// Registered emails. A miss means the email is definitely free.
static EMAIL_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

#[inline]
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

// Poisoning is ignored: a missing entry only costs a database lookup.
fn read() -> RwLockReadGuard<'static, CuckooFilter<String>> {
    EMAIL_FILTER.read().unwrap_or_else(|e| e.into_inner())
}

fn write() -> RwLockWriteGuard<'static, CuckooFilter<String>> {
    EMAIL_FILTER.write().unwrap_or_else(|e| e.into_inner())
}

/// Check if an email might be registered (false positives possible)
pub fn might_exist(email: &str) -> bool {
    read().contains(&normalize(email))
}

pub fn insert(email: &str) {
    write().add(&normalize(email));
}

/// Load every registered email, streaming in batches.
pub async fn warmup_email_filter(pool: &SqlitePool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>("SELECT email FROM users").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (email,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(normalize(&email));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Email filter warmup complete: {} users", total);
    Ok(())
}

fn insert_batch(emails: &[String]) {
    let mut filter = write();
    for email in emails {
        filter.add(email);
    }
}
