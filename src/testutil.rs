//! Shared fixtures for unit tests.

use sqlx::SqlitePool;
use std::path::PathBuf;

use crate::auth::auth::AuthUser;
use crate::db::init_db;
use crate::model::role::Role;
use crate::model::team_assignment::TeamAssignment;
use crate::model::user::User;

pub async fn test_pool() -> SqlitePool {
    init_db("sqlite::memory:", 1)
        .await
        .expect("in-memory database")
}

/// On-disk database with a multi-connection pool, so transactions really run
/// side by side. The files are removed on drop.
pub struct FileDb {
    pub pool: SqlitePool,
    path: PathBuf,
}

pub async fn file_pool(max_connections: u32) -> FileDb {
    let path = std::env::temp_dir().join(format!("leavedesk-{}.db", uuid::Uuid::new_v4()));
    let pool = init_db(&format!("sqlite://{}", path.display()), max_connections)
        .await
        .expect("file database");
    FileDb { pool, path }
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// Insert a user with an unusable password hash.
pub async fn create_user(pool: &SqlitePool, email: &str, role: Role) -> i64 {
    let name = email.split('@').next().unwrap_or(email);
    User::create(pool, name, email, "!", role)
        .await
        .expect("insert user")
}

pub async fn assign(pool: &SqlitePool, manager_id: i64, employee_id: i64) {
    TeamAssignment::upsert(pool, manager_id, employee_id)
        .await
        .expect("assign team member");
}

pub fn auth_user(user_id: i64, role: Role) -> AuthUser {
    AuthUser {
        user_id,
        email: format!("user{user_id}@company.com"),
        role,
    }
}
