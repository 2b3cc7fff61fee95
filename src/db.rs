//! SQLite-backed user repository.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::{AuthError, ResultExt};
use crate::repo::{Identity, NewUser, UserRepository};
use crate::service::CONFLICT_MESSAGE;

/// Account row stored by [`Database`].
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    username: String,
    password_hash: String,
    is_active: i32,
    is_staff: i32,
    is_superuser: i32,
}

impl From<UserRow> for StoredUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            username: row.username,
            password_hash: row.password_hash,
            is_active: row.is_active != 0,
            is_staff: row.is_staff != 0,
            is_superuser: row.is_superuser != 0,
        }
    }
}

impl Identity for StoredUser {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn password_hash(&self) -> &str {
        &self.password_hash
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn is_staff(&self) -> bool {
        self.is_staff
    }

    fn is_superuser(&self) -> bool {
        self.is_superuser
    }
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open or create a database at the given path.
    /// Use ":memory:" for an in-memory database.
    pub async fn open(path: &str) -> Result<Self, sqlx::Error> {
        let url = if path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{}?mode=rwc", path)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get the underlying connection pool (for tests that need raw SQL
    /// access).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the current schema version.
    async fn get_version(&self) -> Result<i32, sqlx::Error> {
        let result: Option<(i32,)> = sqlx::query_as("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(result.map(|r| r.0).unwrap_or(0))
    }

    /// Set the schema version within a transaction.
    async fn set_version(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        version: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM schema_version")
            .execute(&mut **tx)
            .await?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(version)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Run database migrations.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
            .execute(&self.pool)
            .await?;

        let version = self.get_version().await?;

        if version < 1 {
            self.migrate_v1().await?;
        }

        Ok(())
    }

    /// Execute a list of queries in a transaction, then set the version.
    async fn run_migration(
        &self,
        version: i32,
        queries: &[&'static str],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for query in queries {
            sqlx::query(*query).execute(&mut *tx).await?;
        }
        Self::set_version(&mut tx, version).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn migrate_v1(&self) -> Result<(), sqlx::Error> {
        self.run_migration(
            1,
            &[
                "CREATE TABLE users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    email TEXT UNIQUE NOT NULL,
                    username TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    is_active INTEGER NOT NULL DEFAULT 1,
                    is_staff INTEGER NOT NULL DEFAULT 0,
                    is_superuser INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE INDEX idx_users_email ON users(email)",
                "CREATE INDEX idx_users_username ON users(username)",
            ],
        )
        .await
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<StoredUser>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, username, password_hash, is_active, is_staff, is_superuser
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StoredUser::from))
    }

    async fn fetch_by_email_or_username(
        &self,
        value: &str,
    ) -> Result<Option<StoredUser>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, username, password_hash, is_active, is_staff, is_superuser
             FROM users WHERE email = ? OR username = ?",
        )
        .bind(value)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StoredUser::from))
    }

    async fn insert_user(&self, user: NewUser) -> Result<StoredUser, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (email, username, password_hash, is_active, is_staff, is_superuser)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_active as i32)
        .bind(user.is_staff as i32)
        .bind(user.is_superuser as i32)
        .execute(&self.pool)
        .await?;

        Ok(StoredUser {
            id: result.last_insert_rowid(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        })
    }
}

/// A unique-constraint hit is a Conflict like the service pre-check
/// would have raised; it covers the window between check and insert.
fn map_insert_error(e: sqlx::Error) -> AuthError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AuthError::conflict(CONFLICT_MESSAGE)
        }
        _ => AuthError::repo_error("user insert failed", e),
    }
}

#[async_trait]
impl UserRepository for Database {
    type User = StoredUser;

    async fn get_by_id(&self, id: i64) -> Result<Option<StoredUser>, AuthError> {
        self.fetch_by_id(id).await.repo_err("user lookup by id failed")
    }

    async fn get_by_email_or_username(&self, value: &str) -> Result<Option<StoredUser>, AuthError> {
        self.fetch_by_email_or_username(value)
            .await
            .repo_err("user lookup failed")
    }

    async fn create_user(&self, user: NewUser) -> Result<StoredUser, AuthError> {
        self.insert_user(user).await.map_err(map_insert_error)
    }
}
