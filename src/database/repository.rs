use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::manager::{DatabaseError, DuplicateField};
use crate::database::models::{NewUser, User};

const USER_COLUMNS: &str = "id, username, email, full_name, hashed_password, created_at";

/// Queries and mutations on the `users` table
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Fail with `Duplicate` if the username or email is taken. Username is
    /// checked first so the reported field is deterministic when both collide.
    pub async fn ensure_available(&self, username: &str, email: &str) -> Result<(), DatabaseError> {
        if self.find_by_username(username).await?.is_some() {
            return Err(DatabaseError::Duplicate(DuplicateField::Username));
        }
        if self.find_by_email(email).await?.is_some() {
            return Err(DatabaseError::Duplicate(DuplicateField::Email));
        }
        Ok(())
    }

    /// Insert a user. Concurrent inserts that pass `ensure_available` are
    /// still caught by the UNIQUE constraints.
    pub async fn create(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        self.ensure_available(&new_user.username, &new_user.email).await?;

        let result = sqlx::query(
            "INSERT INTO users (username, email, full_name, hashed_password, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.full_name)
        .bind(&new_user.hashed_password)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Inserted user vanished".to_string()))
    }

    pub async fn list(&self, skip: i64, limit: i64) -> Result<Vec<User>, DatabaseError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Remove a user and return the removed row.
    pub async fn delete(&self, id: i64) -> Result<User, DatabaseError> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("User not found".to_string()));
        }

        Ok(user)
    }
}

/// Translate a UNIQUE constraint failure into the matching duplicate error
fn map_unique_violation(err: sqlx::Error) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("users.username") {
                return DatabaseError::Duplicate(DuplicateField::Username);
            }
            if message.contains("users.email") {
                return DatabaseError::Duplicate(DuplicateField::Email);
            }
        }
    }
    DatabaseError::Sqlx(err)
}
