use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, error};

use crate::users::repo_types::{NewUser, User};

/// Outcome of a failed repository call. Raw driver errors never leave this module.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("user {id} not found")]
    NotFound { id: i64 },

    #[error("{field} already in use")]
    ConstraintViolation { field: &'static str },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Store(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                let field = match db.constraint() {
                    Some(c) if c.contains("email") => "email",
                    _ => "record",
                };
                RepoError::ConstraintViolation { field }
            }
            // SQLSTATE class 08 is "connection exception"; 57P0x are server shutdown codes.
            sqlx::Error::Database(db)
                if db
                    .code()
                    .is_some_and(|c| c.starts_with("08") || c.starts_with("57P0")) =>
            {
                RepoError::Unavailable(e.to_string())
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => RepoError::Unavailable(e.to_string()),
            _ => RepoError::Store(e.to_string()),
        }
    }
}

/// Storage access for users. Every method maps to a single statement.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, input: NewUser) -> Result<User, RepoError>;
    /// Live users in id order.
    async fn list(&self) -> Result<Vec<User>, RepoError>;
    async fn get_by_id(&self, id: i64) -> Result<User, RepoError>;
    /// Overwrites name, email and age of a live user.
    async fn update(&self, id: i64, input: NewUser) -> Result<User, RepoError>;
    /// Marks a live user deleted. Deleting twice yields `NotFound`.
    async fn soft_delete(&self, id: i64) -> Result<(), RepoError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn log_failure(op: &'static str, e: sqlx::Error) -> RepoError {
    let err = RepoError::from(e);
    match &err {
        RepoError::ConstraintViolation { .. } => debug!(op, error = %err, "constraint violation"),
        _ => error!(op, error = %err, "user query failed"),
    }
    err
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, input: NewUser) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, age)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, age, created_at, updated_at, deleted_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(input.age)
        .fetch_one(&self.db)
        .await
        .map_err(|e| log_failure("create", e))?;
        debug!(user_id = user.id, "user inserted");
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, age, created_at, updated_at, deleted_at
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| log_failure("list", e))?;
        Ok(users)
    }

    async fn get_by_id(&self, id: i64) -> Result<User, RepoError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, age, created_at, updated_at, deleted_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| log_failure("get_by_id", e))?
        .ok_or(RepoError::NotFound { id })
    }

    async fn update(&self, id: i64, input: NewUser) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET name = $2, email = $3, age = $4, updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, name, email, age, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(input.age)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| log_failure("update", e))?
        .ok_or(RepoError::NotFound { id })?;
        debug!(user_id = user.id, "user updated");
        Ok(user)
    }

    async fn soft_delete(&self, id: i64) -> Result<(), RepoError> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET deleted_at = now()
             WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(|e| log_failure("soft_delete", e))?;

        if res.rows_affected() == 0 {
            return Err(RepoError::NotFound { id });
        }
        debug!(user_id = id, "user soft-deleted");
        Ok(())
    }
}
