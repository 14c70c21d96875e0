//! In-process stand-in for the Postgres repository, used by handler tests.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::users::{
    repo::{RepoError, UserRepository},
    repo_types::{NewUser, User},
};

#[derive(Default)]
struct Table {
    rows: Vec<User>,
    last_id: i64,
}

impl Table {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.rows
            .iter()
            .any(|u| u.deleted_at.is_none() && u.email == email && Some(u.id) != except)
    }

    fn live_mut(&mut self, id: i64) -> Option<&mut User> {
        self.rows
            .iter_mut()
            .find(|u| u.id == id && u.deleted_at.is_none())
    }
}

/// Mirrors the store semantics: identity ids, partial unique index on email, soft delete.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: Mutex<Table>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, input: NewUser) -> Result<User, RepoError> {
        let mut t = self.table.lock().await;
        if t.email_taken(&input.email, None) {
            return Err(RepoError::ConstraintViolation { field: "email" });
        }
        t.last_id += 1;
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: t.last_id,
            name: input.name,
            email: input.email,
            age: input.age,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        t.rows.push(user.clone());
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        let t = self.table.lock().await;
        Ok(t.rows
            .iter()
            .filter(|u| u.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<User, RepoError> {
        let t = self.table.lock().await;
        t.rows
            .iter()
            .find(|u| u.id == id && u.deleted_at.is_none())
            .cloned()
            .ok_or(RepoError::NotFound { id })
    }

    async fn update(&self, id: i64, input: NewUser) -> Result<User, RepoError> {
        let mut t = self.table.lock().await;
        if t.live_mut(id).is_none() {
            return Err(RepoError::NotFound { id });
        }
        if t.email_taken(&input.email, Some(id)) {
            return Err(RepoError::ConstraintViolation { field: "email" });
        }
        let user = t.live_mut(id).ok_or(RepoError::NotFound { id })?;
        user.name = input.name;
        user.email = input.email;
        user.age = input.age;
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn soft_delete(&self, id: i64) -> Result<(), RepoError> {
        let mut t = self.table.lock().await;
        let user = t.live_mut(id).ok_or(RepoError::NotFound { id })?;
        user.deleted_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }
}

/// Fails every call the way an unreachable store would.
pub struct UnavailableUserRepository;

#[async_trait]
impl UserRepository for UnavailableUserRepository {
    async fn create(&self, _input: NewUser) -> Result<User, RepoError> {
        Err(RepoError::Unavailable("pool timed out".into()))
    }
    async fn list(&self) -> Result<Vec<User>, RepoError> {
        Err(RepoError::Unavailable("pool timed out".into()))
    }
    async fn get_by_id(&self, _id: i64) -> Result<User, RepoError> {
        Err(RepoError::Unavailable("pool timed out".into()))
    }
    async fn update(&self, _id: i64, _input: NewUser) -> Result<User, RepoError> {
        Err(RepoError::Unavailable("pool timed out".into()))
    }
    async fn soft_delete(&self, _id: i64) -> Result<(), RepoError> {
        Err(RepoError::Unavailable("pool timed out".into()))
    }
}
