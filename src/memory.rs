//! In-memory user repository.
//!
//! Backs tests, examples, and short-lived tools that do not want a
//! database. Uniqueness of email and username is not enforced here;
//! the service pre-check is the guard.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::blocking;
use crate::error::AuthError;
use crate::repo::{Identity, NewUser, UserRepository};

/// Account record stored by [`MemoryRepository`].
#[derive(Debug, Clone)]
pub struct MemoryUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl Identity for MemoryUser {
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

/// Mutex-guarded store with sequential i64 ids. Clones share the same
/// underlying store, so one repository can serve a service and an
/// authenticator at once.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    inner: Arc<Mutex<Vec<MemoryUser>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn users(&self) -> Result<MutexGuard<'_, Vec<MemoryUser>>, AuthError> {
        self.inner
            .lock()
            .map_err(|_| AuthError::internal("Repository lock poisoned"))
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<MemoryUser>, AuthError> {
        Ok(self.users()?.iter().find(|u| u.id == id).cloned())
    }

    pub fn get_by_email_or_username(&self, value: &str) -> Result<Option<MemoryUser>, AuthError> {
        Ok(self
            .users()?
            .iter()
            .find(|u| u.email == value || u.username == value)
            .cloned())
    }

    pub fn create_user(&self, user: NewUser) -> Result<MemoryUser, AuthError> {
        let mut users = self.users()?;
        let created = MemoryUser {
            id: users.len() as i64 + 1,
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        };
        users.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    type User = MemoryUser;

    async fn get_by_id(&self, id: i64) -> Result<Option<MemoryUser>, AuthError> {
        MemoryRepository::get_by_id(self, id)
    }

    async fn get_by_email_or_username(&self, value: &str) -> Result<Option<MemoryUser>, AuthError> {
        MemoryRepository::get_by_email_or_username(self, value)
    }

    async fn create_user(&self, user: NewUser) -> Result<MemoryUser, AuthError> {
        MemoryRepository::create_user(self, user)
    }
}

impl blocking::UserRepository for MemoryRepository {
    type User = MemoryUser;

    fn get_by_id(&self, id: i64) -> Result<Option<MemoryUser>, AuthError> {
        MemoryRepository::get_by_id(self, id)
    }

    fn get_by_email_or_username(&self, value: &str) -> Result<Option<MemoryUser>, AuthError> {
        MemoryRepository::get_by_email_or_username(self, value)
    }

    fn create_user(&self, user: NewUser) -> Result<MemoryUser, AuthError> {
        MemoryRepository::create_user(self, user)
    }
}
