//! Blocking variants of the repository, service, and authenticator.
//!
//! For callers without an async runtime (scripts, CLIs, threaded
//! servers). Policy comes from the same module-level functions the
//! async flavor uses, so behavior cannot drift; only the repository
//! call sites differ.

use std::sync::Arc;

use http::HeaderMap;

use crate::authenticator::{NOT_AUTHENTICATED, USER_NOT_FOUND, parse_subject};
use crate::error::AuthError;
use crate::extract::extract_access_token;
use crate::repo::{Identity, NewUser};
use crate::service::{CONFLICT_MESSAGE, check_password, issue_pair, new_user_record, rotate_pair};
use crate::settings::Settings;
use crate::token::{TokenPair, decode_access};

/// Blocking storage backend surface. Mirrors
/// [`crate::repo::UserRepository`] method for method.
pub trait UserRepository: Send + Sync {
    type User: Identity + Send + Sync;

    fn get_by_id(&self, id: <Self::User as Identity>::Id)
    -> Result<Option<Self::User>, AuthError>;

    fn get_by_email_or_username(&self, value: &str) -> Result<Option<Self::User>, AuthError>;

    fn create_user(&self, user: NewUser) -> Result<Self::User, AuthError>;
}

/// Blocking counterpart of [`crate::AuthService`].
pub struct AuthService<R> {
    settings: Arc<Settings>,
    repo: R,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(settings: Arc<Settings>, repo: R) -> Self {
        Self { settings, repo }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    fn create_with_flags(
        &self,
        email: &str,
        username: &str,
        password: &str,
        superuser: bool,
    ) -> Result<R::User, AuthError> {
        let existing = match self.repo.get_by_email_or_username(email)? {
            Some(user) => Some(user),
            None => self.repo.get_by_email_or_username(username)?,
        };
        if existing.is_some() {
            return Err(AuthError::conflict(CONFLICT_MESSAGE));
        }

        let record = new_user_record(email, username, password, superuser)?;
        self.repo.create_user(record)
    }

    /// Register a regular account.
    pub fn create_user(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<R::User, AuthError> {
        self.create_with_flags(email, username, password, false)
    }

    /// Register an account with the staff and superuser flags set.
    pub fn create_superuser(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<R::User, AuthError> {
        self.create_with_flags(email, username, password, true)
    }

    /// Verify a password against the account found by email or username.
    pub fn authenticate(&self, identifier: &str, password: &str) -> Result<R::User, AuthError> {
        let user = self.repo.get_by_email_or_username(identifier)?;
        check_password(user, password)
    }

    /// Mint a fresh token pair for an already-authenticated account.
    pub fn assign_token(&self, user: &R::User) -> Result<TokenPair, AuthError> {
        issue_pair(&self.settings, &user.id().to_string())
    }

    /// Exchange a valid refresh token for a new pair, honoring the
    /// rotation setting.
    pub fn refresh_pair(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        rotate_pair(&self.settings, refresh_token)
    }
}

/// Blocking counterpart of [`crate::Authenticator`].
pub struct Authenticator<R> {
    settings: Arc<Settings>,
    repo: R,
}

impl<R: UserRepository> Authenticator<R> {
    pub fn new(settings: Arc<Settings>, repo: R) -> Self {
        Self { settings, repo }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn current_user(&self, headers: &HeaderMap) -> Result<R::User, AuthError> {
        let token = extract_access_token(headers, &self.settings)
            .ok_or_else(|| AuthError::unauthorized(NOT_AUTHENTICATED))?;
        let claims = decode_access(&self.settings, token)?;
        let id = parse_subject::<<R::User as Identity>::Id>(&claims.sub)?;

        self.repo
            .get_by_id(id)?
            .ok_or_else(|| AuthError::unauthorized(USER_NOT_FOUND))
    }
}
