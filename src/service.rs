//! Account and session policy.
//!
//! The rules live in module-level functions so the async service here
//! and the blocking mirror in [`crate::blocking`] cannot drift apart;
//! the two differ only at repository call sites.

use std::sync::Arc;

use rand::RngCore;

use crate::error::AuthError;
use crate::hash::{hash_password, verify_password};
use crate::repo::{Identity, NewUser, UserRepository};
use crate::settings::Settings;
use crate::token::{TokenPair, create_access_token, create_refresh_token, decode_refresh};

pub(crate) const CONFLICT_MESSAGE: &str = "User with this email or username already exists";
pub(crate) const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Fresh 128-bit token id, hex encoded.
pub(crate) fn fresh_jti() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Stored field set for a new account. Regular accounts are active and
/// nothing else; superusers get all three flags.
pub(crate) fn new_user_record(
    email: &str,
    username: &str,
    password: &str,
    superuser: bool,
) -> Result<NewUser, AuthError> {
    Ok(NewUser {
        email: email.to_string(),
        username: username.to_string(),
        password_hash: hash_password(password)?,
        is_active: true,
        is_staff: superuser,
        is_superuser: superuser,
    })
}

/// Conflict pre-check plus insert. Account creation involves no token
/// settings, so callers that have none (the CLI bootstrap) come here
/// directly.
pub(crate) async fn create_account<R: UserRepository>(
    repo: &R,
    email: &str,
    username: &str,
    password: &str,
    superuser: bool,
) -> Result<R::User, AuthError> {
    let existing = match repo.get_by_email_or_username(email).await? {
        Some(user) => Some(user),
        None => repo.get_by_email_or_username(username).await?,
    };
    if existing.is_some() {
        return Err(AuthError::conflict(CONFLICT_MESSAGE));
    }

    let record = new_user_record(email, username, password, superuser)?;
    repo.create_user(record).await
}

/// Credential check. A missing account and a wrong password produce the
/// same error so the caller cannot probe which accounts exist.
pub(crate) fn check_password<U: Identity>(user: Option<U>, password: &str) -> Result<U, AuthError> {
    match user {
        Some(user) if verify_password(password, user.password_hash()) => Ok(user),
        _ => Err(AuthError::unauthorized(INVALID_CREDENTIALS)),
    }
}

/// Mint a fresh access/refresh pair for a subject.
pub(crate) fn issue_pair(settings: &Settings, subject: &str) -> Result<TokenPair, AuthError> {
    let access = create_access_token(settings, subject)?;
    let refresh = create_refresh_token(settings, subject, &fresh_jti())?;
    Ok(TokenPair {
        access,
        refresh: Some(refresh),
    })
}

/// Exchange a refresh token for a new pair.
///
/// The new access token is always minted; a new refresh token (with a
/// fresh jti) only when rotation is enabled. With rotation off the
/// caller keeps presenting its original refresh token.
pub(crate) fn rotate_pair(settings: &Settings, refresh_token: &str) -> Result<TokenPair, AuthError> {
    let claims = decode_refresh(settings, refresh_token)?;
    let access = create_access_token(settings, &claims.sub)?;
    let refresh = if settings.refresh_rotation() {
        Some(create_refresh_token(settings, &claims.sub, &fresh_jti())?)
    } else {
        None
    };
    Ok(TokenPair { access, refresh })
}

/// Account and session operations over an async [`UserRepository`].
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

    async fn create_with_flags(
        &self,
        email: &str,
        username: &str,
        password: &str,
        superuser: bool,
    ) -> Result<R::User, AuthError> {
        create_account(&self.repo, email, username, password, superuser).await
    }

    /// Register a regular account.
    ///
    /// Both email and username must be unused; either collision is a
    /// `Conflict`. Nothing is written until the check has passed.
    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<R::User, AuthError> {
        self.create_with_flags(email, username, password, false).await
    }

    /// Register an account with the staff and superuser flags set.
    pub async fn create_superuser(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<R::User, AuthError> {
        self.create_with_flags(email, username, password, true).await
    }

    /// Verify a password against the account found by email or username.
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<R::User, AuthError> {
        let user = self.repo.get_by_email_or_username(identifier).await?;
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
