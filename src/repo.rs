//! User identity and storage abstractions.
//!
//! The toolkit never owns accounts; it sees them through [`Identity`]
//! and reaches storage through [`UserRepository`]. Implement both for
//! your user type and every service in the crate works with it. A
//! blocking variant of the repository trait lives in [`crate::blocking`].

use std::fmt::Display;
use std::str::FromStr;

use async_trait::async_trait;

use crate::error::AuthError;

/// Read-only capability view of an account.
pub trait Identity {
    /// Primary key type. Rendered into the token `sub` claim via
    /// `Display` and parsed back via `FromStr`.
    type Id: Display + FromStr + Send;

    fn id(&self) -> Self::Id;
    fn email(&self) -> &str;
    fn username(&self) -> &str;
    fn password_hash(&self) -> &str;
    fn is_active(&self) -> bool;
    fn is_staff(&self) -> bool;
    fn is_superuser(&self) -> bool;
}

/// Field set for persisting a new account.
///
/// The password arrives here already hashed; no layer below the service
/// ever sees plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Async storage backend surface.
///
/// A failed call propagates immediately as an error; the toolkit never
/// retries. Uniqueness of email and username is primarily guarded by
/// the service's pre-check; backends with real constraints should map
/// violations to [`AuthError::Conflict`] to cover the racy window.
#[async_trait]
pub trait UserRepository: Send + Sync {
    type User: Identity + Send + Sync;

    /// Look up an account by primary key.
    async fn get_by_id(
        &self,
        id: <Self::User as Identity>::Id,
    ) -> Result<Option<Self::User>, AuthError>;

    /// Look up an account by email or username in a single call.
    async fn get_by_email_or_username(&self, value: &str)
    -> Result<Option<Self::User>, AuthError>;

    /// Persist a new account and return it with its id assigned.
    async fn create_user(&self, user: NewUser) -> Result<Self::User, AuthError>;
}
