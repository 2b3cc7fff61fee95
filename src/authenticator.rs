//! Request authentication: from header map to account.

use std::str::FromStr;
use std::sync::Arc;

use http::HeaderMap;

use crate::error::AuthError;
use crate::extract::extract_access_token;
use crate::repo::{Identity, UserRepository};
use crate::settings::Settings;
use crate::token::decode_access;

pub(crate) const NOT_AUTHENTICATED: &str = "Not authenticated";
pub(crate) const INVALID_PAYLOAD: &str = "Invalid token payload";
pub(crate) const USER_NOT_FOUND: &str = "User not found";

/// Parse a `sub` claim into a repository id. Empty and malformed
/// subjects are both credential failures, not internal errors.
pub(crate) fn parse_subject<I: FromStr>(sub: &str) -> Result<I, AuthError> {
    if sub.is_empty() {
        return Err(AuthError::unauthorized(INVALID_PAYLOAD));
    }
    sub.parse()
        .map_err(|_| AuthError::unauthorized(INVALID_PAYLOAD))
}

/// Resolves the account behind an incoming request.
///
/// Every failure along the pipeline (no token, rejected token, bad
/// subject, unknown account) is `Unauthorized`; the distinct messages
/// exist for logs, not for callers.
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

    pub async fn current_user(&self, headers: &HeaderMap) -> Result<R::User, AuthError> {
        let token = extract_access_token(headers, &self.settings)
            .ok_or_else(|| AuthError::unauthorized(NOT_AUTHENTICATED))?;
        let claims = decode_access(&self.settings, token)?;
        let id = parse_subject::<<R::User as Identity>::Id>(&claims.sub)?;

        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| AuthError::unauthorized(USER_NOT_FOUND))
    }
}
