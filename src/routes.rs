//! Auth API endpoints.
//!
//! - POST `/register` - Create an account
//! - POST `/login` - Verify credentials, issue a token pair
//! - POST `/refresh` - Exchange a refresh token for a new pair
//! - POST `/logout` - Clear auth cookies
//! - GET `/me` - Current account, resolved from the request
//!
//! Mount with [`router`], or implement [`HasAuthBackend`] on your own
//! state and use [`CurrentUser`] to protect arbitrary routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{HeaderName, HeaderValue, StatusCode, header, header::SET_COOKIE, request::Parts},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::authenticator::Authenticator;
use crate::error::AuthError;
use crate::extract::extract_refresh_token;
use crate::repo::{Identity, UserRepository};
use crate::service::AuthService;
use crate::settings::Settings;
use crate::token::TokenPair;

const REFRESH_NOT_FOUND: &str = "Refresh token not found";

/// State for the auth router. The repository must be cheap to clone;
/// pool-backed and Arc-backed repositories are.
#[derive(Clone)]
pub struct AuthState<R> {
    pub settings: Arc<Settings>,
    pub repo: R,
}

impl<R> AuthState<R> {
    pub fn new(settings: Arc<Settings>, repo: R) -> Self {
        Self { settings, repo }
    }
}

/// Seam for apps that carry their own state type. Implementing this
/// makes [`CurrentUser`] usable in any handler on that state.
pub trait HasAuthBackend {
    type Repo: UserRepository + Clone;

    fn settings(&self) -> &Arc<Settings>;
    fn repo(&self) -> &Self::Repo;
}

impl<R> HasAuthBackend for AuthState<R>
where
    R: UserRepository + Clone,
{
    type Repo = R;

    fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    fn repo(&self) -> &R {
        &self.repo
    }
}

/// Extractor that resolves the account behind the request.
/// Rejects with 401 on any authentication failure.
pub struct CurrentUser<U>(pub U);

impl<S> FromRequestParts<S> for CurrentUser<<S::Repo as UserRepository>::User>
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authenticator = Authenticator::new(state.settings().clone(), state.repo().clone());
        let user = authenticator.current_user(&parts.headers).await?;
        Ok(CurrentUser(user))
    }
}

/// Build the auth router.
pub fn router<R>(state: AuthState<R>) -> Router
where
    R: UserRepository + Clone + 'static,
    <R::User as Identity>::Id: Serialize,
{
    Router::new()
        .route("/register", post(register::<R>))
        .route("/login", post(login::<R>))
        .route("/refresh", post(refresh::<R>))
        .route("/logout", post(logout::<R>))
        .route("/me", get(me::<R>))
        .with_state(state)
}

#[derive(Deserialize)]
struct RegisterRequest {
    email: String,
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    username_or_email: String,
    password: String,
}

fn service<R: UserRepository + Clone>(state: &AuthState<R>) -> AuthService<R> {
    AuthService::new(state.settings.clone(), state.repo.clone())
}

fn set_cookie(settings: &Settings, name: &str, value: &str, max_age: u64) -> String {
    let secure = if settings.cookie_secure() { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite={}; Path=/; Max-Age={}{}",
        name,
        value,
        settings.cookie_samesite().as_str(),
        max_age,
        secure
    )
}

fn clear_cookie(settings: &Settings, name: &str) -> String {
    let secure = if settings.cookie_secure() { "; Secure" } else { "" };
    format!(
        "{}=; HttpOnly; SameSite={}; Path=/; Max-Age=0{}",
        name,
        settings.cookie_samesite().as_str(),
        secure
    )
}

/// Set-Cookie headers for a freshly issued pair. Empty unless the
/// settings ask for cookies; the refresh cookie is only re-set when a
/// new refresh token was actually minted.
fn pair_cookies(settings: &Settings, pair: &TokenPair) -> Vec<(HeaderName, String)> {
    if !settings.set_cookie_on_login() {
        return Vec::new();
    }

    let mut cookies = vec![(
        SET_COOKIE,
        set_cookie(
            settings,
            settings.cookie_name_access(),
            &pair.access,
            settings.cookie_max_age_access(),
        ),
    )];
    if let Some(refresh) = &pair.refresh {
        cookies.push((
            SET_COOKIE,
            set_cookie(
                settings,
                settings.cookie_name_refresh(),
                refresh,
                settings.cookie_max_age_refresh(),
            ),
        ));
    }
    cookies
}

async fn register<R>(
    State(state): State<AuthState<R>>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError>
where
    R: UserRepository + Clone,
    <R::User as Identity>::Id: Serialize,
{
    let user = service(&state)
        .create_user(&body.email, &body.username, &body.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id(),
            "email": user.email(),
            "username": user.username(),
            "is_staff": user.is_staff(),
            "is_active": user.is_active(),
        })),
    ))
}

async fn login<R>(
    State(state): State<AuthState<R>>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError>
where
    R: UserRepository + Clone,
{
    let svc = service(&state);
    let user = svc.authenticate(&body.username_or_email, &body.password).await?;
    let pair = svc.assign_token(&user)?;

    let cookies = pair_cookies(&state.settings, &pair);
    Ok((
        StatusCode::OK,
        AppendHeaders(cookies),
        Json(json!({
            "access_token": pair.access,
            "refresh_token": pair.refresh,
        })),
    ))
}

async fn refresh<R>(
    State(state): State<AuthState<R>>,
    headers: http::HeaderMap,
    body: Option<Json<serde_json::Value>>,
) -> Result<impl IntoResponse, AuthError>
where
    R: UserRepository + Clone,
{
    let body = body.map(|Json(value)| value);
    let token = extract_refresh_token(&headers, &state.settings, body.as_ref())
        .ok_or_else(|| AuthError::unauthorized(REFRESH_NOT_FOUND))?;

    let pair = service(&state).refresh_pair(token)?;

    let cookies = pair_cookies(&state.settings, &pair);
    Ok((
        StatusCode::OK,
        AppendHeaders(cookies),
        Json(json!({
            "access_token": pair.access,
            "refresh_token": pair.refresh,
        })),
    ))
}

async fn logout<R>(State(state): State<AuthState<R>>) -> impl IntoResponse
where
    R: UserRepository + Clone,
{
    let clear = [
        (
            SET_COOKIE,
            clear_cookie(&state.settings, state.settings.cookie_name_access()),
        ),
        (
            SET_COOKIE,
            clear_cookie(&state.settings, state.settings.cookie_name_refresh()),
        ),
    ];

    (
        StatusCode::OK,
        AppendHeaders(clear),
        Json(json!({ "logout": "success", "ok": true })),
    )
}

async fn me<R>(CurrentUser(user): CurrentUser<R::User>) -> Json<serde_json::Value>
where
    R: UserRepository + Clone,
    <R::User as Identity>::Id: Serialize,
{
    Json(json!({
        "id": user.id(),
        "email": user.email(),
        "username": user.username(),
        "is_staff": user.is_staff(),
        "is_superuser": user.is_superuser(),
    }))
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AuthError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::Configuration(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let mut response = (status, Json(ErrorResponse { error: message })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
