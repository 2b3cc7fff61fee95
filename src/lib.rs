//! Token-based authentication building blocks: password hashing,
//! access/refresh token issuance, credential extraction, and an auth
//! service generic over a user repository.
//!
//! The core is transport-agnostic. The `axum` feature adds a drop-in
//! router and a `CurrentUser` extractor, the `sqlite` feature adds a
//! SQLite-backed repository, and the `cli` feature builds the
//! `authkit` binary for superuser bootstrap.

pub mod authenticator;
pub mod blocking;
#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "sqlite")]
pub mod db;
pub mod error;
pub mod extract;
pub mod hash;
pub mod memory;
pub mod repo;
#[cfg(feature = "axum")]
pub mod routes;
pub mod service;
pub mod settings;
pub mod token;

pub use authenticator::Authenticator;
pub use error::AuthError;
pub use extract::{extract_access_token, extract_refresh_token, get_cookie};
pub use hash::{hash_password, verify_password};
pub use memory::{MemoryRepository, MemoryUser};
pub use repo::{Identity, NewUser, UserRepository};
pub use service::AuthService;
pub use settings::{SameSite, Settings, SettingsBuilder};
pub use token::{
    Claims, TokenPair, TokenType, create_access_token, create_refresh_token, decode_access,
    decode_refresh,
};

#[cfg(feature = "sqlite")]
pub use db::{Database, StoredUser};
#[cfg(feature = "axum")]
pub use routes::{AuthState, CurrentUser, HasAuthBackend, router};
