//! Toolkit configuration initialized once at startup.
//!
//! Values are immutable after construction and shared across all handlers,
//! typically as `Arc<Settings>`.

use jsonwebtoken::Algorithm;

/// SameSite attribute for the cookies the toolkit sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl SameSite {
    /// Attribute value as it appears in a Set-Cookie header.
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        }
    }
}

/// Immutable toolkit configuration.
///
/// Construct with [`Settings::new`] for the defaults or [`Settings::builder`]
/// to override individual knobs. There are no mutators; a process that needs
/// different behavior builds a new value.
#[derive(Clone)]
pub struct Settings {
    secret: Vec<u8>,
    algorithm: Algorithm,
    access_minutes: u64,
    refresh_days: u64,
    cookie_name_access: String,
    cookie_name_refresh: String,
    accept_header: bool,
    accept_cookie: bool,
    set_cookie_on_login: bool,
    cookie_secure: bool,
    cookie_samesite: SameSite,
    cookie_max_age_access: u64,
    cookie_max_age_refresh: u64,
    refresh_rotation: bool,
    blacklist_after_rotation: bool,
}

impl Settings {
    /// Settings with the default policy: HS256, 15 minute access tokens,
    /// 7 day refresh tokens, header and cookie extraction both enabled,
    /// secure Lax cookies, refresh rotation on.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self::builder(secret).build()
    }

    pub fn builder(secret: impl Into<Vec<u8>>) -> SettingsBuilder {
        SettingsBuilder {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            access_minutes: 15,
            refresh_days: 7,
            cookie_name_access: "access_token".to_string(),
            cookie_name_refresh: "refresh_token".to_string(),
            accept_header: true,
            accept_cookie: true,
            set_cookie_on_login: true,
            cookie_secure: true,
            cookie_samesite: SameSite::Lax,
            cookie_max_age_access: 900,
            cookie_max_age_refresh: 604_800,
            refresh_rotation: true,
            blacklist_after_rotation: true,
        }
    }

    /// Signing secret for the symmetric algorithm.
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Access token lifetime in minutes.
    pub fn access_minutes(&self) -> u64 {
        self.access_minutes
    }

    /// Refresh token lifetime in days.
    pub fn refresh_days(&self) -> u64 {
        self.refresh_days
    }

    pub fn cookie_name_access(&self) -> &str {
        &self.cookie_name_access
    }

    pub fn cookie_name_refresh(&self) -> &str {
        &self.cookie_name_refresh
    }

    /// Whether extraction reads the Authorization header.
    pub fn accept_header(&self) -> bool {
        self.accept_header
    }

    /// Whether extraction falls back to cookies.
    pub fn accept_cookie(&self) -> bool {
        self.accept_cookie
    }

    pub fn set_cookie_on_login(&self) -> bool {
        self.set_cookie_on_login
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    pub fn cookie_samesite(&self) -> SameSite {
        self.cookie_samesite
    }

    pub fn cookie_max_age_access(&self) -> u64 {
        self.cookie_max_age_access
    }

    pub fn cookie_max_age_refresh(&self) -> u64 {
        self.cookie_max_age_refresh
    }

    /// Whether a refresh mints a replacement refresh token.
    pub fn refresh_rotation(&self) -> bool {
        self.refresh_rotation
    }

    /// Policy hook only. When rotation is on, the jti of the replaced
    /// refresh token is the key a deployment-side denylist would record;
    /// the toolkit itself keeps no denylist.
    pub fn blacklist_after_rotation(&self) -> bool {
        self.blacklist_after_rotation
    }
}

/// Builder for [`Settings`].
pub struct SettingsBuilder {
    secret: Vec<u8>,
    algorithm: Algorithm,
    access_minutes: u64,
    refresh_days: u64,
    cookie_name_access: String,
    cookie_name_refresh: String,
    accept_header: bool,
    accept_cookie: bool,
    set_cookie_on_login: bool,
    cookie_secure: bool,
    cookie_samesite: SameSite,
    cookie_max_age_access: u64,
    cookie_max_age_refresh: u64,
    refresh_rotation: bool,
    blacklist_after_rotation: bool,
}

impl SettingsBuilder {
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_access_minutes(mut self, minutes: u64) -> Self {
        self.access_minutes = minutes;
        self
    }

    pub fn with_refresh_days(mut self, days: u64) -> Self {
        self.refresh_days = days;
        self
    }

    pub fn with_cookie_name_access(mut self, name: impl Into<String>) -> Self {
        self.cookie_name_access = name.into();
        self
    }

    pub fn with_cookie_name_refresh(mut self, name: impl Into<String>) -> Self {
        self.cookie_name_refresh = name.into();
        self
    }

    pub fn with_accept_header(mut self, accept: bool) -> Self {
        self.accept_header = accept;
        self
    }

    pub fn with_accept_cookie(mut self, accept: bool) -> Self {
        self.accept_cookie = accept;
        self
    }

    pub fn with_set_cookie_on_login(mut self, set: bool) -> Self {
        self.set_cookie_on_login = set;
        self
    }

    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    pub fn with_cookie_samesite(mut self, samesite: SameSite) -> Self {
        self.cookie_samesite = samesite;
        self
    }

    pub fn with_cookie_max_age_access(mut self, seconds: u64) -> Self {
        self.cookie_max_age_access = seconds;
        self
    }

    pub fn with_cookie_max_age_refresh(mut self, seconds: u64) -> Self {
        self.cookie_max_age_refresh = seconds;
        self
    }

    pub fn with_refresh_rotation(mut self, rotate: bool) -> Self {
        self.refresh_rotation = rotate;
        self
    }

    pub fn with_blacklist_after_rotation(mut self, blacklist: bool) -> Self {
        self.blacklist_after_rotation = blacklist;
        self
    }

    pub fn build(self) -> Settings {
        Settings {
            secret: self.secret,
            algorithm: self.algorithm,
            access_minutes: self.access_minutes,
            refresh_days: self.refresh_days,
            cookie_name_access: self.cookie_name_access,
            cookie_name_refresh: self.cookie_name_refresh,
            accept_header: self.accept_header,
            accept_cookie: self.accept_cookie,
            set_cookie_on_login: self.set_cookie_on_login,
            cookie_secure: self.cookie_secure,
            cookie_samesite: self.cookie_samesite,
            cookie_max_age_access: self.cookie_max_age_access,
            cookie_max_age_refresh: self.cookie_max_age_refresh,
            refresh_rotation: self.refresh_rotation,
            blacklist_after_rotation: self.blacklist_after_rotation,
        }
    }
}
