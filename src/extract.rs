//! Credential extraction from incoming requests.
//!
//! Works on plain [`http`] types so the same functions serve the axum
//! layer, the blocking service, and anything else that can hand over a
//! header map. Extraction never fails; absence is `None`.

use http::{HeaderMap, header};

use crate::settings::Settings;

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Extract the token from an `Authorization: Bearer <token>` header.
/// The scheme is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Locate an access token in a request.
///
/// The Authorization header wins over the access cookie when both are
/// present; each source is consulted only if the matching `accept_*`
/// switch is on.
pub fn extract_access_token<'a>(headers: &'a HeaderMap, settings: &Settings) -> Option<&'a str> {
    if settings.accept_header() {
        if let Some(token) = bearer_token(headers) {
            return Some(token);
        }
    }
    if settings.accept_cookie() {
        if let Some(token) = get_cookie(headers, settings.cookie_name_access()) {
            return Some(token);
        }
    }
    None
}

/// Locate a refresh token in a request.
///
/// Same precedence as [`extract_access_token`] with a final fallback to
/// a string `refresh_token` field in the parsed JSON body, for clients
/// that can set neither header nor cookie.
pub fn extract_refresh_token<'a>(
    headers: &'a HeaderMap,
    settings: &Settings,
    body: Option<&'a serde_json::Value>,
) -> Option<&'a str> {
    if settings.accept_header() {
        if let Some(token) = bearer_token(headers) {
            return Some(token);
        }
    }
    if settings.accept_cookie() {
        if let Some(token) = get_cookie(headers, settings.cookie_name_refresh()) {
            return Some(token);
        }
    }
    body?.get("refresh_token")?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn settings() -> Settings {
        Settings::new(b"test-secret".to_vec())
    }

    fn headers(pairs: &[(http::HeaderName, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(name.clone(), HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_get_cookie_simple() {
        let headers = headers(&[(header::COOKIE, "access_token=abc123")]);
        assert_eq!(get_cookie(&headers, "access_token"), Some("abc123"));
    }

    #[test]
    fn test_get_cookie_multiple() {
        let headers = headers(&[(
            header::COOKIE,
            "foo=bar; access_token=abc123; refresh_token=xyz789",
        )]);

        assert_eq!(get_cookie(&headers, "access_token"), Some("abc123"));
        assert_eq!(get_cookie(&headers, "refresh_token"), Some("xyz789"));
        assert_eq!(get_cookie(&headers, "foo"), Some("bar"));
    }

    #[test]
    fn test_get_cookie_not_found() {
        let headers = headers(&[(header::COOKIE, "foo=bar")]);
        assert_eq!(get_cookie(&headers, "access_token"), None);
    }

    #[test]
    fn test_get_cookie_no_header() {
        let headers = HeaderMap::new();
        assert_eq!(get_cookie(&headers, "access_token"), None);
    }

    #[test]
    fn test_get_cookie_with_spaces() {
        let headers = headers(&[(header::COOKIE, "  access_token = abc123  ; foo=bar")]);
        assert_eq!(get_cookie(&headers, "access_token"), Some("abc123"));
    }

    #[test]
    fn test_access_from_bearer_header() {
        let headers = headers(&[(header::AUTHORIZATION, "Bearer tok123")]);
        assert_eq!(extract_access_token(&headers, &settings()), Some("tok123"));
    }

    #[test]
    fn test_bearer_scheme_case_insensitive() {
        let headers = headers(&[(header::AUTHORIZATION, "bearer tok123")]);
        assert_eq!(extract_access_token(&headers, &settings()), Some("tok123"));
    }

    #[test]
    fn test_bearer_without_token_ignored() {
        let headers = headers(&[(header::AUTHORIZATION, "Bearer ")]);
        assert_eq!(extract_access_token(&headers, &settings()), None);
    }

    #[test]
    fn test_non_bearer_scheme_ignored() {
        let headers = headers(&[(header::AUTHORIZATION, "Basic dXNlcjpwdw==")]);
        assert_eq!(extract_access_token(&headers, &settings()), None);
    }

    #[test]
    fn test_access_from_cookie() {
        let headers = headers(&[(header::COOKIE, "access_token=cookie-tok")]);
        assert_eq!(
            extract_access_token(&headers, &settings()),
            Some("cookie-tok")
        );
    }

    #[test]
    fn test_header_beats_cookie() {
        let headers = headers(&[
            (header::AUTHORIZATION, "Bearer header-tok"),
            (header::COOKIE, "access_token=cookie-tok"),
        ]);
        assert_eq!(
            extract_access_token(&headers, &settings()),
            Some("header-tok")
        );
    }

    #[test]
    fn test_accept_header_disabled() {
        let settings = Settings::builder(b"s".to_vec())
            .with_accept_header(false)
            .build();
        let headers = headers(&[
            (header::AUTHORIZATION, "Bearer header-tok"),
            (header::COOKIE, "access_token=cookie-tok"),
        ]);

        assert_eq!(
            extract_access_token(&headers, &settings),
            Some("cookie-tok")
        );
    }

    #[test]
    fn test_accept_cookie_disabled() {
        let settings = Settings::builder(b"s".to_vec())
            .with_accept_cookie(false)
            .build();
        let headers = headers(&[(header::COOKIE, "access_token=cookie-tok")]);

        assert_eq!(extract_access_token(&headers, &settings), None);
    }

    #[test]
    fn test_both_sources_disabled() {
        let settings = Settings::builder(b"s".to_vec())
            .with_accept_header(false)
            .with_accept_cookie(false)
            .build();
        let headers = headers(&[
            (header::AUTHORIZATION, "Bearer header-tok"),
            (header::COOKIE, "access_token=cookie-tok"),
        ]);

        assert_eq!(extract_access_token(&headers, &settings), None);
    }

    #[test]
    fn test_custom_cookie_name() {
        let settings = Settings::builder(b"s".to_vec())
            .with_cookie_name_access("at")
            .build();
        let headers = headers(&[(header::COOKIE, "at=tok; access_token=decoy")]);

        assert_eq!(extract_access_token(&headers, &settings), Some("tok"));
    }

    #[test]
    fn test_refresh_from_cookie() {
        let headers = headers(&[(header::COOKIE, "refresh_token=rt-1")]);
        assert_eq!(
            extract_refresh_token(&headers, &settings(), None),
            Some("rt-1")
        );
    }

    #[test]
    fn test_refresh_body_fallback() {
        let headers = HeaderMap::new();
        let body = serde_json::json!({ "refresh_token": "rt-body" });

        assert_eq!(
            extract_refresh_token(&headers, &settings(), Some(&body)),
            Some("rt-body")
        );
    }

    #[test]
    fn test_refresh_from_bearer_header() {
        let headers = headers(&[(header::AUTHORIZATION, "Bearer rt-header")]);
        assert_eq!(
            extract_refresh_token(&headers, &settings(), None),
            Some("rt-header")
        );
    }

    #[test]
    fn test_refresh_header_beats_cookie_and_body() {
        let headers = headers(&[
            (header::AUTHORIZATION, "Bearer rt-header"),
            (header::COOKIE, "refresh_token=rt-cookie"),
        ]);
        let body = serde_json::json!({ "refresh_token": "rt-body" });

        assert_eq!(
            extract_refresh_token(&headers, &settings(), Some(&body)),
            Some("rt-header")
        );
    }

    #[test]
    fn test_refresh_cookie_beats_body() {
        let headers = headers(&[(header::COOKIE, "refresh_token=rt-cookie")]);
        let body = serde_json::json!({ "refresh_token": "rt-body" });

        assert_eq!(
            extract_refresh_token(&headers, &settings(), Some(&body)),
            Some("rt-cookie")
        );
    }

    #[test]
    fn test_refresh_body_must_be_string() {
        let headers = HeaderMap::new();
        let body = serde_json::json!({ "refresh_token": 42 });

        assert_eq!(extract_refresh_token(&headers, &settings(), Some(&body)), None);
    }

    #[test]
    fn test_refresh_absent_everywhere() {
        let headers = HeaderMap::new();
        let body = serde_json::json!({});

        assert_eq!(extract_refresh_token(&headers, &settings(), Some(&body)), None);
        assert_eq!(extract_refresh_token(&headers, &settings(), None), None);
    }
}
