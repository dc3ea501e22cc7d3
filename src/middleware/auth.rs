use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{Claims, TokenService};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, attached to request extensions by [`require_auth`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

/// Verify the bearer token in `headers` and return the caller it names.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthUser, ApiError> {
    let token = extract_jwt_from_headers(headers).map_err(ApiError::unauthorized)?;
    let claims = tokens.verify(&token)?;
    Ok(AuthUser::from(claims))
}

/// Admin-only check; only meaningful on a caller [`authenticate`] produced.
pub fn authorize_admin(user: &AuthUser) -> Result<(), ApiError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin privileges required"))
    }
}

/// Passes for the named user themself or for any admin.
pub fn authorize_user_or_admin(user: &AuthUser, username: &str) -> Result<(), ApiError> {
    if user.is_admin || user.username == username {
        Ok(())
    } else {
        Err(ApiError::forbidden("Not permitted to access another user"))
    }
}

/// Rejects the request with 401 unless it carries a valid token, then
/// injects [`AuthUser`] for downstream layers and handlers.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = authenticate(request.headers(), &state.tokens).map_err(|e| {
        tracing::debug!("Authentication rejected: {}", e);
        e
    })?;

    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Rejects non-admin callers with 403. Must be layered inside [`require_auth`];
/// without an [`AuthUser`] in the request it answers 401.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if let Err(e) = authorize_admin(auth_user) {
        tracing::warn!("Admin access denied for '{}'", auth_user.username);
        return Err(e);
    }

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        let token = token.trim();
        if token.is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, StatusCode};

    fn tokens() -> TokenService {
        TokenService::new("gate-secret", 1).unwrap()
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token)).unwrap());
        headers
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let err = authenticate(&HeaderMap::new(), &tokens()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn non_bearer_scheme_is_unauthorized() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dTE6cHc="));
        assert_eq!(
            authenticate(&headers, &tokens()).unwrap_err().status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            authenticate(&bearer("  "), &tokens()).unwrap_err().status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn valid_token_authenticates() {
        let tokens = tokens();
        let token = tokens.issue("u1", false).unwrap();
        let user = authenticate(&bearer(&token), &tokens).unwrap();
        assert_eq!(
            user,
            AuthUser {
                username: "u1".to_string(),
                is_admin: false
            }
        );
    }

    #[test]
    fn token_from_other_secret_is_unauthorized() {
        let foreign = TokenService::new("someone-else", 1).unwrap().issue("u1", true).unwrap();
        let err = authenticate(&bearer(&foreign), &tokens()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn non_admin_passes_auth_but_fails_admin_gate() {
        let tokens = tokens();
        let token = tokens.issue("u1", false).unwrap();
        let user = authenticate(&bearer(&token), &tokens).unwrap();
        let err = authorize_admin(&user).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn admin_passes_both_gates() {
        let tokens = tokens();
        let token = tokens.issue("boss", true).unwrap();
        let user = authenticate(&bearer(&token), &tokens).unwrap();
        assert!(authorize_admin(&user).is_ok());
    }

    #[test]
    fn gates_are_deterministic() {
        let tokens = tokens();
        let headers = bearer(&tokens.issue("u1", false).unwrap());
        for _ in 0..3 {
            assert!(authenticate(&headers, &tokens).is_ok());
        }
    }

    #[test]
    fn same_user_or_admin() {
        let u1 = AuthUser { username: "u1".into(), is_admin: false };
        let admin = AuthUser { username: "root".into(), is_admin: true };
        assert!(authorize_user_or_admin(&u1, "u1").is_ok());
        assert!(authorize_user_or_admin(&admin, "u1").is_ok());
        assert_eq!(
            authorize_user_or_admin(&u1, "u2").unwrap_err().status_code(),
            StatusCode::FORBIDDEN
        );
    }
}
