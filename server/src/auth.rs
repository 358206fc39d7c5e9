//! Delegated authentication
//!
//! Sign-in happens at an identity-aware proxy in front of this server. The
//! proxy forwards the verified subject and email as request headers; `login`
//! turns those into a user row and a session token. Every other API route
//! requires that token (or, when explicitly trusted, the headers themselves).

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use relief_core::model::{ProfilePatch, UpsertUser, User, UserRole};
use relief_core::{AuthConfig, ChangeAction, ChangeEvent, EntityKind, Validate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// The authenticated user for this request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: UserRole,
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Identity claims forwarded by the proxy, if present.
pub fn identity_from_headers(headers: &HeaderMap, config: &AuthConfig) -> Option<UpsertUser> {
    let id = header_value(headers, &config.user_header)?;
    Some(UpsertUser {
        id,
        email: header_value(headers, &config.email_header),
        first_name: header_value(headers, &config.name_header),
        last_name: None,
        profile_image_url: None,
    })
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> ApiResult<User> {
    if let Some(token) = bearer_token(headers) {
        return match state.store.session_user(token).await? {
            Some(user) => Ok(user),
            None => {
                debug!(target: "auth", "Unknown or expired session token");
                Err(ApiError::Unauthorized)
            }
        };
    }

    if state.auth.trust_identity_headers {
        if let Some(claims) = identity_from_headers(headers, &state.auth) {
            claims.validate()?;
            return Ok(state.store.upsert_user(&claims).await?);
        }
    }

    Err(ApiError::Unauthorized)
}

/// Middleware guarding every authenticated route
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// POST /api/login
pub async fn login(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let claims = identity_from_headers(&headers, &state.auth).ok_or_else(|| {
        warn!(target: "auth", "Login attempted without identity headers");
        ApiError::Unauthorized
    })?;
    claims.validate()?;

    let user = state.store.upsert_user(&claims).await?;
    let session = state
        .store
        .create_session(&user.id, state.auth.session_ttl())
        .await?;

    info!(target: "auth", user_id = %user.id, role = %user.role, "User signed in");
    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        user,
    })
    .into_response())
}

/// POST /api/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<StatusCode> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;
    if state.store.delete_session(token).await? {
        info!(target: "auth", "Session ended");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/user
pub async fn current_user(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<User> {
    Json(user)
}

/// PATCH /api/auth/user
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: Result<Json<ProfilePatch>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(patch) = payload?;
    patch.validate()?;

    let updated = state.store.update_profile(&user.id, &patch).await?;
    state.events.broadcast(ChangeEvent::new(
        EntityKind::User,
        ChangeAction::Updated,
        &updated.id,
        Some(&user.id),
    ));
    Ok(Json(updated))
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.store.list_users().await?))
}

/// PATCH /api/users/:id/role (district officers only)
pub async fn set_role(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<RoleChange>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Path(user_id) = path?;
    let Json(change) = payload?;

    if actor.role != UserRole::DistrictOfficer {
        warn!(target: "auth", actor = %actor.id, target_user = %user_id, "Role change refused");
        return Err(ApiError::Forbidden);
    }

    let updated = state.store.set_user_role(&user_id, change.role).await?;
    state.events.broadcast(ChangeEvent::new(
        EntityKind::User,
        ChangeAction::Updated,
        &updated.id,
        Some(&actor.id),
    ));
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn reads_configured_identity_headers() {
        let config = AuthConfig::default();
        let mut headers = HeaderMap::new();
        headers.insert("x-auth-request-user", HeaderValue::from_static("sub-42"));
        headers.insert("x-auth-request-email", HeaderValue::from_static("a@ngo.org"));

        let claims = identity_from_headers(&headers, &config).unwrap();
        assert_eq!(claims.id, "sub-42");
        assert_eq!(claims.email.as_deref(), Some("a@ngo.org"));
        assert!(claims.first_name.is_none());
    }

    #[test]
    fn blank_subject_is_no_identity() {
        let config = AuthConfig::default();
        let mut headers = HeaderMap::new();
        headers.insert("x-auth-request-user", HeaderValue::from_static("  "));
        assert!(identity_from_headers(&headers, &config).is_none());
    }

    #[test]
    fn parses_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }
}
