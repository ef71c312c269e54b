use super::state::ServerState;
use crate::auth::validate_token;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

pub enum SessionExtractionError {
    Unauthorized,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        match self {
            SessionExtractionError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

async fn extract_session_token_from_cookies(
    parts: &mut Parts,
    ctx: &ServerState,
) -> Option<String> {
    // CookieJar extraction is infallible
    let jar = CookieJar::from_request_parts(parts, ctx).await.ok()?;
    jar.get(COOKIE_SESSION_TOKEN_KEY)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(|s| s.to_string())
}

fn extract_session_token_from_headers(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(HEADER_SESSION_TOKEN_KEY)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

async fn extract_session_from_request_parts(
    parts: &mut Parts,
    ctx: &ServerState,
) -> Option<Session> {
    let token = match extract_session_token_from_headers(parts) {
        Some(token) => token,
        None => match extract_session_token_from_cookies(parts, ctx).await {
            Some(token) => token,
            None => {
                debug!("No token in headers nor cookies.");
                return None;
            }
        },
    };

    match validate_token(&ctx.config.jwt_secret, &token) {
        Ok(claims) => Some(Session {
            user_id: claims.sub,
            email: claims.email,
        }),
        Err(e) => {
            debug!("Rejected token: {:#}", e);
            None
        }
    }
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx)
            .await
            .ok_or(SessionExtractionError::Unauthorized)
    }
}

impl axum::extract::OptionalFromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(extract_session_from_request_parts(parts, ctx).await)
    }
}
