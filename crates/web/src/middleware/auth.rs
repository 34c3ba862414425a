use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::WebError;

/// Header carrying the caller's user id, set by the authentication gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Rejects requests without a known bearer API key.
pub async fn require_auth(
    State(api_keys): State<ApiKeys>,
    req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if api_keys.is_valid(token.trim()) => Ok(next.run(req).await),
        Some(_) => {
            tracing::warn!("Invalid API key attempt");
            Err(WebError::Unauthorized)
        }
        None => Err(WebError::Unauthorized),
    }
}

/// Lets anonymous requests through, but a request claiming a caller identity
/// must carry a known bearer API key like any authenticated route.
pub async fn require_auth_if_identified(
    state: State<ApiKeys>,
    req: Request,
    next: Next,
) -> Result<Response, WebError> {
    if req.headers().contains_key(USER_ID_HEADER) {
        require_auth(state, req, next).await
    } else {
        Ok(next.run(req).await)
    }
}

#[derive(Clone, Default)]
pub struct ApiKeys {
    keys: Arc<HashSet<String>>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self {
            keys: Arc::new(keys),
        }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Identity of the authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or(WebError::Unauthorized)?;

        Ok(Self { user_id })
    }
}
