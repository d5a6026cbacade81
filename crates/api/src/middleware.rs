use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use sweetshop_auth::{Caller, JwtValidator};

use crate::app::errors::ApiError;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Resolve the request's [`Caller`] and store it in request extensions.
///
/// No `Authorization` header means an anonymous caller; a header that does
/// not carry a valid access token is rejected with 401 here.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let caller = match resolve_caller(&state, req.headers()) {
        Ok(caller) => caller,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut().insert(caller);
    next.run(req).await
}

fn resolve_caller(state: &AuthState, headers: &HeaderMap) -> Result<Caller, ApiError> {
    let Some(token) = extract_bearer(headers)? else {
        return Ok(Caller::Anonymous);
    };

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::warn!(error = %e, "rejected bearer token");
        ApiError::InvalidToken("given token not valid for any token type".to_string())
    })?;

    Ok(Caller::Authenticated(claims.principal()))
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let invalid = || ApiError::InvalidToken("malformed Authorization header".to_string());

    let header = header.to_str().map_err(|_| invalid())?;
    let token = header.strip_prefix("Bearer ").ok_or_else(invalid)?.trim();
    if token.is_empty() {
        return Err(invalid());
    }

    Ok(Some(token))
}
