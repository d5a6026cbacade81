use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use sweetshop_auth::{Caller, Registration};

use crate::app::dto::{LoginRequest, RefreshRequest, SessionResponse, UserResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::require_principal;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Registration>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(registration) = body?;
    let session = services.auth.register(&registration).await?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse::new(session, Some("User registered successfully"))),
    )
        .into_response())
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    request.check()?;

    let session = services.auth.login(&request.username, &request.password).await?;
    Ok(Json(SessionResponse::new(session, None)).into_response())
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    if request.refresh_token.trim().is_empty() {
        return Err(sweetshop_core::ValidationError::required("refresh_token").into());
    }

    let pair = services.auth.refresh(request.refresh_token.trim()).await?;
    Ok(Json(pair).into_response())
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<Caller>,
) -> Result<Response, ApiError> {
    let principal = require_principal(&caller)?;
    let account = services.auth.current_user(principal).await?;
    Ok(Json(UserResponse::from(account)).into_response())
}
