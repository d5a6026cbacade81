use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Extension, Path, Query, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use sweetshop_auth::{Caller, InventoryOperation};
use sweetshop_core::{SweetId, ValidationError};

use crate::app::dto::{self, QuantityRequest, SearchParams, SweetRequest, SweetResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::authorize_operation;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_sweets).post(create_sweet))
        .route("/search", get(search_sweets))
        .route("/:id", get(get_sweet).put(update_sweet).delete(delete_sweet))
        .route("/:id/purchase", post(purchase_sweet))
        .route("/:id/restock", post(restock_sweet))
}

/// Non-numeric or non-positive ids name no record.
fn parse_id(raw: &str) -> Result<SweetId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(format!("sweet '{raw}' not found")))
}

/// Parse an optional quantity body; an empty body yields `None`.
fn parse_quantity(body: &Bytes) -> Result<Option<i64>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let request: QuantityRequest =
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(request.quantity)
}

pub async fn list_sweets(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<Caller>,
) -> Result<Response, ApiError> {
    authorize_operation(&services.policy, &caller, InventoryOperation::List)?;

    let records = services.inventory.list().await?;
    Ok(Json(dto::sweets_to_json(records)).into_response())
}

pub async fn search_sweets(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<Caller>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    authorize_operation(&services.policy, &caller, InventoryOperation::Search)?;

    let records = services.inventory.search(params.query()).await?;
    Ok(Json(dto::sweets_to_json(records)).into_response())
}

pub async fn get_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    authorize_operation(&services.policy, &caller, InventoryOperation::Get)?;
    let id = parse_id(&id)?;

    let record = services.inventory.get(id).await?;
    Ok(Json(SweetResponse::from(record)).into_response())
}

pub async fn create_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<Caller>,
    body: Result<Json<SweetRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    authorize_operation(&services.policy, &caller, InventoryOperation::Create)?;
    let Json(request) = body?;

    let record = services.inventory.create(&request.into_fields()?).await?;
    tracing::info!(sweet_id = %record.id, "sweet created");

    Ok((StatusCode::CREATED, Json(SweetResponse::from(record))).into_response())
}

pub async fn update_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    body: Result<Json<SweetRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    authorize_operation(&services.policy, &caller, InventoryOperation::Update)?;
    let id = parse_id(&id)?;
    let Json(request) = body?;

    let record = services.inventory.update(id, &request.into_fields()?).await?;
    Ok(Json(SweetResponse::from(record)).into_response())
}

pub async fn delete_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    authorize_operation(&services.policy, &caller, InventoryOperation::Delete)?;
    let id = parse_id(&id)?;

    services.inventory.delete(id).await?;
    tracing::info!(sweet_id = %id, "sweet deleted");

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn purchase_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    authorize_operation(&services.policy, &caller, InventoryOperation::Purchase)?;
    let id = parse_id(&id)?;
    let quantity = parse_quantity(&body)?.unwrap_or(1);

    let record = services.inventory.purchase(id, quantity).await?;
    Ok(Json(SweetResponse::from(record)).into_response())
}

pub async fn restock_sweet(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    authorize_operation(&services.policy, &caller, InventoryOperation::Restock)?;
    let id = parse_id(&id)?;
    let quantity = parse_quantity(&body)?.ok_or_else(|| ValidationError::required("quantity"))?;

    let record = services.inventory.restock(id, quantity).await?;
    tracing::info!(sweet_id = %id, quantity, "sweet restocked");

    Ok(Json(SweetResponse::from(record)).into_response())
}
