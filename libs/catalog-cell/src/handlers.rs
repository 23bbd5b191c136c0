// libs/catalog-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_admin;

use crate::models::{CatalogError, Service, UpdatePriceRequest};
use crate::services::CatalogService;

pub async fn list_services(
    State(catalog): State<Arc<CatalogService>>,
) -> Json<Vec<Service>> {
    Json(catalog.list().await)
}

pub async fn update_service_price(
    State(catalog): State<Arc<CatalogService>>,
    Extension(user): Extension<User>,
    Path(service_id): Path<u32>,
    Json(request): Json<UpdatePriceRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let service = catalog.update_price(service_id, &request.price).await
        .map_err(|e| match e {
            CatalogError::NotFound => AppError::NotFound("Service not found".to_string()),
            _ => AppError::ValidationError(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "service": service
    })))
}
