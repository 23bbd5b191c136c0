// libs/catalog-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, put},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::CatalogService;

pub fn create_catalog_router(config: Arc<AppConfig>, catalog: Arc<CatalogService>) -> Router {
    let public_routes = Router::new()
        .route("/", get(handlers::list_services))
        .with_state(catalog.clone());

    let protected_routes = Router::new()
        .route("/{service_id}", put(handlers::update_service_price))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(catalog);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
}
