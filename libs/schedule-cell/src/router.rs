// libs/schedule-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, ScheduleHandlers};
use crate::services::ScheduleService;

pub fn create_schedule_router(config: Arc<AppConfig>, schedule_service: Arc<ScheduleService>) -> Router {
    let handlers = Arc::new(ScheduleHandlers::new(config.clone(), schedule_service));

    let public_routes = Router::new()
        .route("/blocked-dates", get(handlers::list_blocked_dates))
        .route("/disabled-time-slots", get(handlers::list_disabled_time_slots))
        .with_state(handlers.clone());

    // Admin only; role is checked in the handlers
    let protected_routes = Router::new()
        .route("/blocked-dates", post(handlers::block_date))
        .route("/blocked-dates/{date}", delete(handlers::unblock_date))
        .route("/disabled-time-slots", post(handlers::disable_time_slot))
        .route("/disabled-time-slots/{time}", delete(handlers::enable_time_slot))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(handlers);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
}
