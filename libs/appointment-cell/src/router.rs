// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, AppointmentHandlers};
use crate::services::AppointmentBookingService;

pub fn create_appointment_router(
    config: Arc<AppConfig>,
    booking_service: Arc<AppointmentBookingService>,
) -> Router {
    let handlers = Arc::new(AppointmentHandlers::new(config.clone(), booking_service));

    // Booking is open to walk-in clients without an account
    let public_routes = Router::new()
        .route("/appointments", post(handlers::book_appointment).get(handlers::list_appointments))
        .route("/appointments/{appointment_id}", get(handlers::get_appointment))
        .route("/availability", get(handlers::get_availability))
        .with_state(handlers.clone());

    let protected_routes = Router::new()
        .route("/appointments/stats", get(handlers::get_appointment_stats))
        .route("/appointments/{appointment_id}", put(handlers::update_appointment_status))
        .route("/notifications", get(handlers::list_notifications))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(handlers);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
}
