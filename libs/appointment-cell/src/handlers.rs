// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_admin;

use crate::models::{
    Appointment, AppointmentError, AppointmentListQuery, AppointmentStats, AvailabilityQuery,
    BookAppointmentRequest, DayAvailability, Notification, UpdateStatusRequest,
};
use crate::services::AppointmentBookingService;

pub struct AppointmentHandlers {
    pub booking_service: Arc<AppointmentBookingService>,
    pub config: Arc<AppConfig>,
}

impl AppointmentHandlers {
    pub fn new(config: Arc<AppConfig>, booking_service: Arc<AppointmentBookingService>) -> Self {
        Self { booking_service, config }
    }
}

fn to_app_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Cita no encontrada".to_string()),
        AppointmentError::MissingField(_)
        | AppointmentError::ValidationError(_)
        | AppointmentError::ReasonRequired => AppError::ValidationError(e.to_string()),
        AppointmentError::DateBlocked(_)
        | AppointmentError::TimeSlotDisabled(_)
        | AppointmentError::SlotNotAvailable
        | AppointmentError::InvalidStatusTransition { .. } => AppError::Conflict(e.to_string()),
        AppointmentError::CancellationWindowClosed { .. } => AppError::BadRequest(e.to_string()),
        AppointmentError::Unauthorized => AppError::Forbidden(e.to_string()),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

pub async fn book_appointment(
    State(handlers): State<Arc<AppointmentHandlers>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let appointment = handlers.booking_service.book_appointment(request).await
        .map_err(to_app_error)?;

    Ok((StatusCode::CREATED, Json(json!({
        "success": true,
        "appointment": appointment
    }))))
}

pub async fn list_appointments(
    State(handlers): State<Arc<AppointmentHandlers>>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = handlers.booking_service
        .list_appointments(query.email.as_deref())
        .await
        .map_err(to_app_error)?;

    Ok(Json(appointments))
}

pub async fn get_appointment(
    State(handlers): State<Arc<AppointmentHandlers>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = handlers.booking_service.get_appointment(appointment_id).await
        .map_err(to_app_error)?;
    Ok(Json(appointment))
}

pub async fn update_appointment_status(
    State(handlers): State<Arc<AppointmentHandlers>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = handlers.booking_service
        .update_status(appointment_id, request, &user, Utc::now())
        .await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

pub async fn get_appointment_stats(
    State(handlers): State<Arc<AppointmentHandlers>>,
    Extension(user): Extension<User>,
) -> Result<Json<AppointmentStats>, AppError> {
    require_admin(&user)?;

    let stats = handlers.booking_service.get_stats().await.map_err(to_app_error)?;
    Ok(Json(stats))
}

// ==============================================================================
// AVAILABILITY & NOTIFICATIONS
// ==============================================================================

pub async fn get_availability(
    State(handlers): State<Arc<AppointmentHandlers>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<DayAvailability>, AppError> {
    let day = handlers.booking_service.day_availability(&query.date).await
        .map_err(to_app_error)?;
    Ok(Json(day))
}

pub async fn list_notifications(
    State(handlers): State<Arc<AppointmentHandlers>>,
    Extension(user): Extension<User>,
) -> Json<Vec<Notification>> {
    Json(handlers.booking_service.notifications_for(&user).await)
}
