// libs/schedule-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_admin;

use crate::models::{BlockDateRequest, BlockedDate, DisableTimeSlotRequest, ScheduleError};
use crate::services::ScheduleService;

pub struct ScheduleHandlers {
    pub schedule_service: Arc<ScheduleService>,
    pub config: Arc<AppConfig>,
}

impl ScheduleHandlers {
    pub fn new(config: Arc<AppConfig>, schedule_service: Arc<ScheduleService>) -> Self {
        Self { schedule_service, config }
    }
}

fn to_app_error(e: ScheduleError) -> AppError {
    match e {
        ScheduleError::MissingDate
        | ScheduleError::MissingTime
        | ScheduleError::InvalidDate(_)
        | ScheduleError::InvalidTime(_)
        | ScheduleError::UnknownSlot(_) => AppError::ValidationError(e.to_string()),
        // Duplicate blocks answer 400 for compatibility with existing clients
        ScheduleError::AlreadyBlocked(_) | ScheduleError::AlreadyDisabled(_) => {
            AppError::BadRequest(e.to_string())
        }
        ScheduleError::DatabaseError(msg) => AppError::Database(msg),
    }
}

// ==============================================================================
// BLOCKED DATES
// ==============================================================================

pub async fn list_blocked_dates(
    State(handlers): State<Arc<ScheduleHandlers>>,
) -> Result<Json<Vec<BlockedDate>>, AppError> {
    let dates = handlers.schedule_service.blocked_dates().await.map_err(to_app_error)?;
    Ok(Json(dates))
}

pub async fn block_date(
    State(handlers): State<Arc<ScheduleHandlers>>,
    Extension(user): Extension<User>,
    Json(request): Json<BlockDateRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let blocked = handlers.schedule_service.block_date(&request.date).await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "success": true,
        "date": blocked.date
    })))
}

pub async fn unblock_date(
    State(handlers): State<Arc<ScheduleHandlers>>,
    Extension(user): Extension<User>,
    Path(date): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    handlers.schedule_service.unblock_date(&date).await.map_err(to_app_error)?;

    Ok(Json(json!({ "success": true })))
}

// ==============================================================================
// DISABLED TIME SLOTS
// ==============================================================================

pub async fn list_disabled_time_slots(
    State(handlers): State<Arc<ScheduleHandlers>>,
) -> Result<Json<Vec<String>>, AppError> {
    let slots = handlers.schedule_service.disabled_time_slots().await.map_err(to_app_error)?;
    Ok(Json(slots))
}

pub async fn disable_time_slot(
    State(handlers): State<Arc<ScheduleHandlers>>,
    Extension(user): Extension<User>,
    Json(request): Json<DisableTimeSlotRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let label = handlers.schedule_service.disable_time_slot(&request.time).await
        .map_err(to_app_error)?;

    Ok(Json(json!({
        "success": true,
        "time": label
    })))
}

pub async fn enable_time_slot(
    State(handlers): State<Arc<ScheduleHandlers>>,
    Extension(user): Extension<User>,
    Path(time): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    handlers.schedule_service.enable_time_slot(&time).await.map_err(to_app_error)?;

    Ok(Json(json!({ "success": true })))
}
