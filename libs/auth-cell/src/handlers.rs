use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::{HeaderMap, StatusCode},
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_models::error::AppError;
use shared_utils::extractor::extract_bearer_token;
use shared_utils::jwt::validate_token;

use crate::models::{AuthError, AuthResponse, LoginRequest, RegisterRequest};
use crate::services::AccountService;

pub struct AuthHandlers {
    pub accounts: Arc<AccountService>,
    pub config: Arc<AppConfig>,
}

impl AuthHandlers {
    pub fn new(config: Arc<AppConfig>, accounts: Arc<AccountService>) -> Self {
        Self { accounts, config }
    }
}

fn to_app_error(e: AuthError) -> AppError {
    match e {
        AuthError::MissingCredentials => AppError::ValidationError(e.to_string()),
        AuthError::UnknownAdmin | AuthError::UnknownClient | AuthError::InvalidPassword => {
            AppError::Auth(e.to_string())
        }
        AuthError::EmailTaken => AppError::Conflict(e.to_string()),
        AuthError::Hashing(msg) | AuthError::Token(msg) => AppError::Internal(msg),
        AuthError::Database(msg) => AppError::Database(msg),
    }
}

async fn login_as(handlers: &AuthHandlers, request: LoginRequest, role: Role) -> Result<Json<AuthResponse>, AppError> {
    let account = handlers.accounts.authenticate(&request, role).await.map_err(to_app_error)?;
    let session = handlers.accounts.session(&account, &handlers.config).map_err(to_app_error)?;
    Ok(Json(session))
}

pub async fn login_admin(
    State(handlers): State<Arc<AuthHandlers>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    login_as(&handlers, request, Role::Admin).await
}

pub async fn login_client(
    State(handlers): State<Arc<AuthHandlers>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    login_as(&handlers, request, Role::Client).await
}

pub async fn register(
    State(handlers): State<Arc<AuthHandlers>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let account = handlers.accounts.register(request).await.map_err(to_app_error)?;
    let session = handlers.accounts.session(&account, &handlers.config).map_err(to_app_error)?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn verify_token(
    State(handlers): State<Arc<AuthHandlers>>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    debug!("Verifying token");

    let token = extract_bearer_token(&headers)?;

    match validate_token(token, &handlers.config.jwt_secret) {
        Ok(_) => Ok(Json(json!({ "valid": true }))),
        Err(_) => Ok(Json(json!({ "valid": false }))),
    }
}
