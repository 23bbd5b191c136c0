use std::sync::Arc;

use axum::{
    Router,
    routing::post,
};

use shared_config::AppConfig;

use crate::handlers::{self, AuthHandlers};
use crate::services::AccountService;

pub fn auth_routes(config: Arc<AppConfig>, accounts: Arc<AccountService>) -> Router {
    let handlers = Arc::new(AuthHandlers::new(config, accounts));

    Router::new()
        .route("/login", post(handlers::login_admin))
        .route("/login-client", post(handlers::login_client))
        .route("/register", post(handlers::register))
        .route("/verify", post(handlers::verify_token))
        .with_state(handlers)
}
