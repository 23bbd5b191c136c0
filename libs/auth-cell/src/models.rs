// libs/auth-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::auth::Role;

#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub name: String,
    /// Stored lower-cased.
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// What the client sees of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: match account.role {
                Role::Client => Some(account.name.clone()),
                Role::Admin => None,
            },
            email: account.email.clone(),
            role: account.role,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: AccountView,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("Datos incompletos")]
    MissingCredentials,

    #[error("Administrador no existe")]
    UnknownAdmin,

    #[error("Cliente no existe")]
    UnknownClient,

    #[error("Contraseña incorrecta")]
    InvalidPassword,

    #[error("El correo ya está registrado")]
    EmailTaken,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    Database(String),
}
