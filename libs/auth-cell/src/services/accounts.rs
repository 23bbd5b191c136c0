// libs/auth-cell/src/services/accounts.rs
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::Role;
use shared_utils::jwt::issue_token;

use crate::models::{Account, AccountView, AuthError, AuthResponse, LoginRequest, RegisterRequest};
use crate::services::password::PasswordService;
use crate::services::store::{AccountStore, InMemoryAccountStore};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Administrator and client accounts. Clients live in the account store; the
/// administrator is seeded from configuration at startup and never persisted.
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    admin: RwLock<Option<Account>>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store, admin: RwLock::new(None) }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryAccountStore::new()))
    }

    /// Builds the service and seeds the administrator when `ADMIN_EMAIL` and
    /// `ADMIN_PASSWORD` are both set.
    pub async fn from_config(config: &AppConfig, store: Arc<dyn AccountStore>) -> Result<Self, AuthError> {
        let service = Self::new(store);
        if config.has_admin_seed() {
            service.seed_admin(&config.admin_email, &config.admin_password).await?;
        } else {
            warn!("No administrator configured; admin login is unavailable");
        }
        Ok(service)
    }

    pub async fn seed_admin(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let account = Account {
            id: Uuid::new_v4().to_string(),
            name: "Administrador".to_string(),
            email: normalize_email(email),
            phone: String::new(),
            password_hash: PasswordService::hash_password(password)?,
            role: Role::Admin,
            created_at: Utc::now(),
        };

        *self.admin.write().await = Some(account.clone());

        info!("Administrator {} seeded", account.email);
        Ok(account)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<Account, AuthError> {
        let fields = [&request.name, &request.email, &request.phone, &request.password];
        if fields.iter().any(|field| field.trim().is_empty()) {
            return Err(AuthError::MissingCredentials);
        }

        let email = normalize_email(&request.email);
        let admin_email = self.admin.read().await.as_ref().map(|admin| admin.email.clone());
        if admin_email.as_deref() == Some(email.as_str()) {
            warn!("Registration refused, {} belongs to the administrator", email);
            return Err(AuthError::EmailTaken);
        }

        let account = Account {
            id: Uuid::new_v4().to_string(),
            name: request.name.trim().to_string(),
            email,
            phone: request.phone.trim().to_string(),
            password_hash: PasswordService::hash_password(&request.password)?,
            role: Role::Client,
            created_at: Utc::now(),
        };

        let account = self.store.insert(account).await.inspect_err(|e| {
            if *e == AuthError::EmailTaken {
                warn!("Registration refused, e-mail already exists");
            }
        })?;

        info!("Client {} registered", account.email);
        Ok(account)
    }

    /// Checks credentials against accounts holding `role` only, so client
    /// credentials never open an administrator session.
    pub async fn authenticate(&self, request: &LoginRequest, role: Role) -> Result<Account, AuthError> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let email = normalize_email(&request.email);
        debug!("Authenticating {} as {}", email, role);

        let account = match role {
            Role::Admin => self.admin.read().await
                .as_ref()
                .filter(|admin| admin.email == email)
                .cloned()
                .ok_or(AuthError::UnknownAdmin)?,
            Role::Client => self.store.find_by_email(&email).await?
                .filter(|account| account.role == Role::Client)
                .ok_or(AuthError::UnknownClient)?,
        };

        if !PasswordService::verify_password(&request.password, &account.password_hash)? {
            warn!("Wrong password for {}", email);
            return Err(AuthError::InvalidPassword);
        }

        Ok(account)
    }

    /// Signs a session token for `account`.
    pub fn session(&self, account: &Account, config: &AppConfig) -> Result<AuthResponse, AuthError> {
        let token = issue_token(
            &account.id,
            &account.email,
            account.role,
            &config.jwt_secret,
            config.token_ttl_hours,
        ).map_err(AuthError::Token)?;

        Ok(AuthResponse {
            success: true,
            token,
            user: AccountView::from(account),
        })
    }
}
