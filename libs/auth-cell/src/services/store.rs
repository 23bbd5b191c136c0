// libs/auth-cell/src/services/store.rs
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};

use shared_database::supabase::{api_error, SupabaseClient};
use shared_models::auth::Role;

use crate::models::{Account, AuthError};

/// Durable owner of client accounts. E-mails are stored lower-cased.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError>;

    /// Fails with `EmailTaken` if an account already uses the e-mail.
    async fn insert(&self, account: Account) -> Result<Account, AuthError>;
}

// ==============================================================================
// IN-MEMORY STORE
// ==============================================================================

#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<Vec<Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        Ok(self.accounts.read().await
            .iter()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn insert(&self, account: Account) -> Result<Account, AuthError> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|existing| existing.email == account.email) {
            return Err(AuthError::EmailTaken);
        }
        accounts.push(account.clone());
        Ok(account)
    }
}

// ==============================================================================
// SUPABASE STORE
// ==============================================================================

const CLIENTS_TABLE: &str = "clients";

/// Row shape of the `clients` table. The table holds clients only.
#[derive(Debug, Serialize, Deserialize)]
struct ClientRow {
    id: String,
    name: String,
    email: String,
    phone: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<ClientRow> for Account {
    fn from(row: ClientRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            role: Role::Client,
            created_at: row.created_at,
        }
    }
}

pub struct SupabaseAccountStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAccountStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

fn database_error(err: anyhow::Error) -> AuthError {
    AuthError::Database(err.to_string())
}

#[async_trait]
impl AccountStore for SupabaseAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        debug!("Looking up client {} in Supabase", email);

        let query = format!("select=*&email=eq.{}&limit=1", urlencoding::encode(email));
        let rows: Vec<ClientRow> = self.supabase
            .select(CLIENTS_TABLE, &query)
            .await
            .map_err(database_error)?;

        Ok(rows.into_iter().next().map(Account::from))
    }

    async fn insert(&self, account: Account) -> Result<Account, AuthError> {
        let row = json!({
            "id": account.id,
            "name": account.name,
            "email": account.email,
            "phone": account.phone,
            "password_hash": account.password_hash,
            "created_at": account.created_at,
        });

        let rows: Vec<ClientRow> = self.supabase
            .insert(CLIENTS_TABLE, row)
            .await
            .map_err(|err| match api_error(&err) {
                Some(api) if api.is_conflict() => AuthError::EmailTaken,
                _ => database_error(err),
            })?;

        let stored = rows.into_iter().next()
            .map(Account::from)
            .ok_or_else(|| AuthError::Database("Insert returned no row".to_string()))?;

        info!("Client {} stored in Supabase", stored.email);
        Ok(stored)
    }
}
