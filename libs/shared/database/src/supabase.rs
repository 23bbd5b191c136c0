use anyhow::{Context, Result};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Non-success answer from PostgREST. Callers downcast the `anyhow::Error`
/// to tell conflicts and missing rows apart from transport failures.
#[derive(Debug, Error)]
#[error("Supabase API error ({status}): {body}")]
pub struct SupabaseApiError {
    pub status: StatusCode,
    pub body: String,
}

impl SupabaseApiError {
    pub fn is_conflict(&self) -> bool {
        self.status == StatusCode::CONFLICT
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, prefer: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key)
            .context("Supabase anon key is not a valid header value")?);
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", self.anon_key))
            .context("Supabase anon key is not a valid header value")?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(prefer) = prefer {
            headers.insert("Prefer", HeaderValue::from_str(prefer)
                .context("Invalid Prefer header")?);
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            body: Option<Value>, prefer: Option<&str>)
                            -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, &url)
            .headers(self.get_headers(prefer)?);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);
            return Err(SupabaseApiError { status, body: error_text }.into());
        }

        let data = response.json::<T>().await
            .with_context(|| format!("Unexpected response body from {}", url))?;
        Ok(data)
    }

    /// `GET /rest/v1/{table}?{query}`
    pub async fn select<T>(&self, table: &str, query: &str) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let path = rest_path(table, query);
        self.request(Method::GET, &path, None, None).await
    }

    /// Inserts one row and returns the stored representation.
    pub async fn insert<T>(&self, table: &str, row: Value) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let path = rest_path(table, "");
        self.request(Method::POST, &path, Some(row), Some("return=representation")).await
    }

    /// `PATCH` rows matching `filter`, returning the updated rows.
    pub async fn update<T>(&self, table: &str, filter: &str, patch: Value) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let path = rest_path(table, filter);
        self.request(Method::PATCH, &path, Some(patch), Some("return=representation")).await
    }

    /// `DELETE` rows matching `filter`, returning the removed rows.
    pub async fn delete<T>(&self, table: &str, filter: &str) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let path = rest_path(table, filter);
        self.request(Method::DELETE, &path, None, Some("return=representation")).await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

fn rest_path(table: &str, query: &str) -> String {
    if query.is_empty() {
        format!("/rest/v1/{}", table)
    } else {
        format!("/rest/v1/{}?{}", table, query)
    }
}

/// Extracts the PostgREST status error from an `anyhow` chain, if any.
pub fn api_error(err: &anyhow::Error) -> Option<&SupabaseApiError> {
    err.downcast_ref::<SupabaseApiError>()
}
