// libs/catalog-cell/src/services/catalog.rs
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::models::{default_services, CatalogError, Service};

pub struct CatalogService {
    services: RwLock<Vec<Service>>,
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::with_services(default_services())
    }
}

impl CatalogService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_services(services: Vec<Service>) -> Self {
        Self { services: RwLock::new(services) }
    }

    pub async fn list(&self) -> Vec<Service> {
        self.services.read().await.clone()
    }

    pub async fn find(&self, id: u32) -> Result<Service, CatalogError> {
        self.services.read().await
            .iter()
            .find(|service| service.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound)
    }

    /// Resolves the denormalized name stored on appointments. Matching
    /// ignores surrounding whitespace and letter case.
    pub async fn find_by_name(&self, name: &str) -> Result<Service, CatalogError> {
        let wanted = name.trim();
        debug!("Resolving service '{}'", wanted);

        self.services.read().await
            .iter()
            .find(|service| service.name.to_lowercase() == wanted.to_lowercase())
            .cloned()
            .ok_or_else(|| CatalogError::UnknownService(wanted.to_string()))
    }

    pub async fn update_price(&self, id: u32, price: &str) -> Result<Service, CatalogError> {
        let price = price.trim();
        if price.is_empty() {
            return Err(CatalogError::MissingPrice);
        }

        let mut services = self.services.write().await;
        let service = services
            .iter_mut()
            .find(|service| service.id == id)
            .ok_or(CatalogError::NotFound)?;

        service.price = price.to_string();
        info!("Price for '{}' updated to {}", service.name, service.price);
        Ok(service.clone())
    }
}
