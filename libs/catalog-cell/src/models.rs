// libs/catalog-cell/src/models.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: u32,
    pub name: String,
    /// Display price; may be a range such as `"$100.000 - $135.000"`.
    pub price: String,
}

impl Service {
    pub fn new(id: u32, name: &str, price: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            price: price.to_string(),
        }
    }
}

/// The salon's offering at launch.
pub fn default_services() -> Vec<Service> {
    vec![
        Service::new(1, "Manicure Semipermanente", "$60.000"),
        Service::new(2, "Uñas Acrílicas", "$80.000"),
        Service::new(3, "Uñas de Gel", "$75.000"),
        Service::new(4, "Nail Art Personalizado", "$100.000 - $135.000"),
        Service::new(5, "Retiro de Esmaltado", "$30.000"),
        Service::new(6, "Mantenimiento", "$40.000"),
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePriceRequest {
    #[serde(default)]
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("Service not found")]
    NotFound,

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Precio requerido")]
    MissingPrice,
}
