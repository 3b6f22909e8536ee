mod app_config;
pub mod catalog;
mod config;
pub mod geo;
pub mod intent;
pub mod venue;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, CategoryCatalog, CategoryConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::GeoPoint;
pub use intent::{SearchFingerprint, SearchIntent};
pub use venue::{primary_type_for, OpenState, Venue, ADDRESS_NOT_SPECIFIED};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read category catalog at {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse category catalog: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("invalid category catalog: {0}")]
    Validation(String),
}
