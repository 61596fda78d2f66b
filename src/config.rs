//! `.ts-catalog.json` settings.
/// Config file loader
mod loader;
/// Configuration manager
mod manager;
/// Catalog file pattern matcher
mod matcher;
/// Configuration types and settings
mod types;

pub use loader::CONFIG_FILE_NAME;
pub use manager::ConfigManager;
pub use matcher::{
    CatalogMatcher,
    MatcherError,
};
pub use types::{
    CatalogFilesConfig,
    CatalogSettings,
    ConfigError,
    IndexingConfig,
    ValidationError,
};
