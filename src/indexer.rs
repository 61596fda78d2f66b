//! Catalog discovery and bulk loading.
/// Catalog directory scanning
pub mod directory;
/// Indexer types
pub mod types;

pub use directory::CatalogDirectory;
pub use types::{
    CatalogFile,
    IndexerError,
    LoadedCatalog,
    LoadedCatalogs,
};
