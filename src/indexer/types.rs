//! Indexer type definitions.

use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use thiserror::Error;

use crate::config::MatcherError;
use crate::input::CatalogParseError;
use crate::locale::LocaleId;
use crate::store::CatalogStore;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Catalog directory '{}' does not exist", .0.display())]
    MissingRoot(PathBuf),

    #[error(transparent)]
    Matcher(#[from] MatcherError),

    /// A single catalog failed to parse; the others are unaffected.
    #[error("Failed to load '{}': {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: CatalogParseError,
    },

    #[error("Loading task for '{}' failed: {message}", path.display())]
    Task { path: PathBuf, message: String },
}

/// A `.ts` file found while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFile {
    pub path: PathBuf,
    /// Locale guessed from the file name, if any.
    pub locale: Option<LocaleId>,
}

#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub file: CatalogFile,
    pub store: Arc<CatalogStore>,
}

impl LoadedCatalog {
    /// Locale from the file name, else the one the document declares.
    #[must_use]
    pub fn locale(&self) -> Option<&LocaleId> {
        self.file.locale.as_ref().or_else(|| self.store.locale())
    }
}

/// Outcome of loading every catalog in a directory.
#[derive(Debug, Default)]
pub struct LoadedCatalogs {
    pub catalogs: Vec<LoadedCatalog>,
    pub failures: Vec<IndexerError>,
}

impl LoadedCatalogs {
    #[must_use]
    pub fn get(&self, locale: &LocaleId) -> Option<&LoadedCatalog> {
        self.catalogs.iter().find(|catalog| catalog.locale() == Some(locale))
    }

    #[must_use]
    pub fn get_path(&self, path: &Path) -> Option<&LoadedCatalog> {
        self.catalogs.iter().find(|catalog| catalog.file.path == path)
    }
}
