use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::locale::LocaleId;
use crate::resolver::{
    ResolveOptions,
    UnfinishedPolicy,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "fallbackLocales[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Contents of `.ts-catalog.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSettings {
    pub catalog_files: CatalogFilesConfig,

    pub unfinished_policy: UnfinishedPolicy,

    /// Locales tried, in order, when no catalog matches the requested one.
    pub fallback_locales: Vec<String>,

    /// Trace every lookup that falls back to the source text.
    pub log_missing: bool,

    pub indexing: IndexingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFilesConfig {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for CatalogFilesConfig {
    fn default() -> Self {
        Self { include_patterns: vec!["**/*.ts".to_string()], exclude_patterns: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexingConfig {
    /// Parallel thread count for loading catalogs.
    /// Default: 80% of CPU cores (minimum 1).
    pub num_threads: Option<usize>,
}

impl IndexingConfig {
    /// Effective number of catalogs loaded at once.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.num_threads.unwrap_or_else(|| (num_cpus::get() * 4 / 5).max(1))
    }
}

impl CatalogSettings {
    /// Options handed to every resolver built from these settings.
    #[must_use]
    pub const fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions { unfinished: self.unfinished_policy, log_missing: self.log_missing }
    }

    /// `fallbackLocales` that parse; invalid entries are rejected by [`Self::validate`].
    #[must_use]
    pub fn fallback_locale_ids(&self) -> Vec<LocaleId> {
        self.fallback_locales.iter().filter_map(|locale| LocaleId::parse(locale)).collect()
    }

    /// # Errors
    /// - Invalid glob pattern
    /// - Empty include pattern list
    /// - Unparseable fallback locale
    /// - Zero thread count
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.catalog_files.include_patterns.is_empty() {
            errors.push(ValidationError::new(
                "catalogFiles.includePatterns",
                "At least one pattern is required. Example: [\"**/*.ts\"]",
            ));
        }

        for (field, patterns) in [
            ("catalogFiles.includePatterns", &self.catalog_files.include_patterns),
            ("catalogFiles.excludePatterns", &self.catalog_files.exclude_patterns),
        ] {
            for (index, pattern) in patterns.iter().enumerate() {
                if let Err(e) = globset::Glob::new(pattern) {
                    errors.push(ValidationError::new(
                        format!("{field}[{index}]"),
                        format!("Invalid glob pattern '{pattern}': {e}"),
                    ));
                }
            }
        }

        for (index, locale) in self.fallback_locales.iter().enumerate() {
            if LocaleId::parse(locale).is_none() {
                errors.push(ValidationError::new(
                    format!("fallbackLocales[{index}]"),
                    format!("Invalid locale '{locale}'. Example: \"de_DE\" or \"en\""),
                ));
            }
        }

        if self.indexing.num_threads == Some(0) {
            errors.push(ValidationError::new(
                "indexing.numThreads",
                "Thread count must be at least 1, or omitted for the default",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
