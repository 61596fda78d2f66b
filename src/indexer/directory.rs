//! Discovers the catalogs of a translation directory.

use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use ignore::WalkBuilder;
use tokio::sync::Semaphore;

use super::types::{
    CatalogFile,
    IndexerError,
    LoadedCatalog,
    LoadedCatalogs,
};
use crate::config::{
    CatalogMatcher,
    CatalogSettings,
};
use crate::locale::{
    LocaleId,
    candidate_locales,
    detect_locale_from_path,
};
use crate::store::CatalogStore;

/// The `.ts` files under one root, sorted by path.
#[derive(Debug, Clone)]
pub struct CatalogDirectory {
    /// Directory that was scanned.
    root: PathBuf,
    files: Vec<CatalogFile>,
    /// Catalogs loaded at once by [`Self::load_all`].
    workers: usize,
}

impl CatalogDirectory {
    /// Walks `root` and collects files matching `catalogFiles`.
    ///
    /// `.gitignore` rules are honored. Files whose locale cannot be guessed
    /// are kept but never returned by the locale lookups.
    ///
    /// # Errors
    /// - `root` is not a directory
    /// - invalid glob pattern
    pub fn scan(root: &Path, settings: &CatalogSettings) -> Result<Self, IndexerError> {
        if !root.is_dir() {
            return Err(IndexerError::MissingRoot(root.to_path_buf()));
        }

        let matcher = CatalogMatcher::new(root.to_path_buf(), settings)?;
        let mut files = Vec::new();

        for result in WalkBuilder::new(root)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .build()
        {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(?err, "Failed to read directory entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            if !matcher.is_catalog_file(path) {
                continue;
            }

            let locale = detect_locale_from_path(path);
            if locale.is_none() {
                tracing::warn!(path = %path.display(), "Cannot tell the locale of catalog");
            }
            files.push(CatalogFile { path: path.to_path_buf(), locale });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(root = %root.display(), count = files.len(), "Scanned catalog directory");

        Ok(Self { root: root.to_path_buf(), files, workers: settings.indexing.worker_count() })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn files(&self) -> &[CatalogFile] {
        &self.files
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Distinct locales with a catalog, in path order.
    #[must_use]
    pub fn locales(&self) -> Vec<&LocaleId> {
        let mut locales: Vec<&LocaleId> = Vec::new();
        for locale in self.files.iter().filter_map(|file| file.locale.as_ref()) {
            if !locales.contains(&locale) {
                locales.push(locale);
            }
        }
        locales
    }

    /// Catalog for exactly `locale`.
    #[must_use]
    pub fn path_for(&self, locale: &LocaleId) -> Option<&Path> {
        self.file_for(locale).map(|file| file.path.as_path())
    }

    /// First catalog whose locale is exactly `locale`.
    fn file_for(&self, locale: &LocaleId) -> Option<&CatalogFile> {
        self.files.iter().find(|file| file.locale.as_ref() == Some(locale))
    }

    /// Best catalog for `requested`.
    ///
    /// Tries `requested`, then its bare language, then any catalog of the
    /// same language (`de_AT` finds `vym.de_DE.ts`).
    #[must_use]
    pub fn find(&self, requested: &LocaleId) -> Option<&CatalogFile> {
        candidate_locales(requested)
            .iter()
            .find_map(|candidate| self.file_for(candidate))
            .or_else(|| {
                self.files
                    .iter()
                    .find(|file| file.locale.as_ref().is_some_and(|l| l.same_language(requested)))
            })
    }

    /// [`Self::find`] for `requested`, then for each fallback in order.
    #[must_use]
    pub fn find_with_fallbacks(
        &self,
        requested: Option<&LocaleId>,
        fallbacks: &[LocaleId],
    ) -> Option<&CatalogFile> {
        requested.into_iter().chain(fallbacks).find_map(|locale| self.find(locale))
    }

    /// Loads every catalog, at most `indexing.numThreads` at a time.
    ///
    /// A file that fails to load is recorded in `failures` and does not
    /// affect the others.
    pub async fn load_all(&self) -> LoadedCatalogs {
        let semaphore = Arc::new(Semaphore::new(self.workers));

        let tasks = self.files.iter().cloned().map(|file| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let result = Self::load_file(&semaphore, &file.path).await;
                (file, result)
            }
        });
        let results = futures::future::join_all(tasks).await;

        let mut loaded = LoadedCatalogs::default();
        for (file, result) in results {
            match result {
                Ok(store) => loaded.catalogs.push(LoadedCatalog { file, store: Arc::new(store) }),
                Err(error) => {
                    tracing::warn!(path = %file.path.display(), %error, "Failed to load catalog");
                    loaded.failures.push(error);
                }
            }
        }

        tracing::info!(
            root = %self.root.display(),
            loaded = loaded.catalogs.len(),
            failed = loaded.failures.len(),
            "Loaded catalog directory"
        );
        loaded
    }

    /// Loads one catalog on the blocking pool once a permit is free.
    async fn load_file(semaphore: &Arc<Semaphore>, path: &Path) -> Result<CatalogStore, IndexerError> {
        let task_error =
            |message: String| IndexerError::Task { path: path.to_path_buf(), message };

        let permit =
            Arc::clone(semaphore).acquire_owned().await.map_err(|e| task_error(e.to_string()))?;
        let owned_path = path.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            CatalogStore::load(&owned_path)
        })
        .await
        .map_err(|e| task_error(format!("join failed: {e}")))?
        .map_err(|source| IndexerError::Load { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::config::{
        CatalogFilesConfig,
        IndexingConfig,
    };

    fn catalog(language: &str, translation: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="{language}">
<context>
    <name>MainWindow</name>
    <message>
        <source>Open</source>
        <translation>{translation}</translation>
    </message>
</context>
</TS>
"#
        )
    }

    fn locale(value: &str) -> LocaleId {
        LocaleId::parse(value).unwrap()
    }

    /// `lang/` に de_DE, es, zh_CN と無関係なファイルを置いたディレクトリ
    fn create_directory() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let lang = temp_dir.path().join("lang");
        fs::create_dir(&lang).unwrap();
        fs::write(lang.join("vym.de_DE.ts"), catalog("de_DE", "Öffnen")).unwrap();
        fs::write(lang.join("vym.es.ts"), catalog("es", "Abrir")).unwrap();
        fs::write(lang.join("vym.zh_CN.ts"), catalog("zh_CN", "打开")).unwrap();
        fs::write(lang.join("vym.de_DE.qm"), "binary").unwrap();
        fs::write(temp_dir.path().join("README.md"), "docs").unwrap();
        temp_dir
    }

    #[googletest::test]
    fn test_scan_finds_catalogs() {
        let temp_dir = create_directory();

        let directory =
            CatalogDirectory::scan(temp_dir.path(), &CatalogSettings::default()).unwrap();

        expect_that!(directory.len(), eq(3));
        expect_that!(
            directory.locales().iter().map(ToString::to_string).collect::<Vec<_>>(),
            elements_are![eq("de_DE"), eq("es"), eq("zh_CN")]
        );
        expect_that!(
            directory.path_for(&locale("es")),
            some(eq(temp_dir.path().join("lang/vym.es.ts").as_path()))
        );
        expect_that!(directory.path_for(&locale("fr")), none());
    }

    #[googletest::test]
    fn test_scan_honors_exclude_patterns() {
        let temp_dir = create_directory();
        let settings = CatalogSettings {
            catalog_files: CatalogFilesConfig {
                exclude_patterns: vec!["**/*zh_CN*".to_string()],
                ..CatalogFilesConfig::default()
            },
            ..CatalogSettings::default()
        };

        let directory = CatalogDirectory::scan(temp_dir.path(), &settings).unwrap();

        expect_that!(directory.len(), eq(2));
        expect_that!(directory.path_for(&locale("zh_CN")), none());
    }

    #[googletest::test]
    fn test_scan_missing_root() {
        let temp_dir = TempDir::new().unwrap();

        let result =
            CatalogDirectory::scan(&temp_dir.path().join("nope"), &CatalogSettings::default());

        expect_that!(matches!(result, Err(IndexerError::MissingRoot(_))), eq(true));
    }

    #[rstest]
    #[case::exact("de_DE", Some("de_DE"))]
    #[case::language_only("es_MX", Some("es"))]
    #[case::same_language("de_AT", Some("de_DE"))]
    #[case::bare_language("zh", Some("zh_CN"))]
    #[case::unknown("fr_FR", None)]
    fn test_find(#[case] requested: &str, #[case] expected: Option<&str>) {
        let temp_dir = create_directory();
        let directory =
            CatalogDirectory::scan(temp_dir.path(), &CatalogSettings::default()).unwrap();

        let found = directory.find(&locale(requested));

        assert_eq!(
            found.and_then(|file| file.locale.as_ref()).map(ToString::to_string).as_deref(),
            expected
        );
    }

    #[rstest]
    fn test_find_with_fallbacks() {
        let temp_dir = create_directory();
        let directory =
            CatalogDirectory::scan(temp_dir.path(), &CatalogSettings::default()).unwrap();
        let fallbacks = [locale("it"), locale("es")];

        let found = directory.find_with_fallbacks(Some(&locale("fr")), &fallbacks);
        let no_request = directory.find_with_fallbacks(None, &fallbacks);
        let nothing = directory.find_with_fallbacks(Some(&locale("fr")), &[]);

        assert_eq!(found.map(|f| f.path.clone()), Some(temp_dir.path().join("lang/vym.es.ts")));
        assert_eq!(no_request, found);
        assert!(nothing.is_none());
    }

    #[tokio::test]
    async fn test_load_all_reports_failures_per_file() {
        let temp_dir = create_directory();
        fs::write(temp_dir.path().join("lang/vym.fr.ts"), "<TS><context>").unwrap();
        let settings =
            CatalogSettings { indexing: IndexingConfig { num_threads: Some(1) }, ..Default::default() };
        let directory = CatalogDirectory::scan(temp_dir.path(), &settings).unwrap();

        let loaded = directory.load_all().await;

        assert_eq!(loaded.catalogs.len(), 3);
        assert_eq!(loaded.failures.len(), 1);
        assert!(matches!(&loaded.failures[0], IndexerError::Load { path, .. } if path.ends_with("vym.fr.ts")));
        let zh = loaded.get(&locale("zh_CN")).unwrap();
        assert_eq!(zh.store.get("MainWindow", "Open", None).map(|m| m.translation.text()), Some("打开"));
    }

    #[rstest]
    fn test_load_all_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let directory =
            CatalogDirectory::scan(temp_dir.path(), &CatalogSettings::default()).unwrap();

        let loaded = tokio_test::block_on(directory.load_all());

        assert!(directory.is_empty());
        assert!(loaded.catalogs.is_empty());
        assert!(loaded.failures.is_empty());
    }
}
