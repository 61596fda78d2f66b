//! 設定管理を行うモジュール

use std::path::{
    Path,
    PathBuf,
};

use super::{
    CatalogSettings,
    ConfigError,
    loader,
};

/// 設定管理を行う
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: CatalogSettings,

    /// 設定ファイルのパス（読み込んだ場合のみ）
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: CatalogSettings::default(), config_path: None }
    }

    /// ディレクトリ内の `.ts-catalog.json` から設定を読み込む
    ///
    /// ファイルがなければデフォルト設定を使う。
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, root: &Path) -> Result<(), ConfigError> {
        tracing::debug!(root = %root.display(), "Loading settings");

        let settings = loader::load_from_dir(root)?;
        let config_path = settings.is_some().then(|| root.join(loader::CONFIG_FILE_NAME));

        self.apply(settings.unwrap_or_default(), config_path)
    }

    /// 明示的に指定された設定ファイルを読み込む
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let settings = loader::load_from_file(path)?;
        self.apply(settings, Some(path.to_path_buf()))
    }

    /// 設定を更新する
    ///
    /// # Errors
    /// バリデーションエラー
    pub fn update_settings(&mut self, new_settings: CatalogSettings) -> Result<(), ConfigError> {
        tracing::debug!("Updating settings...");
        let config_path = self.config_path.clone();
        self.apply(new_settings, config_path)
    }

    /// 検証して反映する（失敗時は現在の設定を維持）
    fn apply(
        &mut self,
        settings: CatalogSettings,
        config_path: Option<PathBuf>,
    ) -> Result<(), ConfigError> {
        // バリデーション
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.config_path = config_path;
        tracing::debug!(settings = ?self.current_settings, "Settings loaded successfully");

        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &CatalogSettings {
        &self.current_settings
    }

    /// 読み込んだ設定ファイルのパス
    #[must_use]
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use crate::resolver::UnfinishedPolicy;

    /// new: デフォルト値で作成される
    #[rstest]
    fn test_new_creates_default_settings() {
        let manager = ConfigManager::new();

        assert_eq!(manager.get_settings(), &CatalogSettings::default());
        assert!(manager.config_path().is_none());
    }

    /// load_settings: 設定ファイルがある場合
    #[rstest]
    fn test_load_settings_with_config_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), r#"{"fallbackLocales": ["en"]}"#)
            .unwrap();

        let mut manager = ConfigManager::new();
        manager.load_settings(temp_dir.path()).unwrap();

        assert_eq!(manager.get_settings().fallback_locales, vec!["en".to_string()]);
        assert_eq!(manager.config_path(), Some(temp_dir.path().join(CONFIG_FILE_NAME).as_path()));
    }

    /// load_settings: 設定ファイルがない場合はデフォルト値
    #[rstest]
    fn test_load_settings_without_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let mut manager = ConfigManager::new();
        manager.load_settings(temp_dir.path()).unwrap();

        assert_eq!(manager.get_settings(), &CatalogSettings::default());
        assert!(manager.config_path().is_none());
    }

    /// load_settings: バリデーションエラーの場合は以前の設定を維持
    #[rstest]
    fn test_load_settings_invalid_keeps_previous() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), r#"{"indexing": {"numThreads": 0}}"#)
            .unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(temp_dir.path());

        assert!(matches!(result, Err(ConfigError::ValidationErrors(_))));
        assert_eq!(manager.get_settings(), &CatalogSettings::default());
    }

    /// load_file: 任意のパスから読み込む
    #[rstest]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("catalogs.json");
        fs::write(&path, r#"{"unfinishedPolicy": "useSource", "logMissing": true}"#).unwrap();

        let mut manager = ConfigManager::new();
        manager.load_file(&path).unwrap();

        assert_eq!(manager.get_settings().unfinished_policy, UnfinishedPolicy::UseSource);
        assert!(manager.get_settings().log_missing);
        assert_eq!(manager.config_path(), Some(path.as_path()));
    }

    /// update_settings: 無効な設定でエラー
    #[rstest]
    fn test_update_settings_invalid() {
        let mut manager = ConfigManager::new();
        let new_settings = CatalogSettings {
            fallback_locales: vec![String::new()], // 空文字は無効
            ..CatalogSettings::default()
        };

        let result = manager.update_settings(new_settings);

        assert!(result.is_err());
    }
}
