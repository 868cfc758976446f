use crate::config::types::{Config, FileTypeTable, UserSettings};
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// 編譯時嵌入的檔案類型設定（不需要外部檔案）
const FILE_TYPE_TABLE_JSON: &str = include_str!("../data/file_type_table.json");

/// 預設設定檔位置（目前工作目錄）
pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

impl Config {
    /// 讀取工作目錄下的 `settings.json`，不存在時使用預設值
    pub fn new() -> Result<Self> {
        Self::load(None)
    }

    /// 從指定設定檔載入；`None` 代表使用預設位置
    ///
    /// 明確指定的設定檔必須存在，預設位置則可有可無
    pub fn load(settings_path: Option<&Path>) -> Result<Self> {
        let mut file_type_table = Self::load_embedded_file_type_table()?;
        let settings = match settings_path {
            Some(path) => Self::read_settings(path)?,
            None => Self::load_settings(Path::new(DEFAULT_SETTINGS_FILE))?,
        };
        file_type_table.extend_video_extensions(&settings.extra_video_extensions);

        Ok(Self {
            file_type_table,
            settings,
        })
    }

    fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            debug!("找不到設定檔 {}，使用預設值", path.display());
            return Ok(UserSettings::default());
        }
        Self::read_settings(path)
    }

    fn read_settings(path: &Path) -> Result<UserSettings> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// 從編譯時嵌入的 JSON 載入檔案類型表
    fn load_embedded_file_type_table() -> Result<FileTypeTable> {
        serde_json::from_str(FILE_TYPE_TABLE_JSON).context("無法解析嵌入的檔案類型設定")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_table_has_common_formats() {
        let table = Config::load_embedded_file_type_table().unwrap();
        assert!(table.is_video_file(Path::new("a.mp4")));
        assert!(table.is_video_file(Path::new("a.MKV")));
        assert!(table.is_image_format("png"));
        assert!(table.is_image_format("jpg"));
    }

    #[test]
    fn test_load_explicit_settings_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.json");
        fs::write(
            &path,
            r#"{"format": "jpg", "jobs": 3, "extra_video_extensions": ["y4m"]}"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.settings.format, "jpg");
        assert_eq!(config.settings.jobs, 3);
        assert!(config.file_type_table.is_video_file(Path::new("raw.y4m")));
    }

    #[test]
    fn test_missing_explicit_settings_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load(Some(&temp_dir.path().join("missing.json")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_settings_json_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::read_settings(&path).is_err());
    }
}
