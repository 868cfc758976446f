use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 未指定 `--fps` 時的預設取樣率
pub const DEFAULT_FPS: &str = "30";
/// 未指定 `--format` 時的預設輸出格式
pub const DEFAULT_IMAGE_FORMAT: &str = "png";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    /// 目錄掃描時認得的影片副檔名（含前導點）
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
    /// 可輸出的圖片格式（不含前導點）
    #[serde(rename = "IMAGE_FORMAT")]
    pub image_format: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn video_extensions_set(&self) -> HashSet<String> {
        self.video_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        has_video_extension(path, &self.video_extensions_set())
    }

    #[must_use]
    pub fn is_image_format(&self, format: &str) -> bool {
        self.image_format
            .iter()
            .any(|known| known.eq_ignore_ascii_case(format))
    }

    /// 合併使用者額外指定的影片副檔名，接受 `mp4` 或 `.mp4` 兩種寫法
    pub fn extend_video_extensions(&mut self, extra: &[String]) {
        for ext in extra {
            let trimmed = ext.trim().trim_start_matches('.').to_lowercase();
            if trimmed.is_empty() {
                continue;
            }
            let dotted = format!(".{trimmed}");
            if !self.video_file.iter().any(|e| e.eq_ignore_ascii_case(&dotted)) {
                self.video_file.push(dotted);
            }
        }
    }
}

/// 以 `video_extensions_set` 的結果判斷副檔名，掃描大量檔案時集合只建一次
#[must_use]
pub fn has_video_extension(path: &Path, video_extensions: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| video_extensions.contains(&format!(".{}", ext.to_lowercase())))
}

/// `settings.json` 中的使用者設定，所有欄位皆可省略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub fps: Option<String>,
    pub format: String,
    pub jobs: usize,
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub extra_video_extensions: Vec<String>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            fps: None,
            format: DEFAULT_IMAGE_FORMAT.to_string(),
            jobs: 1,
            ffmpeg_path: None,
            ffprobe_path: None,
            extra_video_extensions: Vec::new(),
        }
    }
}

impl UserSettings {
    #[must_use]
    pub fn fps_or_default(&self) -> &str {
        self.fps.as_deref().unwrap_or(DEFAULT_FPS)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}
