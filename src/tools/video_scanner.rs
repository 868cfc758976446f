use crate::config::{FileTypeTable, has_video_extension};
use crate::error::PreconditionError;
use log::{debug, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// 一個待處理的影片檔案
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VideoFile {
    pub path: PathBuf,
    /// 小寫、不含前導點；沒有副檔名時為空字串
    pub extension: String,
}

impl VideoFile {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self { path, extension }
    }

    /// 去除副檔名的檔名，用於命名輸出子資料夾
    #[must_use]
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "video".to_string())
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    SingleFile,
    Directory,
}

/// 一次執行要處理的影片清單
#[derive(Debug, Clone)]
pub struct VideoCatalog {
    pub root: PathBuf,
    pub kind: InputKind,
    pub videos: Vec<VideoFile>,
    /// 掃描時略過的項目（符號連結迴圈、無法讀取的資料夾等）
    pub warnings: Vec<String>,
}

impl VideoCatalog {
    /// 依輸入路徑建立影片清單
    ///
    /// - 單一檔案：直接信任，不檢查副檔名
    /// - 資料夾：遞迴掃描，只保留支援的影片副檔名，依路徑字典序排列
    ///
    /// `exclude` 通常是輸出資料夾，位於輸入樹內時不會被掃描
    pub fn discover(
        input: &Path,
        exclude: Option<&Path>,
        file_type_table: &FileTypeTable,
    ) -> Result<Self, PreconditionError> {
        if !input.exists() {
            return Err(PreconditionError::NotFound(input.to_path_buf()));
        }

        if !input.is_dir() {
            return Ok(Self {
                root: input.to_path_buf(),
                kind: InputKind::SingleFile,
                videos: vec![VideoFile::new(input.to_path_buf())],
                warnings: Vec::new(),
            });
        }

        let excluded_dir = exclude.and_then(|p| p.canonicalize().ok());
        let video_extensions = file_type_table.video_extensions_set();
        let mut warnings = Vec::new();
        let mut videos = Vec::new();

        let walker = WalkDir::new(input)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| !is_excluded(entry, excluded_dir.as_deref()));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file()
                        && has_video_extension(entry.path(), &video_extensions)
                    {
                        videos.push(VideoFile::new(entry.into_path()));
                    }
                }
                Err(e) => {
                    let message = match e.path() {
                        Some(path) => format!("略過 {}: {e}", path.display()),
                        None => format!("略過項目: {e}"),
                    };
                    warn!("{message}");
                    warnings.push(message);
                }
            }
        }

        videos.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("在 {} 找到 {} 個影片檔案", input.display(), videos.len());

        Ok(Self {
            root: input.to_path_buf(),
            kind: InputKind::Directory,
            videos,
            warnings,
        })
    }

    #[must_use]
    pub fn is_batch(&self) -> bool {
        self.kind == InputKind::Directory
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.videos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}

fn is_excluded(entry: &DirEntry, excluded_dir: Option<&Path>) -> bool {
    let Some(excluded_dir) = excluded_dir else {
        return false;
    };
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    entry
        .path()
        .canonicalize()
        .is_ok_and(|canonical| canonical == excluded_dir)
}
