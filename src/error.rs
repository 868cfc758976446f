//! 錯誤分類
//!
//! 前置條件錯誤會在任何任務開始前中止整個批次；
//! 單一影片的錯誤只記錄在該影片的結果中，不影響其他影片。

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// 在任何任務開始前就必須中止的錯誤
#[derive(Error, Debug)]
pub enum PreconditionError {
    #[error("設定錯誤: {0}")]
    Configuration(String),

    #[error("輸入路徑不存在: {}", .0.display())]
    NotFound(PathBuf),

    #[error("找不到影片處理引擎 ({binary}): {detail}")]
    EngineNotFound { binary: String, detail: String },
}

impl PreconditionError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// 單一影片擷取失敗的原因
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum JobError {
    #[error("無效的輸入: {0}")]
    InvalidInput(String),

    #[error("引擎執行失敗: {0}")]
    EngineExecutionFailed(String),

    #[error("I/O 錯誤: {0}")]
    IoFailure(String),

    #[error("已中斷")]
    Interrupted,
}

impl JobError {
    /// 錯誤種類的簡短名稱，用於摘要與報告
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::EngineExecutionFailed(_) => "EngineExecutionFailed",
            Self::IoFailure(_) => "IOFailure",
            Self::Interrupted => "Interrupted",
        }
    }
}
