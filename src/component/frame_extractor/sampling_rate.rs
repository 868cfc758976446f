//! 全域擷取參數的解析與驗證
//!
//! 參數錯誤屬於使用者輸入錯誤，必須在任何影片開始處理前就失敗。

use crate::config::FileTypeTable;
use crate::error::PreconditionError;
use serde::Serialize;
use std::fmt;

/// 代表「保留原始幀率」的字面值
const NATIVE_SENTINELS: [&str; 3] = ["source", "native", "fps=source"];

/// 擷取的取樣率
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SamplingRate {
    /// 輸出來源的每一幀，不套用 fps 濾鏡
    Native,
    /// 每秒擷取 `value` 幀；`expr` 是原樣傳給 ffmpeg 的表示式
    Rate { value: f64, expr: String },
}

impl SamplingRate {
    /// 接受正數（整數、小數或 `分子/分母`），或 `source`/`native`/`fps=source`
    pub fn parse(raw: &str) -> Result<Self, PreconditionError> {
        let normalized = raw.trim().to_ascii_lowercase();
        if NATIVE_SENTINELS.contains(&normalized.as_str()) {
            return Ok(Self::Native);
        }

        let expr = normalized.strip_prefix("fps=").unwrap_or(&normalized).trim();
        let value = match expr.split_once('/') {
            Some((num, den)) => {
                let num = parse_positive(num);
                let den = parse_positive(den);
                num.zip(den).map(|(n, d)| n / d)
            }
            None => parse_positive(expr),
        };

        match value {
            Some(value) if value.is_finite() && value > 0.0 => Ok(Self::Rate {
                value,
                expr: expr.to_string(),
            }),
            _ => Err(PreconditionError::config(format!(
                "無效的 fps 值 '{raw}'：必須是正數或 'source'"
            ))),
        }
    }

    /// 對應的 ffmpeg 視訊濾鏡；原始幀率時不需要濾鏡
    #[must_use]
    pub fn filter(&self) -> Option<String> {
        match self {
            Self::Native => None,
            Self::Rate { expr, .. } => Some(format!("fps={expr}")),
        }
    }

    /// 依影片長度與原始幀率估算會輸出的幀數
    #[must_use]
    pub fn estimate_frames(&self, duration_seconds: f64, native_fps: Option<f64>) -> Option<u64> {
        let per_second = match self {
            Self::Native => native_fps?,
            Self::Rate { value, .. } => *value,
        };
        let estimate = (duration_seconds * per_second).ceil() + 1.0;
        (estimate.is_finite() && estimate >= 0.0).then_some(estimate as u64)
    }
}

impl fmt::Display for SamplingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "source"),
            Self::Rate { expr, .. } => write!(f, "{expr}"),
        }
    }
}

fn parse_positive(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// 已驗證的輸出圖片格式（小寫、不含前導點）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageFormat(String);

impl ImageFormat {
    pub fn parse(raw: &str, file_type_table: &FileTypeTable) -> Result<Self, PreconditionError> {
        let normalized = raw.trim().trim_start_matches('.').to_ascii_lowercase();
        if normalized.is_empty() || !file_type_table.is_image_format(&normalized) {
            return Err(PreconditionError::config(format!(
                "不支援的圖片格式 '{raw}'，可用格式: {}",
                file_type_table.image_format.join(", ")
            )));
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_jpeg(&self) -> bool {
        matches!(self.0.as_str(), "jpg" | "jpeg")
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 整個批次共用的擷取參數
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionOptions {
    pub sampling_rate: SamplingRate,
    pub image_format: ImageFormat,
}

impl ExtractionOptions {
    pub fn parse(
        fps: &str,
        format: &str,
        file_type_table: &FileTypeTable,
    ) -> Result<Self, PreconditionError> {
        Ok(Self {
            sampling_rate: SamplingRate::parse(fps)?,
            image_format: ImageFormat::parse(format, file_type_table)?,
        })
    }
}
