use super::sampling_rate::{ExtractionOptions, ImageFormat, SamplingRate};
use crate::tools::VideoFile;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 幀編號的最小補零寬度（`frame_000000`）
pub const DEFAULT_INDEX_WIDTH: usize = 6;
const FRAME_PREFIX: &str = "frame_";

/// 輸出圖片的命名規則：`frame_<補零編號>.<副檔名>`，編號從 0 開始
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameNaming {
    pub width: usize,
    pub extension: String,
}

impl FrameNaming {
    #[must_use]
    pub fn new(format: &ImageFormat) -> Self {
        Self {
            width: DEFAULT_INDEX_WIDTH,
            extension: format.extension().to_string(),
        }
    }

    /// 預估幀數放不進目前寬度時，加寬補零位數
    #[must_use]
    pub fn widened_for(&self, expected_frames: u64) -> Self {
        let needed = expected_frames.saturating_sub(1).to_string().len();
        Self {
            width: self.width.max(needed),
            extension: self.extension.clone(),
        }
    }

    /// ffmpeg image2 輸出樣板，例如 `frame_%06d.png`
    #[must_use]
    pub fn ffmpeg_pattern(&self) -> String {
        format!("{FRAME_PREFIX}%0{}d.{}", self.width, self.extension)
    }

    #[must_use]
    pub fn file_name(&self, index: u64) -> String {
        format!(
            "{FRAME_PREFIX}{index:0width$}.{}",
            self.extension,
            width = self.width
        )
    }

    /// 檔名是否符合本規則；編號超過寬度時 ffmpeg 會直接寫出更多位數，一樣算符合
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.index_part(file_name).is_some()
    }

    /// 檔名中編號的位數，不符合規則時為 0
    #[must_use]
    pub fn index_digits(&self, file_name: &str) -> usize {
        self.index_part(file_name).map_or(0, str::len)
    }

    fn index_part<'n>(&self, file_name: &'n str) -> Option<&'n str> {
        let digits = file_name
            .strip_prefix(FRAME_PREFIX)?
            .strip_suffix(self.extension.as_str())?
            .strip_suffix('.')?;
        (digits.len() >= self.width && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
    }
}

/// 單一影片的完整擷取描述，建立後不再變動
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionSpec {
    pub video: VideoFile,
    pub destination_dir: PathBuf,
    pub sampling_rate: SamplingRate,
    pub image_format: ImageFormat,
    pub naming: FrameNaming,
}

impl ExtractionSpec {
    #[must_use]
    pub fn new(video: &VideoFile, destination_dir: PathBuf, options: &ExtractionOptions) -> Self {
        Self {
            video: video.clone(),
            destination_dir,
            sampling_rate: options.sampling_rate.clone(),
            image_format: options.image_format.clone(),
            naming: FrameNaming::new(&options.image_format),
        }
    }

    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.video.path
    }
}

/// 為批次中的每支影片分配不重複的輸出子資料夾
///
/// 同名（不分大小寫）時依出現順序加上 `_1`、`_2`…
#[derive(Debug, Default)]
pub struct DestinationAllocator {
    used: HashSet<String>,
}

impl DestinationAllocator {
    pub fn allocate(&mut self, stem: &str) -> String {
        let mut candidate = stem.to_string();
        let mut suffix = 0usize;
        while !self.used.insert(candidate.to_lowercase()) {
            suffix += 1;
            candidate = format!("{stem}_{suffix}");
        }
        candidate
    }
}

/// 建立整個批次的擷取描述
///
/// 單一檔案輸入時直接輸出到 `output_root`；
/// 資料夾輸入時每支影片輸出到 `output_root/<stem>`
#[must_use]
pub fn plan_extractions(
    videos: &[VideoFile],
    output_root: &Path,
    options: &ExtractionOptions,
    is_batch: bool,
) -> Vec<ExtractionSpec> {
    let mut allocator = DestinationAllocator::default();
    videos
        .iter()
        .map(|video| {
            let destination = if is_batch {
                output_root.join(allocator.allocate(&video.stem()))
            } else {
                output_root.to_path_buf()
            };
            ExtractionSpec::new(video, destination, options)
        })
        .collect()
}
