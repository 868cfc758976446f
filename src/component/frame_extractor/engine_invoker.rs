use super::engine::{EngineRun, FrameEngine};
use super::extraction_spec::{ExtractionSpec, FrameNaming};
use crate::error::JobError;
use crate::tools::{VideoInfo, ensure_directory_exists};
use log::{debug, info, warn};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::LazyLock;
use std::sync::atomic::AtomicBool;
use std::time::{SystemTime, UNIX_EPOCH};

static IO_FAILURE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)permission denied|no space left on device|read-only file system|disk quota exceeded")
        .expect("Invalid regex")
});

static INVALID_INPUT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)invalid data found when processing input|moov atom not found|matches no streams|does not contain any stream|no such file or directory|could not find codec parameters",
    )
    .expect("Invalid regex")
});

/// 單支影片擷取成功的結果
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFrames {
    pub frames_written: u64,
    pub info: Option<VideoInfo>,
    /// 成功但需要使用者注意的狀況，例如編號超出補零寬度
    pub warning: Option<String>,
}

/// 執行前輸出資料夾內已存在的幀檔
///
/// 檔案時間戳的精度可能粗到與上一次執行分不出先後，所以擷取快照時
/// 把既有幀檔的修改時間標成 `UNIX_EPOCH`，引擎改寫後就一定不同；
/// 沒被改寫的檔案由 `restore` 還原原本的修改時間。
#[derive(Debug, Default)]
pub struct FrameSnapshot {
    existing: HashMap<String, SnapshotEntry>,
}

#[derive(Debug, Clone, Copy)]
struct SnapshotEntry {
    modified: Option<SystemTime>,
    len: u64,
    marked: bool,
}

impl FrameSnapshot {
    pub fn capture(dir: &Path, naming: &FrameNaming) -> io::Result<Self> {
        let mut existing = HashMap::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !entry.file_type()?.is_file() || !naming.matches(&name) {
                continue;
            }
            let metadata = entry.metadata()?;
            let marked = match set_modified(&entry.path(), UNIX_EPOCH) {
                Ok(()) => true,
                Err(e) => {
                    debug!("無法標記既有幀檔 {name}: {e}");
                    false
                }
            };
            existing.insert(
                name,
                SnapshotEntry {
                    modified: metadata.modified().ok(),
                    len: metadata.len(),
                    marked,
                },
            );
        }
        Ok(Self { existing })
    }

    /// 檔案在快照之後是否被新建或改寫
    fn is_written(&self, name: &str, modified: Option<SystemTime>, len: u64) -> bool {
        match self.existing.get(name) {
            None => true,
            Some(entry) if entry.marked => modified != Some(UNIX_EPOCH) || entry.len != len,
            Some(entry) => entry.modified != modified || entry.len != len,
        }
    }

    /// 還原沒有被引擎改寫的既有幀檔的修改時間
    pub fn restore(&self, dir: &Path) {
        for (name, entry) in &self.existing {
            let Some(original) = entry.modified.filter(|_| entry.marked) else {
                continue;
            };
            let path = dir.join(name);
            let Ok(metadata) = fs::metadata(&path) else {
                continue;
            };
            if self.is_written(name, metadata.modified().ok(), metadata.len()) {
                continue;
            }
            if let Err(e) = set_modified(&path, original) {
                debug!("無法還原幀檔修改時間 {name}: {e}");
            }
        }
    }
}

fn set_modified(path: &Path, time: SystemTime) -> io::Result<()> {
    fs::File::options().write(true).open(path)?.set_modified(time)
}

/// 這次執行寫出的幀
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WrittenFrames {
    pub count: u64,
    /// 寫出的檔名中最長的編號位數
    pub widest_index: usize,
}

/// 對單一 `ExtractionSpec` 執行引擎並判定成敗
pub struct EngineInvoker<'a, E: FrameEngine + ?Sized> {
    engine: &'a E,
    shutdown: &'a AtomicBool,
}

impl<'a, E: FrameEngine + ?Sized> EngineInvoker<'a, E> {
    pub const fn new(engine: &'a E, shutdown: &'a AtomicBool) -> Self {
        Self { engine, shutdown }
    }

    pub fn run(&self, spec: &ExtractionSpec) -> Result<ExtractedFrames, JobError> {
        verify_source(spec.source_path())?;

        let info = self.engine.probe(spec.source_path())?;
        if let Some(duration) = info.as_ref().and_then(|i| i.duration_seconds)
            && duration <= 0.0
        {
            return Err(JobError::InvalidInput("影片長度為 0".to_string()));
        }

        let naming = effective_naming(spec, info.as_ref());
        prepare_destination(&spec.destination_dir)?;

        let snapshot = FrameSnapshot::capture(&spec.destination_dir, &naming)
            .map_err(|e| read_dir_failure(&spec.destination_dir, &e))?;
        let run = self.engine.execute(spec, &naming, self.shutdown);
        let written = count_written_frames(&spec.destination_dir, &naming, &snapshot);
        snapshot.restore(&spec.destination_dir);

        let run = run?;
        if !run.success {
            return Err(classify_failure(&run));
        }

        let written = written.map_err(|e| read_dir_failure(&spec.destination_dir, &e))?;
        let frames_written = written.count;

        if frames_written == 0 {
            return Err(JobError::EngineExecutionFailed(
                "ffmpeg 正常結束但沒有輸出任何幀，取樣設定沒有選到任何幀".to_string(),
            ));
        }

        let warning = index_overflow_warning(&naming, written.widest_index);
        if let Some(message) = &warning {
            warn!("{}: {message}", spec.video.file_name());
        }

        info!(
            "擷取完成: {} -> {} ({} 幀)",
            spec.video.file_name(),
            spec.destination_dir.display(),
            frames_written
        );

        Ok(ExtractedFrames {
            frames_written,
            info,
            warning,
        })
    }
}

fn verify_source(path: &Path) -> Result<(), JobError> {
    let metadata = fs::metadata(path)
        .map_err(|e| JobError::InvalidInput(format!("無法讀取來源檔案: {e}")))?;
    if !metadata.is_file() {
        return Err(JobError::InvalidInput("來源不是檔案".to_string()));
    }
    if metadata.len() == 0 {
        return Err(JobError::InvalidInput("來源檔案是空的".to_string()));
    }
    fs::File::open(path)
        .map(|_| ())
        .map_err(|e| JobError::InvalidInput(format!("無法開啟來源檔案: {e}")))
}

/// 依探測到的長度加寬編號位數，避免超過六位數時排序錯亂
fn effective_naming(spec: &ExtractionSpec, info: Option<&VideoInfo>) -> FrameNaming {
    let expected = info.and_then(|info| {
        let duration = info.duration_seconds?;
        spec.sampling_rate.estimate_frames(duration, info.frame_rate)
    });
    match expected {
        Some(frames) => {
            let naming = spec.naming.widened_for(frames);
            if naming.width != spec.naming.width {
                debug!("預估 {frames} 幀，編號寬度改為 {}", naming.width);
            }
            naming
        }
        None => spec.naming.clone(),
    }
}

fn prepare_destination(dir: &Path) -> Result<(), JobError> {
    ensure_directory_exists(dir).map_err(|e| JobError::IoFailure(format!("{e:#}")))?;
    let metadata = fs::metadata(dir).map_err(|e| {
        JobError::IoFailure(format!("無法讀取輸出資料夾 {}: {e}", dir.display()))
    })?;
    if metadata.permissions().readonly() {
        return Err(JobError::IoFailure(format!(
            "輸出資料夾不可寫入: {}",
            dir.display()
        )));
    }
    Ok(())
}

/// 計算這次執行實際寫出的幀數
///
/// 只計入符合命名規則、且相對於執行前快照為新建或被改寫的檔案，
/// 先前執行留下的舊檔不會讓「零幀」被誤判為成功。
pub fn count_written_frames(
    dir: &Path,
    naming: &FrameNaming,
    before: &FrameSnapshot,
) -> io::Result<WrittenFrames> {
    let mut written = WrittenFrames::default();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !naming.matches(&name) {
            continue;
        }
        let metadata = entry.metadata()?;
        if before.is_written(&name, metadata.modified().ok(), metadata.len()) {
            written.count += 1;
            written.widest_index = written.widest_index.max(naming.index_digits(&name));
        }
    }

    Ok(written)
}

/// 編號超過補零寬度時檔名的字典序與幀順序不再一致
fn index_overflow_warning(naming: &FrameNaming, widest_index: usize) -> Option<String> {
    (widest_index > naming.width).then(|| {
        format!(
            "幀編號超過 {} 位數（最長 {widest_index} 位），檔名排序與幀順序不一致",
            naming.width
        )
    })
}

fn read_dir_failure(dir: &Path, e: &io::Error) -> JobError {
    JobError::IoFailure(format!("無法讀取輸出資料夾 {}: {e}", dir.display()))
}

/// 依 stderr 內容判斷失敗種類，訊息取最後一行
fn classify_failure(run: &EngineRun) -> JobError {
    let last_line = run
        .stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("沒有錯誤輸出");
    let detail = match run.exit_code {
        Some(code) => format!("ffmpeg 結束碼 {code}: {last_line}"),
        None => format!("ffmpeg 被訊號終止: {last_line}"),
    };

    if IO_FAILURE_PATTERN.is_match(&run.stderr) {
        JobError::IoFailure(detail)
    } else if INVALID_INPUT_PATTERN.is_match(&run.stderr) {
        JobError::InvalidInput(detail)
    } else {
        JobError::EngineExecutionFailed(detail)
    }
}
