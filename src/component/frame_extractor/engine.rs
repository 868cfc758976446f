//! 外部影片處理引擎
//!
//! `FrameEngine` 是批次流程與實際解碼工具之間的介面，
//! 預設實作透過 ffmpeg / ffprobe 子程序完成。

use super::extraction_spec::{ExtractionSpec, FrameNaming};
use super::ffmpeg_command::FfmpegCommand;
use crate::error::{JobError, PreconditionError};
use crate::tools::{EngineBinaries, VideoInfo, get_video_info};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::{ChildStderr, Command, Stdio};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// 失敗訊息只保留 stderr 最後幾行
const STDERR_TAIL_LINES: usize = 20;

/// 引擎程序結束後的狀態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRun {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stderr: String,
}

pub trait FrameEngine: Sync {
    /// 確認引擎可用，回傳版本字串；整個執行只呼叫一次
    fn check_available(&self) -> Result<String, PreconditionError>;

    /// 取得影片資訊；無法探測（例如沒有 ffprobe）時回傳 `Ok(None)`
    fn probe(&self, source: &Path) -> Result<Option<VideoInfo>, JobError>;

    /// 執行一次擷取並等待結束；`shutdown` 被設定時必須終止程序並回傳 `Interrupted`
    fn execute(
        &self,
        spec: &ExtractionSpec,
        naming: &FrameNaming,
        shutdown: &AtomicBool,
    ) -> Result<EngineRun, JobError>;
}

pub struct FfmpegEngine {
    binaries: EngineBinaries,
    prober_available: OnceLock<bool>,
}

impl FfmpegEngine {
    #[must_use]
    pub const fn new(binaries: EngineBinaries) -> Self {
        Self {
            binaries,
            prober_available: OnceLock::new(),
        }
    }

    fn prober_available(&self) -> bool {
        *self.prober_available.get_or_init(|| {
            let available = Command::new(&self.binaries.ffprobe)
                .arg("-version")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .is_ok_and(|status| status.success());
            if !available {
                warn!(
                    "找不到 ffprobe ({})，將略過影片資訊探測",
                    self.binaries.ffprobe.display()
                );
            }
            available
        })
    }
}

impl FrameEngine for FfmpegEngine {
    fn check_available(&self) -> Result<String, PreconditionError> {
        let binary = self.binaries.ffmpeg.display().to_string();
        let output = Command::new(&self.binaries.ffmpeg)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| PreconditionError::EngineNotFound {
                binary: binary.clone(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(PreconditionError::EngineNotFound {
                binary,
                detail: format!("-version 結束碼 {:?}", output.status.code()),
            });
        }

        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        info!("使用引擎: {version}");
        Ok(version)
    }

    fn probe(&self, source: &Path) -> Result<Option<VideoInfo>, JobError> {
        if !self.prober_available() {
            return Ok(None);
        }
        get_video_info(&self.binaries.ffprobe, source)
            .map(Some)
            .map_err(|e| JobError::InvalidInput(format!("{e:#}")))
    }

    fn execute(
        &self,
        spec: &ExtractionSpec,
        naming: &FrameNaming,
        shutdown: &AtomicBool,
    ) -> Result<EngineRun, JobError> {
        let ffmpeg_cmd = FfmpegCommand::new(spec, naming);
        let mut command = ffmpeg_cmd.build_command(&self.binaries.ffmpeg);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        debug!("執行: {command:?}");

        let mut child = command
            .spawn()
            .map_err(|e| JobError::EngineExecutionFailed(format!("無法啟動 ffmpeg: {e}")))?;
        let stderr_reader = spawn_stderr_reader(child.stderr.take());

        let status = loop {
            if shutdown.load(Ordering::SeqCst) {
                warn!("終止 ffmpeg 程序 [{}]: {}", child.id(), spec.video.file_name());
                let _ = child.kill();
                let _ = child.wait();
                return Err(JobError::Interrupted);
            }

            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(JobError::EngineExecutionFailed(format!(
                        "無法檢查 ffmpeg 程序狀態: {e}"
                    )));
                }
            }
        };

        // Ctrl-C 也會送到 ffmpeg 本身，它可能比我們先結束
        if !status.success() && shutdown.load(Ordering::SeqCst) {
            return Err(JobError::Interrupted);
        }

        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        Ok(EngineRun {
            success: status.success(),
            exit_code: status.code(),
            stderr,
        })
    }
}

/// 在背景讀取 stderr，避免管線填滿卡住 ffmpeg
fn spawn_stderr_reader(stderr: Option<ChildStderr>) -> Option<JoinHandle<String>> {
    let stderr = stderr?;
    Some(thread::spawn(move || {
        let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
            if line.trim().is_empty() {
                continue;
            }
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        }
        Vec::from(tail).join("\n")
    }))
}
