use super::batch_result::{BatchResult, VideoOutcome};
use super::extraction_spec::ExtractionSpec;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// 批次進度的接收端，每完成一支影片就會被通知一次
pub trait BatchObserver: Sync {
    fn batch_started(&self, _total: usize) {}
    fn job_started(&self, _index: usize, _total: usize, _spec: &ExtractionSpec) {}
    fn job_finished(&self, _outcome: &VideoOutcome, _total: usize) {}
    fn batch_finished(&self, _result: &BatchResult) {}
}

/// 不輸出任何進度
pub struct SilentObserver;

impl BatchObserver for SilentObserver {}

/// 終端機進度輸出；`quiet` 時完全不輸出
pub struct ConsoleProgress {
    quiet: bool,
    bar: ProgressBar,
}

impl ConsoleProgress {
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(0);
            if let Ok(bar_style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            {
                bar.set_style(bar_style.progress_chars("#>-"));
            }
            bar
        };
        Self { quiet, bar }
    }

    fn line(&self, text: String) {
        if self.quiet {
            return;
        }
        // 進度條隱藏時（非終端機）也要印出
        self.bar.suspend(|| println!("{text}"));
    }
}

impl BatchObserver for ConsoleProgress {
    fn batch_started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.line(format!(
            "{}",
            style(format!("找到 {total} 個影片檔案")).green()
        ));
    }

    fn job_started(&self, index: usize, total: usize, spec: &ExtractionSpec) {
        let name = spec.video.file_name();
        self.bar.set_message(name.clone());
        self.line(format!(
            "{} [{}/{}] {} (fps: {}, 格式: {})",
            style("處理中").cyan(),
            index + 1,
            total,
            style(&name).bold(),
            spec.sampling_rate,
            spec.image_format
        ));
    }

    fn job_finished(&self, outcome: &VideoOutcome, total: usize) {
        let name = outcome.video.file_name();
        let position = format!("[{}/{}]", outcome.index + 1, total);

        if let Some(info) = &outcome.info {
            let duration = info
                .duration_seconds
                .map_or_else(|| "?".to_string(), |d| format!("{d:.2}s"));
            let fps = info
                .frame_rate
                .map_or_else(|| "?".to_string(), |r| format!("{r:.2}"));
            self.line(format!(
                "  {} 長度: {duration}  FPS: {fps}  解析度: {}x{}",
                style(&position).dim(),
                info.width,
                info.height
            ));
        }

        match outcome.error_detail() {
            None => self.line(format!(
                "  {} {} {} 擷取 {} 幀 -> {}",
                style(&position).dim(),
                style("✓").green(),
                name,
                outcome.frames_written,
                outcome.destination_dir.display()
            )),
            Some(reason) => self.line(format!(
                "  {} {} {}: {}",
                style(&position).dim(),
                style("✗").red(),
                name,
                reason
            )),
        }
        if let Some(warning) = &outcome.warning {
            self.line(format!(
                "  {} {} {}",
                style(&position).dim(),
                style("⚠").yellow(),
                warning
            ));
        }
        self.bar.inc(1);
    }

    fn batch_finished(&self, _result: &BatchResult) {
        self.bar.finish_and_clear();
    }
}
