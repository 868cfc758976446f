use super::batch_result::{BatchResult, VideoOutcome};
use anyhow::{Context, Result};
use console::style;
use log::info;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_PRECONDITION: i32 = 2;
pub const EXIT_INTERRUPTED: i32 = 130;

/// 批次結束後要呈現給使用者的內容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub human: String,
    pub exit_code: i32,
}

impl Summary {
    /// 以 console 樣式輸出到標準輸出
    pub fn print(&self) {
        println!();
        for line in self.human.lines() {
            let styled = if line.starts_with("===") {
                style(line).cyan().bold().to_string()
            } else if line.trim_start().starts_with('✗') || line.starts_with("已中斷") {
                style(line).red().to_string()
            } else if line.trim_start().starts_with('✓') {
                style(line).green().to_string()
            } else {
                line.to_string()
            };
            println!("{styled}");
        }
    }
}

#[must_use]
pub fn exit_code_for(result: &BatchResult) -> i32 {
    if result.was_interrupted() {
        EXIT_INTERRUPTED
    } else if result.total_attempted() > 0 && result.total_failed() == 0 {
        EXIT_SUCCESS
    } else {
        EXIT_FAILURE
    }
}

/// 彙整批次結果：成功數、每支影片的狀態與失敗原因、輸出位置
#[must_use]
pub fn summarize(result: &BatchResult, output_root: &Path) -> Summary {
    let mut lines = vec!["=== 擷取任務摘要 ===".to_string()];

    if result.total_attempted() == 0 {
        lines.push("沒有處理任何影片".to_string());
    } else {
        lines.push(format!(
            "成功: {}/{}",
            result.total_succeeded(),
            result.total_attempted()
        ));
        if result.total_failed() > 0 {
            lines.push(format!("失敗: {}", result.total_failed()));
        }
        lines.extend(result.outcomes().iter().map(outcome_line));
    }

    if result.was_interrupted() {
        lines.push("已中斷，尚未開始的影片沒有處理".to_string());
    }
    lines.push(format!("輸出位置: {}", output_root.display()));

    let exit_code = exit_code_for(result);
    info!(
        "批次摘要 - 成功: {}, 失敗: {}, 結束碼: {exit_code}",
        result.total_succeeded(),
        result.total_failed()
    );

    Summary {
        human: lines.join("\n"),
        exit_code,
    }
}

fn outcome_line(outcome: &VideoOutcome) -> String {
    match outcome.error_detail() {
        None => {
            let line = format!(
                "  ✓ {} ({} 幀)",
                outcome.video.path.display(),
                outcome.frames_written
            );
            match &outcome.warning {
                Some(warning) => format!("{line} ⚠ {warning}"),
                None => line,
            }
        }
        // 原因只保留一行
        Some(reason) => format!(
            "  ✗ {}: {}",
            outcome.video.path.display(),
            reason.lines().next().unwrap_or_default()
        ),
    }
}

#[derive(Serialize)]
struct BatchReport<'a> {
    output_root: &'a Path,
    total_attempted: usize,
    total_succeeded: usize,
    total_failed: usize,
    interrupted: bool,
    exit_code: i32,
    videos: &'a [VideoOutcome],
}

/// 將批次結果寫成 JSON 報告
pub fn write_report(result: &BatchResult, output_root: &Path, path: &Path) -> Result<()> {
    let report = BatchReport {
        output_root,
        total_attempted: result.total_attempted(),
        total_succeeded: result.total_succeeded(),
        total_failed: result.total_failed(),
        interrupted: result.was_interrupted(),
        exit_code: exit_code_for(result),
        videos: result.outcomes(),
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;

    info!("報告已寫入: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::frame_extractor::batch_result::JobStatus;
    use crate::error::JobError;
    use crate::tools::VideoFile;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn outcome(index: usize, name: &str, error: Option<JobError>) -> VideoOutcome {
        VideoOutcome {
            index,
            video: VideoFile::new(PathBuf::from(format!("/in/{name}"))),
            destination_dir: PathBuf::from("/out"),
            status: if error.is_some() {
                JobStatus::Failed
            } else {
                JobStatus::Succeeded
            },
            frames_written: if error.is_some() { 0 } else { 12 },
            error,
            info: None,
            warning: None,
        }
    }

    fn mixed_result() -> BatchResult {
        let mut result = BatchResult::new();
        result.record(outcome(0, "a.mp4", None));
        result.record(outcome(
            1,
            "b.mp4",
            Some(JobError::InvalidInput("moov atom not found\nsecond line".into())),
        ));
        result.record(outcome(2, "c.mp4", None));
        result
    }

    #[test]
    fn test_all_success_exits_zero() {
        let mut result = BatchResult::new();
        result.record(outcome(0, "a.mp4", None));
        let summary = summarize(&result, Path::new("/out"));
        assert_eq!(summary.exit_code, EXIT_SUCCESS);
        assert!(summary.human.contains("成功: 1/1"));
        assert!(summary.human.contains("輸出位置: /out"));
    }

    #[test]
    fn test_any_failure_exits_one() {
        let summary = summarize(&mixed_result(), Path::new("/out"));
        assert_eq!(summary.exit_code, EXIT_FAILURE);
        assert!(summary.human.contains("成功: 2/3"));
        assert!(summary.human.contains("✗ /in/b.mp4: 無效的輸入: moov atom not found"));
        assert!(!summary.human.contains("second line"));
    }

    #[test]
    fn test_success_warning_is_reported() {
        let mut warned = outcome(0, "long.mp4", None);
        warned.warning = Some("幀編號超過 6 位數".to_string());
        let mut result = BatchResult::new();
        result.record(warned);

        let summary = summarize(&result, Path::new("/out"));
        assert_eq!(summary.exit_code, EXIT_SUCCESS);
        assert!(summary.human.contains("✓ /in/long.mp4 (12 幀) ⚠ 幀編號超過 6 位數"));

        let temp_dir = TempDir::new().unwrap();
        let report_path = temp_dir.path().join("batch.json");
        write_report(&result, Path::new("/out"), &report_path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(json["videos"][0]["warning"], "幀編號超過 6 位數");
    }

    #[test]
    fn test_empty_batch_exits_one() {
        let summary = summarize(&BatchResult::new(), Path::new("/out"));
        assert_eq!(summary.exit_code, EXIT_FAILURE);
        assert!(summary.human.contains("沒有處理任何影片"));
    }

    #[test]
    fn test_interrupted_exits_130() {
        let mut result = BatchResult::new();
        result.record(outcome(0, "a.mp4", None));
        result.record(outcome(1, "b.mp4", Some(JobError::Interrupted)));
        result.mark_interrupted();
        let summary = summarize(&result, Path::new("/out"));
        assert_eq!(summary.exit_code, EXIT_INTERRUPTED);
        assert!(summary.human.contains("已中斷"));
    }

    #[test]
    fn test_write_report() {
        let temp_dir = TempDir::new().unwrap();
        let report_path = temp_dir.path().join("reports").join("batch.json");

        write_report(&mixed_result(), Path::new("/out"), &report_path).unwrap();

        let content = fs::read_to_string(&report_path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["total_attempted"], 3);
        assert_eq!(json["total_succeeded"], 2);
        assert_eq!(json["total_failed"], 1);
        assert_eq!(json["exit_code"], 1);
        assert_eq!(json["videos"][1]["status"], "Failed");
        assert_eq!(json["videos"][1]["error"]["kind"], "InvalidInput");
        assert_eq!(json["videos"][0]["frames_written"], 12);
    }
}
