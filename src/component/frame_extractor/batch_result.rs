use super::engine_invoker::ExtractedFrames;
use super::extraction_spec::ExtractionSpec;
use crate::error::JobError;
use crate::tools::{VideoFile, VideoInfo};
use log::warn;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    Succeeded,
    Failed,
}

/// 單支影片的處理結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoOutcome {
    /// 在掃描結果中的順序
    pub index: usize,
    pub video: VideoFile,
    pub destination_dir: PathBuf,
    pub status: JobStatus,
    pub frames_written: u64,
    pub error: Option<JobError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<VideoInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl VideoOutcome {
    #[must_use]
    pub fn from_result(
        index: usize,
        spec: &ExtractionSpec,
        result: Result<ExtractedFrames, JobError>,
    ) -> Self {
        let (status, frames_written, error, info, warning) = match result {
            Ok(extracted) => (
                JobStatus::Succeeded,
                extracted.frames_written,
                None,
                extracted.info,
                extracted.warning,
            ),
            Err(e) => (JobStatus::Failed, 0, Some(e), None, None),
        };
        Self {
            index,
            video: spec.video.clone(),
            destination_dir: spec.destination_dir.clone(),
            status,
            frames_written,
            error,
            info,
            warning,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == JobStatus::Succeeded
    }

    #[must_use]
    pub fn error_detail(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

/// 一次批次的彙總結果
///
/// 每支影片只會記錄一次；總數一律由記錄推導，不另外儲存
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    outcomes: Vec<VideoOutcome>,
    interrupted: bool,
}

impl BatchResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 記錄一支影片的結果；同一支影片重複記錄時忽略並回傳 `false`
    pub fn record(&mut self, outcome: VideoOutcome) -> bool {
        if self.get(&outcome.video.path).is_some() {
            warn!("重複的處理結果，已忽略: {}", outcome.video.path.display());
            return false;
        }
        self.outcomes.push(outcome);
        true
    }

    pub fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    /// 平行處理時完成順序不固定，結束後依掃描順序排列
    pub(crate) fn sort_by_discovery_order(&mut self) {
        self.outcomes.sort_by_key(|outcome| outcome.index);
    }

    #[must_use]
    pub fn outcomes(&self) -> &[VideoOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&VideoOutcome> {
        self.outcomes.iter().find(|outcome| outcome.video.path == path)
    }

    #[must_use]
    pub fn was_interrupted(&self) -> bool {
        self.interrupted
    }

    #[must_use]
    pub fn total_attempted(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn total_succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    #[must_use]
    pub fn total_failed(&self) -> usize {
        self.total_attempted() - self.total_succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
            frames_written: if error.is_some() { 0 } else { 10 },
            error,
            info: None,
            warning: None,
        }
    }

    #[test]
    fn test_totals_follow_records() {
        let mut result = BatchResult::new();
        assert_eq!(result.total_attempted(), 0);

        result.record(outcome(0, "a.mp4", None));
        result.record(outcome(1, "b.mp4", Some(JobError::Interrupted)));
        result.record(outcome(2, "c.mp4", None));

        assert_eq!(result.total_attempted(), 3);
        assert_eq!(result.total_succeeded(), 2);
        assert_eq!(result.total_failed(), 1);
        assert_eq!(
            result.total_succeeded() + result.total_failed(),
            result.total_attempted()
        );
    }

    #[test]
    fn test_duplicate_record_is_ignored() {
        let mut result = BatchResult::new();
        assert!(result.record(outcome(0, "a.mp4", None)));
        assert!(!result.record(outcome(0, "a.mp4", Some(JobError::Interrupted))));
        assert_eq!(result.total_attempted(), 1);
        assert!(result.get(Path::new("/in/a.mp4")).unwrap().is_success());
    }

    #[test]
    fn test_sort_by_discovery_order() {
        let mut result = BatchResult::new();
        result.record(outcome(2, "c.mp4", None));
        result.record(outcome(0, "a.mp4", None));
        result.record(outcome(1, "b.mp4", None));
        result.sort_by_discovery_order();

        let order: Vec<_> = result.outcomes().iter().map(|o| o.index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_error_detail() {
        let failed = outcome(0, "a.mp4", Some(JobError::IoFailure("disk full".into())));
        assert_eq!(failed.error_detail().unwrap(), "I/O 錯誤: disk full");
        assert!(outcome(1, "b.mp4", None).error_detail().is_none());
    }
}
