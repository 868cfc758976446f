use super::batch_result::{BatchResult, VideoOutcome};
use super::engine::FrameEngine;
use super::engine_invoker::EngineInvoker;
use super::extraction_spec::{ExtractionSpec, plan_extractions};
use super::progress::BatchObserver;
use super::sampling_rate::ExtractionOptions;
use crate::error::PreconditionError;
use crate::tools::VideoCatalog;
use log::{info, warn};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// 逐一處理影片並彙總結果
///
/// 任何一支影片失敗都只記錄在它自己的結果中，下一支照常處理。
/// 預設依序執行；`jobs > 1` 時使用固定大小的執行緒池。
pub struct BatchCoordinator<'a, E: FrameEngine + ?Sized> {
    engine: &'a E,
    shutdown: Arc<AtomicBool>,
    jobs: usize,
}

impl<'a, E: FrameEngine + ?Sized> BatchCoordinator<'a, E> {
    pub const fn new(engine: &'a E, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            engine,
            shutdown,
            jobs: 1,
        }
    }

    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// 先確認引擎可用，再依掃描順序處理每支影片
    ///
    /// 清單為空時不會執行任何任務，回傳空的結果
    pub fn run(
        &self,
        catalog: &VideoCatalog,
        output_root: &Path,
        options: &ExtractionOptions,
        observer: &dyn BatchObserver,
    ) -> Result<BatchResult, PreconditionError> {
        self.engine.check_available()?;

        if catalog.is_empty() {
            warn!("在 {} 找不到任何影片檔案", catalog.root.display());
            return Ok(BatchResult::new());
        }

        let specs = plan_extractions(&catalog.videos, output_root, options, catalog.is_batch());
        self.run_specs(&specs, observer)
    }

    fn run_specs(
        &self,
        specs: &[ExtractionSpec],
        observer: &dyn BatchObserver,
    ) -> Result<BatchResult, PreconditionError> {
        info!("開始擷取任務，共 {} 個影片", specs.len());
        observer.batch_started(specs.len());

        let mut result = if self.jobs > 1 {
            self.run_parallel(specs, observer)?
        } else {
            self.run_sequential(specs, observer)
        };

        if self.shutdown.load(Ordering::SeqCst) {
            result.mark_interrupted();
        }
        result.sort_by_discovery_order();

        info!(
            "擷取任務結束 - 成功: {}, 失敗: {}",
            result.total_succeeded(),
            result.total_failed()
        );
        observer.batch_finished(&result);
        Ok(result)
    }

    fn run_sequential(&self, specs: &[ExtractionSpec], observer: &dyn BatchObserver) -> BatchResult {
        let mut result = BatchResult::new();
        for (index, spec) in specs.iter().enumerate() {
            if self.shutdown.load(Ordering::SeqCst) {
                warn!("收到中斷信號，停止處理剩餘 {} 個影片", specs.len() - index);
                break;
            }
            result.record(self.run_job(index, specs.len(), spec, observer));
        }
        result
    }

    fn run_parallel(
        &self,
        specs: &[ExtractionSpec],
        observer: &dyn BatchObserver,
    ) -> Result<BatchResult, PreconditionError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| PreconditionError::config(format!("無法建立工作執行緒池: {e}")))?;

        let shared = Mutex::new(BatchResult::new());
        pool.install(|| {
            specs.par_iter().enumerate().for_each(|(index, spec)| {
                if self.shutdown.load(Ordering::SeqCst) {
                    return;
                }
                let outcome = self.run_job(index, specs.len(), spec, observer);
                shared
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .record(outcome);
            });
        });

        Ok(shared.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    fn run_job(
        &self,
        index: usize,
        total: usize,
        spec: &ExtractionSpec,
        observer: &dyn BatchObserver,
    ) -> VideoOutcome {
        observer.job_started(index, total, spec);

        let invoker = EngineInvoker::new(self.engine, &self.shutdown);
        let outcome = VideoOutcome::from_result(index, spec, invoker.run(spec));
        if let Some(error) = &outcome.error {
            warn!(
                "擷取失敗 [{}] {}: {error}",
                error.kind(),
                spec.source_path().display()
            );
        }

        observer.job_finished(&outcome, total);
        outcome
    }
}
