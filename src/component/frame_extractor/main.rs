use super::batch_coordinator::BatchCoordinator;
use super::batch_result::BatchResult;
use super::engine::FrameEngine;
use super::progress::BatchObserver;
use super::sampling_rate::ExtractionOptions;
use crate::config::FileTypeTable;
use crate::error::PreconditionError;
use crate::tools::VideoCatalog;
use console::style;
use log::info;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 影片擷取幀元件：掃描輸入、逐支擷取、回傳彙總結果
pub struct FrameExtractor<'a, E: FrameEngine + ?Sized> {
    engine: &'a E,
    file_type_table: &'a FileTypeTable,
    shutdown_signal: Arc<AtomicBool>,
    jobs: usize,
}

impl<'a, E: FrameEngine + ?Sized> FrameExtractor<'a, E> {
    pub const fn new(
        engine: &'a E,
        file_type_table: &'a FileTypeTable,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            engine,
            file_type_table,
            shutdown_signal,
            jobs: 1,
        }
    }

    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// 擷取 `input`（單一影片或資料夾）中所有影片的幀到 `output_root`
    ///
    /// 輸出資料夾位於輸入資料夾內時不會被當成輸入掃描
    pub fn run(
        &self,
        input: &Path,
        output_root: &Path,
        options: &ExtractionOptions,
        observer: &dyn BatchObserver,
        quiet: bool,
    ) -> Result<BatchResult, PreconditionError> {
        if !quiet {
            println!("{}", style("掃描影片檔案中...").dim());
        }
        let catalog = VideoCatalog::discover(input, Some(output_root), self.file_type_table)?;
        info!(
            "輸入 {} 共 {} 個影片，取樣: {}，格式: {}",
            input.display(),
            catalog.len(),
            options.sampling_rate,
            options.image_format
        );

        if !quiet {
            for warning in &catalog.warnings {
                eprintln!("{}", style(warning).yellow());
            }
            if catalog.is_empty() {
                println!("{}", style("找不到任何影片檔案").yellow());
            }
        }

        BatchCoordinator::new(self.engine, Arc::clone(&self.shutdown_signal))
            .with_jobs(self.jobs)
            .run(&catalog, output_root, options, observer)
    }
}
