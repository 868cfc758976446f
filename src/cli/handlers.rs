use super::args::Cli;
use crate::component::frame_extractor::{
    ConsoleProgress, EXIT_FAILURE, EXIT_PRECONDITION, EXIT_SUCCESS, ExtractionOptions,
    FfmpegEngine, FrameExtractor, summarize, write_report,
};
use crate::config::Config;
use crate::error::PreconditionError;
use crate::tools::{EngineBinaries, resolve_user_path};
use console::style;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 執行一次擷取，回傳程序結束碼
///
/// 前置條件錯誤回傳 2，其餘依批次結果決定
pub fn execute(cli: &Cli, shutdown_signal: &Arc<AtomicBool>) -> i32 {
    match run(cli, shutdown_signal) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            eprintln!("{} {}", style("錯誤:").red().bold(), e);
            EXIT_PRECONDITION
        }
    }
}

fn run(cli: &Cli, shutdown_signal: &Arc<AtomicBool>) -> Result<i32, PreconditionError> {
    let config = Config::load(cli.config.as_deref())
        .map_err(|e| PreconditionError::config(format!("{e:#}")))?;
    let settings = &config.settings;

    let input = resolve(&cli.input)?;
    let output = resolve(&cli.output)?;
    if output.exists() && !output.is_dir() {
        return Err(PreconditionError::config(format!(
            "輸出路徑不是資料夾: {}",
            output.display()
        )));
    }

    let fps = cli.fps.as_deref().unwrap_or_else(|| settings.fps_or_default());
    let format = cli.format.as_deref().unwrap_or(&settings.format);
    let options = ExtractionOptions::parse(fps, format, &config.file_type_table)?;

    let jobs = cli.jobs.map_or(settings.jobs, |jobs| jobs as usize);
    if jobs == 0 {
        return Err(PreconditionError::config("jobs 必須至少為 1"));
    }

    let binaries = EngineBinaries::resolve(
        cli.ffmpeg.as_deref().or(settings.ffmpeg_path.as_deref()),
        cli.ffprobe.as_deref().or(settings.ffprobe_path.as_deref()),
    );
    let engine = FfmpegEngine::new(binaries);
    let progress = ConsoleProgress::new(cli.quiet);

    let result = FrameExtractor::new(&engine, &config.file_type_table, Arc::clone(shutdown_signal))
        .with_jobs(jobs)
        .run(&input, &output, &options, &progress, cli.quiet)?;

    let summary = summarize(&result, &output);
    summary.print();

    let mut exit_code = summary.exit_code;
    if let Some(report_path) = &cli.report
        && let Err(e) = write_report(&result, &output, report_path)
    {
        error!("寫入報告失敗: {e:#}");
        eprintln!("{} {e:#}", style("無法寫入報告:").red().bold());
        if exit_code == EXIT_SUCCESS {
            exit_code = EXIT_FAILURE;
        }
    }

    info!("程序結束，結束碼 {exit_code}");
    Ok(exit_code)
}

fn resolve(path: &Path) -> Result<PathBuf, PreconditionError> {
    resolve_user_path(path).map_err(|e| PreconditionError::config(format!("{e:#}")))
}
