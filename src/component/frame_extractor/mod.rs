//! 影片擷取幀元件
//!
//! 使用 ffmpeg 將影片依指定取樣率輸出成一連串圖片，
//! 資料夾輸入時每支影片各自輸出到獨立的子資料夾

mod batch_coordinator;
mod batch_result;
mod engine;
mod engine_invoker;
mod extraction_spec;
mod ffmpeg_command;
mod main;
mod progress;
mod result_reporter;
mod sampling_rate;

pub use batch_coordinator::BatchCoordinator;
pub use batch_result::{BatchResult, JobStatus, VideoOutcome};
pub use engine::{EngineRun, FfmpegEngine, FrameEngine};
pub use engine_invoker::{
    EngineInvoker, ExtractedFrames, FrameSnapshot, WrittenFrames, count_written_frames,
};
pub use extraction_spec::{
    DEFAULT_INDEX_WIDTH, DestinationAllocator, ExtractionSpec, FrameNaming, plan_extractions,
};
pub use ffmpeg_command::FfmpegCommand;
pub use main::FrameExtractor;
pub use progress::{BatchObserver, ConsoleProgress, SilentObserver};
pub use result_reporter::{
    EXIT_FAILURE, EXIT_INTERRUPTED, EXIT_PRECONDITION, EXIT_SUCCESS, Summary, exit_code_for,
    summarize, write_report,
};
pub use sampling_rate::{ExtractionOptions, ImageFormat, SamplingRate};
