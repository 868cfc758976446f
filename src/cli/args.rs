use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "video_frame_extract",
    version,
    about = "將影片（或整個資料夾的影片）依取樣率擷取成一連串圖片"
)]
pub struct Cli {
    /// 輸入影片檔案或資料夾（資料夾會遞迴掃描）
    pub input: PathBuf,

    /// 輸出資料夾；資料夾輸入時每支影片輸出到 <output>/<檔名>
    pub output: PathBuf,

    /// 取樣率：正數（例如 1、0.5、30000/1001）或 source 保留原始幀率，預設 30
    #[arg(long)]
    pub fps: Option<String>,

    /// 輸出圖片格式（png、jpg、bmp、webp、tiff），預設 png
    #[arg(long)]
    pub format: Option<String>,

    /// 不顯示逐支影片的進度
    #[arg(short, long)]
    pub quiet: bool,

    /// 同時處理的影片數量，預設 1
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: Option<u32>,

    /// ffmpeg 執行檔路徑
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// ffprobe 執行檔路徑
    #[arg(long, value_name = "PATH")]
    pub ffprobe: Option<PathBuf>,

    /// 設定檔路徑，預設為工作目錄下的 settings.json
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// 將處理結果寫成 JSON 報告
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// 顯示較詳細的日誌
    #[arg(short, long)]
    pub verbose: bool,
}
