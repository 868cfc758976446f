mod engine_locator;
mod ffprobe_info;
mod path_validator;
mod video_scanner;

pub use engine_locator::EngineBinaries;
pub use ffprobe_info::{VideoInfo, get_video_info};
pub use path_validator::{ensure_directory_exists, resolve_user_path};
pub use video_scanner::{InputKind, VideoCatalog, VideoFile};
