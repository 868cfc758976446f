pub mod load;
pub mod types;

pub use load::DEFAULT_SETTINGS_FILE;
pub use types::{
    Config, DEFAULT_FPS, DEFAULT_IMAGE_FORMAT, FileTypeTable, UserSettings, has_video_extension,
};
