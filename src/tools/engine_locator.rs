use log::debug;
use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};

/// 隨程式一同發佈的 ffmpeg 位置（相對於執行檔）
const BUNDLED_ENGINE_DIR: &str = "ffmpeg/bin";

/// ffmpeg 與 ffprobe 的實際執行路徑
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineBinaries {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl EngineBinaries {
    /// 依序尋找：明確指定的路徑 → 執行檔旁的 `ffmpeg/bin` → `PATH`
    ///
    /// 只指定 ffmpeg 時，若同一資料夾內有 ffprobe 則一併使用
    #[must_use]
    pub fn resolve(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Self {
        let bundled = bundled_engine_dir();
        Self::resolve_with(ffmpeg, ffprobe, bundled.as_deref())
    }

    fn resolve_with(ffmpeg: Option<&Path>, ffprobe: Option<&Path>, bundled: Option<&Path>) -> Self {
        let ffmpeg_path = ffmpeg
            .map(Path::to_path_buf)
            .or_else(|| bundled.and_then(|dir| existing_binary(dir, "ffmpeg")))
            .unwrap_or_else(|| PathBuf::from("ffmpeg"));

        let sibling_dir = ffmpeg.and_then(Path::parent);
        let ffprobe_path = ffprobe
            .map(Path::to_path_buf)
            .or_else(|| sibling_dir.and_then(|dir| existing_binary(dir, "ffprobe")))
            .or_else(|| bundled.and_then(|dir| existing_binary(dir, "ffprobe")))
            .unwrap_or_else(|| PathBuf::from("ffprobe"));

        debug!(
            "引擎路徑: ffmpeg={}, ffprobe={}",
            ffmpeg_path.display(),
            ffprobe_path.display()
        );

        Self {
            ffmpeg: ffmpeg_path,
            ffprobe: ffprobe_path,
        }
    }
}

fn bundled_engine_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?.join(BUNDLED_ENGINE_DIR);
    dir.is_dir().then_some(dir)
}

fn existing_binary(dir: &Path, name: &str) -> Option<PathBuf> {
    let candidate = dir.join(format!("{name}{EXE_SUFFIX}"));
    candidate.is_file().then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_to_path_lookup() {
        let binaries = EngineBinaries::resolve_with(None, None, None);
        assert_eq!(binaries.ffmpeg, PathBuf::from("ffmpeg"));
        assert_eq!(binaries.ffprobe, PathBuf::from("ffprobe"));
    }

    #[test]
    fn test_prefers_bundled_directory() {
        let temp_dir = TempDir::new().unwrap();
        let ffmpeg = temp_dir.path().join(format!("ffmpeg{EXE_SUFFIX}"));
        let ffprobe = temp_dir.path().join(format!("ffprobe{EXE_SUFFIX}"));
        fs::write(&ffmpeg, b"").unwrap();
        fs::write(&ffprobe, b"").unwrap();

        let binaries = EngineBinaries::resolve_with(None, None, Some(temp_dir.path()));
        assert_eq!(binaries.ffmpeg, ffmpeg);
        assert_eq!(binaries.ffprobe, ffprobe);
    }

    #[test]
    fn test_explicit_ffmpeg_picks_sibling_ffprobe() {
        let temp_dir = TempDir::new().unwrap();
        let ffmpeg = temp_dir.path().join("custom-ffmpeg");
        let ffprobe = temp_dir.path().join(format!("ffprobe{EXE_SUFFIX}"));
        fs::write(&ffprobe, b"").unwrap();

        let binaries = EngineBinaries::resolve_with(Some(&ffmpeg), None, None);
        assert_eq!(binaries.ffmpeg, ffmpeg);
        assert_eq!(binaries.ffprobe, ffprobe);
    }

    #[test]
    fn test_explicit_paths_win() {
        let binaries = EngineBinaries::resolve_with(
            Some(Path::new("/opt/ff/ffmpeg")),
            Some(Path::new("/opt/probe")),
            None,
        );
        assert_eq!(binaries.ffprobe, PathBuf::from("/opt/probe"));
    }
}
