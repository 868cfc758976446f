use super::extraction_spec::{ExtractionSpec, FrameNaming};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 單次擷取的 ffmpeg 指令
pub struct FfmpegCommand {
    source_path: PathBuf,
    output_pattern: PathBuf,
    filter: Option<String>,
    jpeg_quality: bool,
}

impl FfmpegCommand {
    #[must_use]
    pub fn new(spec: &ExtractionSpec, naming: &FrameNaming) -> Self {
        Self {
            source_path: spec.source_path().to_path_buf(),
            output_pattern: spec.destination_dir.join(naming.ffmpeg_pattern()),
            filter: spec.sampling_rate.filter(),
            jpeg_quality: spec.image_format.is_jpeg(),
        }
    }

    #[must_use]
    pub fn output_pattern(&self) -> &Path {
        &self.output_pattern
    }

    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(self.source_path.clone().into_os_string());
        args.extend(["-map", "0:v:0"].into_iter().map(OsString::from));

        // 原始幀率：不做時間取樣，也不讓 image2 補幀或丟幀
        match &self.filter {
            Some(filter) => {
                args.push("-vf".into());
                args.push(filter.into());
            }
            None => args.extend(["-fps_mode", "passthrough"].into_iter().map(OsString::from)),
        }

        args.extend(["-start_number", "0"].into_iter().map(OsString::from));
        if self.jpeg_quality {
            args.extend(["-q:v", "2"].into_iter().map(OsString::from));
        }
        args.push(self.output_pattern.clone().into_os_string());
        args
    }

    #[must_use]
    pub fn build_command(&self, ffmpeg: &Path) -> Command {
        let mut cmd = Command::new(ffmpeg);
        cmd.args(self.args());
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::frame_extractor::sampling_rate::ExtractionOptions;
    use crate::config::FileTypeTable;
    use crate::tools::VideoFile;

    fn spec(fps: &str, format: &str) -> ExtractionSpec {
        let table = FileTypeTable {
            video_file: vec![".mp4".to_string()],
            image_format: vec!["png".to_string(), "jpg".to_string()],
        };
        let options = ExtractionOptions::parse(fps, format, &table).unwrap();
        ExtractionSpec::new(
            &VideoFile::new(PathBuf::from("/videos/test.mp4")),
            PathBuf::from("/frames/test"),
            &options,
        )
    }

    fn args_as_strings(cmd: &FfmpegCommand) -> Vec<String> {
        cmd.args()
            .into_iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_rate_command_uses_fps_filter() {
        let spec = spec("1", "png");
        let cmd = FfmpegCommand::new(&spec, &spec.naming);
        let args = args_as_strings(&cmd);

        assert_eq!(cmd.output_pattern(), Path::new("/frames/test/frame_%06d.png"));
        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "fps=1");
        assert!(!args.contains(&"-fps_mode".to_string()));
        let start = args.iter().position(|a| a == "-start_number").unwrap();
        assert_eq!(args[start + 1], "0");
        assert_eq!(args.last().unwrap(), "/frames/test/frame_%06d.png");
    }

    #[test]
    fn test_native_command_passes_frames_through() {
        let spec = spec("source", "png");
        let cmd = FfmpegCommand::new(&spec, &spec.naming);
        let args = args_as_strings(&cmd);

        assert!(!args.contains(&"-vf".to_string()));
        let mode = args.iter().position(|a| a == "-fps_mode").unwrap();
        assert_eq!(args[mode + 1], "passthrough");
    }

    #[test]
    fn test_jpeg_sets_quality_and_widened_pattern() {
        let spec = spec("2", "jpg");
        let naming = spec.naming.widened_for(50_000_000);
        let cmd = FfmpegCommand::new(&spec, &naming);
        let args = args_as_strings(&cmd);

        let q = args.iter().position(|a| a == "-q:v").unwrap();
        assert_eq!(args[q + 1], "2");
        assert_eq!(args.last().unwrap(), "/frames/test/frame_%08d.jpg");
    }

    #[test]
    fn test_input_follows_dash_i() {
        let spec = spec("1", "png");
        let args = args_as_strings(&FfmpegCommand::new(&spec, &spec.naming));
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input + 1], "/videos/test.mp4");
    }
}
