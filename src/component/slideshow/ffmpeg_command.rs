use super::task_scheduler::TranscodeJob;
use crate::config::OutputConfig;
use crate::tools::{MediaKind, format_duration};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// 中間影片的容器副檔名
pub const INTERMEDIATE_EXTENSION: &str = "mkv";

const SILENT_AUDIO_SOURCE: &str = "anullsrc=channel_layout=stereo:sample_rate=48000";

/// 將圖片等比縮放到畫布內，再以黑邊置中補滿，每一幀重新計算
#[must_use]
pub fn letterbox_filter(width: u32, height: u32) -> String {
    format!(
        "scale={width}:{height}:force_original_aspect_ratio=decrease:eval=frame,pad={width}:{height}:-1:-1:color=black,setsar=1"
    )
}

/// 單張圖片輸出的幀數：`floor(duration × fps)`
///
/// 以奈秒整數計算，避免浮點誤差讓 5s × 30fps 變成 149。
#[must_use]
pub fn frame_count(config: &OutputConfig) -> u64 {
    let frames = config.entry_duration.as_nanos() * u128::from(config.fps) / 1_000_000_000;
    u64::try_from(frames).unwrap_or(u64::MAX)
}

/// 將一個項目轉為統一規格中間影片的 ffmpeg 參數
///
/// 路徑以 `OsString` 原樣傳遞，非 UTF-8 檔名不會被替換字元。
pub struct IntermediateCommand {
    source_path: PathBuf,
    destination_path: PathBuf,
    args: Vec<OsString>,
}

impl IntermediateCommand {
    #[must_use]
    pub fn new(job: &TranscodeJob, scratch_dir: &Path) -> Self {
        let destination_path = Self::generate_destination_path(job, scratch_dir);
        let args = match job.item.kind {
            MediaKind::Video => Self::video_args(&job.item.path, &destination_path, &job.config),
            _ => Self::image_args(&job.item.path, &destination_path, &job.config),
        };

        Self {
            source_path: job.item.path.clone(),
            destination_path,
            args,
        }
    }

    /// 以位置作為檔名前綴，`a.jpg` 與 `a.png` 不會互相覆蓋
    fn generate_destination_path(job: &TranscodeJob, scratch_dir: &Path) -> PathBuf {
        let file_stem = job.item.path.file_stem().unwrap_or_else(|| OsStr::new("item"));

        let mut file_name = OsString::from(format!("{:05}-", job.item.position));
        file_name.push(file_stem);
        file_name.push(".");
        file_name.push(INTERMEDIATE_EXTENSION);
        scratch_dir.join(file_name)
    }

    fn input_arg(path: &Path) -> OsString {
        let mut arg = OsString::from("file:");
        arg.push(path);
        arg
    }

    fn image_args(source: &Path, destination: &Path, config: &OutputConfig) -> Vec<OsString> {
        let fps = config.fps.to_string();
        let mut args = os_args(&[
            "-hide_banner",
            "-nostdin",
            "-y",
            "-f", "lavfi",
            "-i", SILENT_AUDIO_SOURCE,
            "-loop", "1",
            "-i",
        ]);
        args.push(Self::input_arg(source));
        args.extend(os_args(&[
            "-avoid_negative_ts", "make_zero",
            "-r", &fps,
            "-frames:v", &frame_count(config).to_string(),
            "-c:v", &config.codec,
            "-crf", &config.crf.to_string(),
            "-preset", &config.preset,
            "-tune", "stillimage",
            "-movflags", "+faststart",
        ]));
        args.extend(Self::audio_args());
        args.extend(os_args(&[
            "-shortest",
            "-g", &fps,
            "-keyint_min", "1",
            "-t", &format_duration(config.entry_duration),
            "-pix_fmt", "yuv420p",
            "-vf", &letterbox_filter(config.width, config.height),
        ]));
        args.push(destination.as_os_str().to_owned());
        args
    }

    fn video_args(source: &Path, destination: &Path, config: &OutputConfig) -> Vec<OsString> {
        let mut args = os_args(&["-hide_banner", "-nostdin", "-y", "-i"]);
        args.push(Self::input_arg(source));
        args.extend(os_args(&[
            "-c:v", &config.codec,
            "-crf", &config.crf.to_string(),
            "-preset", &config.preset,
            "-tune", "film",
            "-movflags", "+faststart",
        ]));
        args.extend(Self::audio_args());
        args.extend(os_args(&[
            "-pix_fmt", "yuv420p",
            "-vf", &letterbox_filter(config.width, config.height),
        ]));
        args.push(destination.as_os_str().to_owned());
        args
    }

    /// 所有中間影片統一的音訊規格，合併時才能直接串接
    fn audio_args() -> Vec<OsString> {
        os_args(&["-c:a", "aac", "-b:a", "128k", "-ar", "48000", "-ac", "2"])
    }

    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    #[must_use]
    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }
}

pub(crate) fn os_args(values: &[&str]) -> Vec<OsString> {
    values.iter().map(OsString::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::slideshow::media_items::MediaItem;
    use std::sync::Arc;
    use std::time::Duration;

    fn config() -> Arc<OutputConfig> {
        Arc::new(OutputConfig {
            width: 1920,
            height: 1080,
            fps: 30,
            codec: "libx264".to_string(),
            crf: 20,
            preset: "medium".to_string(),
            entry_duration: Duration::from_secs(5),
            concurrency: 2,
        })
    }

    fn job(path: &str, kind: MediaKind, position: usize) -> TranscodeJob {
        TranscodeJob {
            item: MediaItem {
                path: PathBuf::from(path),
                kind,
                position,
            },
            config: config(),
        }
    }

    fn value_after<'a>(args: &'a [OsString], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .and_then(|a| a.to_str())
    }

    #[test]
    fn test_frame_count_truncates() {
        let mut config = (*config()).clone();
        assert_eq!(frame_count(&config), 150);

        config.entry_duration = Duration::from_millis(2_500);
        config.fps = 24;
        assert_eq!(frame_count(&config), 60);

        config.entry_duration = Duration::from_millis(1_010);
        config.fps = 30;
        // 30.3 -> 30
        assert_eq!(frame_count(&config), 30);

        config.entry_duration = Duration::from_millis(100);
        config.fps = 25;
        // 2.5 -> 2
        assert_eq!(frame_count(&config), 2);
    }

    #[test]
    fn test_destination_keyed_by_position() {
        let scratch = Path::new("/scratch");
        let jpg = IntermediateCommand::new(&job("/photos/a.jpg", MediaKind::Image, 0), scratch);
        let png = IntermediateCommand::new(&job("/other/a.png", MediaKind::Image, 12), scratch);

        assert_eq!(jpg.destination_path(), Path::new("/scratch/00000-a.mkv"));
        assert_eq!(png.destination_path(), Path::new("/scratch/00012-a.mkv"));
        assert_ne!(jpg.destination_path(), png.destination_path());
    }

    #[test]
    fn test_destination_with_dots() {
        let cmd = IntermediateCommand::new(
            &job("/photos/trip.day.one.jpeg", MediaKind::Image, 3),
            Path::new("/scratch"),
        );
        assert_eq!(
            cmd.destination_path(),
            Path::new("/scratch/00003-trip.day.one.mkv")
        );
    }

    #[test]
    fn test_image_args_exact() {
        let cmd = IntermediateCommand::new(
            &job("/photos/a.jpg", MediaKind::Image, 0),
            Path::new("/scratch"),
        );

        let expected = [
            "-hide_banner", "-nostdin", "-y",
            "-f", "lavfi",
            "-i", "anullsrc=channel_layout=stereo:sample_rate=48000",
            "-loop", "1",
            "-i", "file:/photos/a.jpg",
            "-avoid_negative_ts", "make_zero",
            "-r", "30",
            "-frames:v", "150",
            "-c:v", "libx264",
            "-crf", "20",
            "-preset", "medium",
            "-tune", "stillimage",
            "-movflags", "+faststart",
            "-c:a", "aac",
            "-b:a", "128k",
            "-ar", "48000",
            "-ac", "2",
            "-shortest",
            "-g", "30",
            "-keyint_min", "1",
            "-t", "00:00:05.000",
            "-pix_fmt", "yuv420p",
            "-vf", "scale=1920:1080:force_original_aspect_ratio=decrease:eval=frame,pad=1920:1080:-1:-1:color=black,setsar=1",
            "/scratch/00000-a.mkv",
        ];
        assert_eq!(cmd.args(), expected);
        assert_eq!(cmd.source_path(), Path::new("/photos/a.jpg"));
    }

    #[test]
    fn test_video_args_skip_audio_synthesis_and_frame_cap() {
        let cmd = IntermediateCommand::new(
            &job("/clips/b.mp4", MediaKind::Video, 1),
            Path::new("/scratch"),
        );
        let args = cmd.args();

        assert!(!args.iter().any(|a| a == "lavfi" || a == "-loop"));
        assert!(!args.iter().any(|a| a == "-frames:v" || a == "-t" || a == "-shortest"));
        assert_eq!(value_after(args, "-i"), Some("file:/clips/b.mp4"));
        assert_eq!(value_after(args, "-tune"), Some("film"));
        assert_eq!(value_after(args, "-pix_fmt"), Some("yuv420p"));
        assert_eq!(value_after(args, "-c:v"), Some("libx264"));
        assert_eq!(value_after(args, "-crf"), Some("20"));
        assert_eq!(value_after(args, "-preset"), Some("medium"));
        assert_eq!(args.last().and_then(|a| a.to_str()), Some("/scratch/00001-b.mkv"));
    }

    #[test]
    fn test_image_and_video_share_geometry() {
        let scratch = Path::new("/scratch");
        let image = IntermediateCommand::new(&job("/a.png", MediaKind::Image, 0), scratch);
        let video = IntermediateCommand::new(&job("/b.mov", MediaKind::Video, 1), scratch);

        assert_eq!(value_after(image.args(), "-vf"), value_after(video.args(), "-vf"));
        assert_eq!(
            value_after(image.args(), "-ar"),
            value_after(video.args(), "-ar")
        );
    }

    #[test]
    fn test_letterbox_filter_uses_configured_size() {
        assert_eq!(
            letterbox_filter(1280, 720),
            "scale=1280:720:force_original_aspect_ratio=decrease:eval=frame,pad=1280:720:-1:-1:color=black,setsar=1"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_kept_byte_for_byte() {
        use std::os::unix::ffi::OsStrExt;

        let mut job = job("/unused.jpg", MediaKind::Image, 4);
        job.item.path = PathBuf::from(OsStr::from_bytes(b"/photos/caf\xe9.jpg"));
        let scratch = Path::new(OsStr::from_bytes(b"/scratch\xff"));

        let cmd = IntermediateCommand::new(&job, scratch);

        assert_eq!(
            cmd.destination_path().as_os_str().as_bytes(),
            b"/scratch\xff/00004-caf\xe9.mkv"
        );
        let input = cmd
            .args()
            .iter()
            .find(|a| a.as_bytes().starts_with(b"file:"))
            .unwrap();
        assert_eq!(input.as_bytes(), b"file:/photos/caf\xe9.jpg");
        assert_eq!(cmd.args().last().unwrap(), cmd.destination_path().as_os_str());
    }
}
