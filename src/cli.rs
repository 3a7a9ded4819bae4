use crate::config::{DEFAULT_SETTINGS_FILE, ItemOrder, SlideshowConfig, UserSettings};
use crate::error::SlideshowError;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "auto_slideshow", version)]
#[command(about = "將資料夾中的圖片合成為幻燈片影片")]
pub struct Cli {
    /// 要掃描的資料夾
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,

    /// 輸出資料夾
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long)]
    pub fps: Option<u32>,

    #[arg(long)]
    pub codec: Option<String>,

    #[arg(long)]
    pub crf: Option<u32>,

    #[arg(long)]
    pub preset: Option<String>,

    /// 每個項目的秒數
    #[arg(long, value_name = "SECONDS")]
    pub entry_duration: Option<f64>,

    /// 隨機排列檔案順序
    #[arg(long)]
    pub randomize: bool,

    /// 洗牌種子，重現相同順序
    #[arg(long, requires = "randomize")]
    pub seed: Option<u64>,

    /// 遞迴掃描子資料夾
    #[arg(short, long)]
    pub recursive: bool,

    /// 影片檔也納入幻燈片
    #[arg(long)]
    pub include_videos: bool,

    /// worker 數量（預設為邏輯核心數的一半）
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// 單一項目轉檔逾時秒數，0 表示不限
    #[arg(long, value_name = "SECONDS")]
    pub item_timeout: Option<u64>,

    /// 合併逾時秒數，0 表示不限
    #[arg(long, value_name = "SECONDS")]
    pub merge_timeout: Option<u64>,

    /// 任一項目失敗就中止
    #[arg(long)]
    pub strict: bool,

    /// ffmpeg 執行檔名稱或路徑
    #[arg(long)]
    pub ffmpeg: Option<String>,

    /// JSON 設定檔
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    pub config: PathBuf,

    /// 將合併後的設定寫回設定檔
    #[arg(long)]
    pub save_config: bool,

    /// 不顯示進度條
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// 以命令列參數覆蓋設定檔的值
    #[must_use]
    pub fn merge_settings(&self, mut settings: UserSettings) -> UserSettings {
        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(fps) = self.fps {
            settings.fps = fps;
        }
        if let Some(codec) = &self.codec {
            settings.codec.clone_from(codec);
        }
        if let Some(crf) = self.crf {
            settings.crf = crf;
        }
        if let Some(preset) = &self.preset {
            settings.preset.clone_from(preset);
        }
        if let Some(entry_duration) = self.entry_duration {
            settings.entry_duration_secs = entry_duration;
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = Some(concurrency);
        }
        if let Some(timeout) = self.item_timeout {
            settings.item_timeout_secs = Some(timeout);
        }
        if let Some(timeout) = self.merge_timeout {
            settings.merge_timeout_secs = Some(timeout);
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            settings.engine.clone_from(ffmpeg);
        }
        settings.recursive |= self.recursive;
        settings.include_videos |= self.include_videos;
        settings
    }

    pub fn slideshow_config(&self, settings: &UserSettings) -> Result<SlideshowConfig, SlideshowError> {
        let order = if self.randomize {
            ItemOrder::Shuffled {
                seed: self.seed.unwrap_or_else(rand::random),
            }
        } else {
            ItemOrder::Discovery
        };

        Ok(SlideshowConfig {
            directory: self.directory.clone(),
            output_directory: self.output_dir.clone(),
            recursive: settings.recursive,
            selection: settings.selection(),
            order,
            strict: self.strict,
            engine_program: settings.engine.clone(),
            item_timeout: timeout(settings.item_timeout_secs),
            merge_timeout: timeout(settings.merge_timeout_secs),
            show_progress: !self.no_progress,
            output: settings.output_config()?,
        })
    }
}

fn timeout(secs: Option<u64>) -> Option<Duration> {
    secs.filter(|&s| s > 0).map(Duration::from_secs)
}
