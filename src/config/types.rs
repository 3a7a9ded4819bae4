use crate::error::SlideshowError;
use crate::tools::{MediaSelection, default_concurrency};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SETTINGS_FILE: &str = "slideshow.json";
pub const DEFAULT_ENGINE: &str = "ffmpeg";
pub const DEFAULT_ITEM_TIMEOUT_SECS: u64 = 600;

/// 中間影片與最終輸出共用的編碼設定，驗證後不再變動
#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: String,
    pub crf: u32,
    pub preset: String,
    pub entry_duration: Duration,
    pub concurrency: usize,
}

impl OutputConfig {
    pub fn validate(&self) -> Result<(), SlideshowError> {
        fn positive(name: &'static str, value: u64) -> Result<(), SlideshowError> {
            if value == 0 {
                return Err(SlideshowError::InvalidOption {
                    name,
                    reason: "必須大於 0".to_string(),
                });
            }
            Ok(())
        }

        positive("width", u64::from(self.width))?;
        positive("height", u64::from(self.height))?;
        positive("fps", u64::from(self.fps))?;
        positive("crf", u64::from(self.crf))?;
        positive("concurrency", self.concurrency as u64)?;

        if self.entry_duration.is_zero() {
            return Err(SlideshowError::InvalidOption {
                name: "entry-duration",
                reason: "必須大於 0".to_string(),
            });
        }
        if self.codec.trim().is_empty() {
            return Err(SlideshowError::InvalidOption {
                name: "codec",
                reason: "不可為空".to_string(),
            });
        }
        if self.preset.trim().is_empty() {
            return Err(SlideshowError::InvalidOption {
                name: "preset",
                reason: "不可為空".to_string(),
            });
        }
        Ok(())
    }
}

/// 項目排列方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemOrder {
    #[default]
    Discovery,
    /// 以固定種子洗牌，相同種子得到相同順序
    Shuffled { seed: u64 },
}

/// 一次執行所需的完整設定
#[derive(Debug, Clone)]
pub struct SlideshowConfig {
    pub directory: PathBuf,
    pub output_directory: PathBuf,
    pub recursive: bool,
    pub selection: MediaSelection,
    pub order: ItemOrder,
    /// 任一項目失敗即中止，而非略過
    pub strict: bool,
    pub engine_program: String,
    pub item_timeout: Option<Duration>,
    pub merge_timeout: Option<Duration>,
    pub show_progress: bool,
    pub output: OutputConfig,
}

/// 儲存在 JSON 設定檔中的預設值，命令列參數會覆蓋
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: String,
    pub crf: u32,
    pub preset: String,
    pub entry_duration_secs: f64,
    pub concurrency: Option<usize>,
    pub recursive: bool,
    pub include_videos: bool,
    pub item_timeout_secs: Option<u64>,
    pub merge_timeout_secs: Option<u64>,
    pub engine: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30,
            codec: "libx264".to_string(),
            crf: 20,
            preset: "medium".to_string(),
            entry_duration_secs: 5.0,
            concurrency: None,
            recursive: false,
            include_videos: false,
            item_timeout_secs: Some(DEFAULT_ITEM_TIMEOUT_SECS),
            merge_timeout_secs: None,
            engine: DEFAULT_ENGINE.to_string(),
        }
    }
}

impl UserSettings {
    /// 轉換為已驗證的 `OutputConfig`
    pub fn output_config(&self) -> Result<OutputConfig, SlideshowError> {
        let entry_duration = Duration::try_from_secs_f64(self.entry_duration_secs).map_err(|e| {
            SlideshowError::InvalidOption {
                name: "entry-duration",
                reason: e.to_string(),
            }
        })?;

        let config = OutputConfig {
            width: self.width,
            height: self.height,
            fps: self.fps,
            codec: self.codec.clone(),
            crf: self.crf,
            preset: self.preset.clone(),
            entry_duration,
            concurrency: self.concurrency.unwrap_or_else(default_concurrency),
        };
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub const fn selection(&self) -> MediaSelection {
        if self.include_videos {
            MediaSelection::ImagesAndVideos
        } else {
            MediaSelection::ImagesOnly
        }
    }
}
