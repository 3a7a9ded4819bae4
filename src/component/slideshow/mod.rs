//! 幻燈片影片產生元件
//!
//! 將資料夾中的圖片（與選擇性的短片）轉為統一規格的中間影片，再依序合併為單一影片

mod concat;
mod ffmpeg_command;
mod main;
mod media_items;
mod task_scheduler;

pub use concat::{ConcatPlan, concat_videos, merge_args};
pub use ffmpeg_command::{INTERMEDIATE_EXTENSION, IntermediateCommand, frame_count, letterbox_filter};
pub use main::{Slideshow, SlideshowReport};
pub use media_items::{MediaItem, collect_media_items};
pub use task_scheduler::{
    IntermediateSet, SlotState, TranscodeJob, TranscodeResult, WorkerPool, collect_results,
};
