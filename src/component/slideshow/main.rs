use super::concat::{ConcatPlan, concat_videos};
use super::ffmpeg_command::INTERMEDIATE_EXTENSION;
use super::media_items::collect_media_items;
use super::task_scheduler::{IntermediateSet, SlotState, TranscodeJob, WorkerPool};
use crate::config::{ItemOrder, SlideshowConfig};
use crate::error::SlideshowError;
use crate::tools::{
    Engine, FfmpegEngine, MediaSelection, current_run_timestamp,
    ensure_directory_exists, ensure_engine_available, list_files, validate_directory_exists,
};
use anyhow::{Context, Result};
use console::style;
use log::{info, warn};
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// 一次執行的結果摘要
#[derive(Debug)]
pub struct SlideshowReport {
    pub output_path: PathBuf,
    pub total_items: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub transcode_elapsed: Duration,
    pub merge_elapsed: Duration,
}

/// 幻燈片產生器
///
/// 流程：
/// A. 掃描並過濾媒體檔
/// B. 依需要洗牌並指定位置
/// C. 平行產生中間影片
/// D. 依位置合併為單一輸出
pub struct Slideshow {
    config: SlideshowConfig,
    shutdown_signal: Arc<AtomicBool>,
}

impl Slideshow {
    pub const fn new(config: SlideshowConfig, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    /// 使用系統上的 ffmpeg 執行
    pub fn run(&self) -> Result<SlideshowReport> {
        let program = ensure_engine_available(&self.config.engine_program)?;
        info!("使用引擎: {}", program.display());

        let item_engine = FfmpegEngine::new(&program, Arc::clone(&self.shutdown_signal))
            .with_timeout(self.config.item_timeout);
        let merge_engine = FfmpegEngine::new(&program, Arc::clone(&self.shutdown_signal))
            .with_timeout(self.config.merge_timeout);

        self.run_with(&item_engine, &merge_engine)
    }

    pub fn run_with<E: Engine, M: Engine>(
        &self,
        item_engine: &E,
        merge_engine: &M,
    ) -> Result<SlideshowReport> {
        let output = Arc::new(self.config.output.clone());
        output.validate()?;

        self.log_settings();

        let directory = &self.config.directory;
        validate_directory_exists(directory)?;
        ensure_directory_exists(&self.config.output_directory)?;

        let files = list_files(directory, self.config.recursive)?;
        info!("在 {} 找到 {} 個檔案", directory.display(), files.len());

        let items = collect_media_items(
            directory,
            files,
            self.config.selection,
            self.config.order,
        )?;
        info!(
            "其中 {} 個{}檔案可用",
            items.len(),
            match self.config.selection {
                MediaSelection::ImagesOnly => "圖片",
                MediaSelection::ImagesAndVideos => "圖片/影片",
            }
        );
        let total_items = items.len();

        let scratch = tempfile::Builder::new()
            .prefix(".slideshow-")
            .tempdir_in(&self.config.output_directory)
            .with_context(|| {
                format!(
                    "無法建立暫存資料夾: {}",
                    self.config.output_directory.display()
                )
            })?;
        info!("暫存資料夾: {}", scratch.path().display());

        println!("{}", style("產生中間影片中...").cyan());
        let started = Instant::now();
        let pool = WorkerPool::new(
            item_engine,
            scratch.path(),
            output.concurrency,
            Arc::clone(&self.shutdown_signal),
        )
        .with_progress(self.config.show_progress);
        let intermediates = pool.run(TranscodeJob::from_items(items, &output))?;
        let transcode_elapsed = started.elapsed();
        info!(
            "產生 {} 個中間影片，耗時 {}ms",
            intermediates.len() - intermediates.failed_count(),
            transcode_elapsed.as_millis()
        );

        if self.shutdown_signal.load(Ordering::SeqCst) {
            return Err(SlideshowError::Cancelled.into());
        }

        let ready = self.apply_failure_policy(&intermediates)?;

        let output_path = self.output_path();
        println!("{}", style("合併中間影片中...").cyan());
        let started = Instant::now();
        let plan = ConcatPlan::from_paths(&ready)?;
        concat_videos(merge_engine, &plan, &output_path, &output, scratch.path())?;
        let merge_elapsed = started.elapsed();
        info!(
            "輸出影片已寫入 {}，耗時 {}ms",
            output_path.display(),
            merge_elapsed.as_millis()
        );

        let scratch_path = scratch.path().to_path_buf();
        match scratch.close() {
            Ok(()) => info!("已清除暫存資料夾 {}", scratch_path.display()),
            Err(e) => warn!("無法清除暫存資料夾 {}: {e}", scratch_path.display()),
        }

        Ok(SlideshowReport {
            output_path,
            total_items,
            succeeded: ready.len(),
            failed: intermediates.failed_count(),
            transcode_elapsed,
            merge_elapsed,
        })
    }

    /// 失敗的項目不會以空路徑進入合併清單
    ///
    /// 預設略過並警告；strict 模式或全部失敗時中止。
    fn apply_failure_policy(&self, intermediates: &IntermediateSet) -> Result<Vec<PathBuf>> {
        let failed = intermediates.failed_count();
        let total = intermediates.len();

        for (position, slot) in intermediates.slots().iter().enumerate() {
            if let SlotState::Failed {
                source_path,
                reason,
            } = slot
            {
                warn!("略過 [{position}] {}: {reason}", source_path.display());
            }
        }

        if failed > 0 && (self.config.strict || failed == total) {
            return Err(SlideshowError::ItemsFailed { failed, total }.into());
        }

        Ok(intermediates.ready_paths())
    }

    /// `<output_dir>/<來源資料夾名稱>-<時間戳記>.mkv`
    fn output_path(&self) -> PathBuf {
        let mut file_name = directory_base_name(&self.config.directory);
        file_name.push(format!(
            "-{}.{INTERMEDIATE_EXTENSION}",
            current_run_timestamp()
        ));
        self.config.output_directory.join(file_name)
    }

    fn log_settings(&self) {
        let config = &self.config;
        let output = &config.output;
        info!("slideshow@{}", env!("CARGO_PKG_VERSION"));
        info!("來源資料夾: {}", config.directory.display());
        info!(
            "每個項目 {:.3}s，隨機排序: {}",
            output.entry_duration.as_secs_f64(),
            matches!(config.order, ItemOrder::Shuffled { .. })
        );
        info!("遞迴掃描: {}", config.recursive);
        info!(
            "輸出: {}x{}@{} ({}, crf {}, preset {})",
            output.width, output.height, output.fps, output.codec, output.crf, output.preset
        );
        info!("使用 {} 個 worker", output.concurrency);
    }

    pub fn print_summary(&self, report: &SlideshowReport) {
        println!();
        println!("{}", style("=== 幻燈片摘要 ===").cyan().bold());
        println!("  總計: {} 個項目", report.total_items);
        println!("  成功: {} 個", style(report.succeeded).green());
        if report.failed > 0 {
            println!("  失敗: {} 個（已略過）", style(report.failed).red());
        }
        println!(
            "  耗時: 轉檔 {:.1}s / 合併 {:.1}s",
            report.transcode_elapsed.as_secs_f64(),
            report.merge_elapsed.as_secs_f64()
        );
        println!(
            "  輸出: {}",
            style(report.output_path.display()).green().bold()
        );

        info!(
            "幻燈片完成 - 成功: {}, 失敗: {}",
            report.succeeded, report.failed
        );
    }
}

/// 來源資料夾的名稱；`.`、`..` 會先解析成實際路徑
fn directory_base_name(directory: &Path) -> OsString {
    let resolved = fs::canonicalize(directory)
        .or_else(|_| std::path::absolute(directory))
        .unwrap_or_else(|_| directory.to_path_buf());
    resolved
        .file_name()
        .map_or_else(|| OsString::from("slideshow"), OsStr::to_os_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_base_name() {
        assert_eq!(directory_base_name(Path::new("/photos/holiday")), "holiday");
        assert_eq!(directory_base_name(Path::new("/photos/holiday/")), "holiday");
        assert!(!directory_base_name(Path::new(".")).is_empty());
        assert_eq!(directory_base_name(Path::new("/")), "slideshow");
    }

    #[test]
    fn test_directory_base_name_resolves_parent_components() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let nested = temp_dir.path().join("holiday").join("day1");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(directory_base_name(&nested.join("..")), "holiday");
        assert_eq!(directory_base_name(&nested.join(".")), "day1");
    }
}
