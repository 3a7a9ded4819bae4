use super::ffmpeg_command::IntermediateCommand;
use super::media_items::MediaItem;
use crate::config::OutputConfig;
use crate::error::{EngineError, SlideshowError};
use crate::tools::{CpuMonitor, Engine};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::sync::{Arc, Mutex};
use std::thread::{self, ScopedJoinHandle};

/// 送進 worker pool 的工作單位
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    pub item: MediaItem,
    pub config: Arc<OutputConfig>,
}

impl TranscodeJob {
    #[must_use]
    pub fn from_items(items: Vec<MediaItem>, config: &Arc<OutputConfig>) -> Vec<Self> {
        items
            .into_iter()
            .map(|item| Self {
                item,
                config: Arc::clone(config),
            })
            .collect()
    }
}

/// 每個工作恰好產生一個結果，失敗也一樣
#[derive(Debug)]
pub struct TranscodeResult {
    pub position: usize,
    pub source_path: PathBuf,
    pub output: Result<PathBuf, EngineError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Pending,
    Ready(PathBuf),
    Failed { source_path: PathBuf, reason: String },
}

/// 依位置排列的中間影片
///
/// 只由收集端寫入，不需要鎖。
#[derive(Debug)]
pub struct IntermediateSet {
    slots: Vec<SlotState>,
}

impl IntermediateSet {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![SlotState::Pending; len],
        }
    }

    /// 將結果放到它原本的位置；位置越界或重複填入都視為錯誤
    pub fn fill(&mut self, result: TranscodeResult) -> Result<(), SlideshowError> {
        let position = result.position;
        let slot = self
            .slots
            .get_mut(position)
            .filter(|slot| **slot == SlotState::Pending)
            .ok_or(SlideshowError::InvalidPosition { position })?;

        *slot = match result.output {
            Ok(path) => SlotState::Ready(path),
            Err(e) => SlotState::Failed {
                source_path: result.source_path,
                reason: e.to_string(),
            },
        };
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn is_dense(&self) -> bool {
        self.slots.iter().all(|slot| *slot != SlotState::Pending)
    }

    #[must_use]
    pub fn slots(&self) -> &[SlotState] {
        &self.slots
    }

    /// 成功的中間影片，依位置排序
    #[must_use]
    pub fn ready_paths(&self) -> Vec<PathBuf> {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                SlotState::Ready(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, SlotState::Failed { .. }))
            .count()
    }
}

/// 固定數量 worker 的轉檔池
///
/// 所有工作一次放進有界佇列後關閉佇列；worker 逐一取出處理，
/// 結果帶著原始位置送回，由呼叫端執行緒收集。
pub struct WorkerPool<'a, E: Engine> {
    engine: &'a E,
    scratch_dir: &'a Path,
    concurrency: usize,
    shutdown_signal: Arc<AtomicBool>,
    show_progress: bool,
}

impl<'a, E: Engine> WorkerPool<'a, E> {
    pub fn new(
        engine: &'a E,
        scratch_dir: &'a Path,
        concurrency: usize,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            engine,
            scratch_dir,
            concurrency: concurrency.max(1),
            shutdown_signal,
            show_progress: false,
        }
    }

    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn run(&self, jobs: Vec<TranscodeJob>) -> Result<IntermediateSet, SlideshowError> {
        let expected = jobs.len();
        if expected == 0 {
            return Ok(IntermediateSet::new(0));
        }

        // 佇列容量等於工作數，放入時不會阻塞
        let (job_sender, job_receiver) = sync_channel::<TranscodeJob>(expected);
        for job in jobs {
            if job_sender.send(job).is_err() {
                break;
            }
        }
        drop(job_sender);

        let queue = Mutex::new(job_receiver);
        let (result_sender, result_receiver) = sync_channel::<TranscodeResult>(expected);
        let worker_count = self.concurrency.min(expected);

        info!("開始轉檔，共 {expected} 個項目，使用 {worker_count} 個 worker");

        let progress = self.progress_bar(expected);

        let collected = thread::scope(|scope| {
            let workers: Vec<_> = (0..worker_count)
                .map(|worker_id| {
                    let sender = result_sender.clone();
                    let queue = &queue;
                    scope.spawn(move || self.worker_loop(worker_id, queue, &sender))
                })
                .collect();
            // 所有 worker 結束後結果通道才會關閉
            drop(result_sender);

            let collected = collect_results(&result_receiver, expected, &progress);

            // 手動 join，worker 的 panic 不會在離開 scope 時重新拋出
            let panicked = workers
                .into_iter()
                .map(ScopedJoinHandle::join)
                .filter(Result::is_err)
                .count();
            if panicked > 0 {
                error!("{panicked} 個 worker 異常結束");
            }
            collected
        });

        match &collected {
            Ok(set) => progress.finish_with_message(format!("完成，失敗 {} 個", set.failed_count())),
            Err(_) => progress.abandon_with_message("轉檔中斷"),
        }
        collected
    }

    fn worker_loop(
        &self,
        worker_id: usize,
        queue: &Mutex<Receiver<TranscodeJob>>,
        results: &SyncSender<TranscodeResult>,
    ) {
        loop {
            let job = {
                let Ok(receiver) = queue.lock() else {
                    warn!("worker {worker_id}: 佇列鎖已失效，停止");
                    return;
                };
                match receiver.recv() {
                    Ok(job) => job,
                    Err(_) => break,
                }
            };

            let result = self.process_job(worker_id, &job);
            if results.send(result).is_err() {
                warn!("worker {worker_id}: 收集端已關閉，停止");
                return;
            }
        }
        debug!("worker {worker_id} 結束");
    }

    fn process_job(&self, worker_id: usize, job: &TranscodeJob) -> TranscodeResult {
        let position = job.item.position;
        let source_path = job.item.path.clone();

        if self.shutdown_signal.load(Ordering::SeqCst) {
            return TranscodeResult {
                position,
                source_path,
                output: Err(EngineError::Cancelled),
            };
        }

        let command = IntermediateCommand::new(job, self.scratch_dir);
        debug!(
            "worker {worker_id} [{position}]: {} -> {}",
            command.source_path().display(),
            command.destination_path().display()
        );

        let output = self
            .engine
            .execute(command.args())
            .and_then(|()| {
                if command.destination_path().exists() {
                    Ok(command.destination_path().to_path_buf())
                } else {
                    Err(EngineError::MissingOutput(
                        command.destination_path().to_path_buf(),
                    ))
                }
            })
            .inspect_err(|e| {
                warn!("無法產生中間影片 [{position}] {}: {e}", source_path.display());
                Self::remove_partial_output(command.destination_path());
            });

        TranscodeResult {
            position,
            source_path,
            output,
        }
    }

    fn remove_partial_output(path: &Path) {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                warn!("無法刪除失敗的輸出檔案 {}: {e}", path.display());
            } else {
                debug!("已刪除失敗的輸出檔案: {}", path.display());
            }
        }
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        ) {
            progress_bar.set_style(style.progress_chars("#>-"));
        }
        progress_bar.set_message("產生中間影片...");
        progress_bar
    }
}

/// 依位置收集結果，直到收到與工作數相同的結果
///
/// 通道提前關閉代表有 worker 異常結束。
pub fn collect_results(
    receiver: &Receiver<TranscodeResult>,
    expected: usize,
    progress: &ProgressBar,
) -> Result<IntermediateSet, SlideshowError> {
    let mut set = IntermediateSet::new(expected);
    let mut cpu_monitor = (!progress.is_hidden()).then(CpuMonitor::new);

    for received in 0..expected {
        let Ok(result) = receiver.recv() else {
            return Err(SlideshowError::PoolTerminated { received, expected });
        };
        set.fill(result)?;

        progress.inc(1);
        if let Some(monitor) = cpu_monitor.as_mut() {
            progress.set_message(format!("CPU: {:.1}%", monitor.current_usage()));
        }
    }

    Ok(set)
}
