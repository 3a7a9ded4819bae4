use crate::error::{EngineError, SlideshowError};
use log::{debug, warn};
use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 外部媒體引擎：接收參數陣列，同步執行一次
pub trait Engine: Sync {
    fn execute(&self, args: &[OsString]) -> Result<(), EngineError>;
}

/// 確認引擎可在 $PATH 中找到，回傳實際路徑
pub fn ensure_engine_available(program: &str) -> Result<PathBuf, SlideshowError> {
    which::which(program).map_err(|_| SlideshowError::EngineNotFound(program.to_string()))
}

/// 以子程序執行 ffmpeg
///
/// 每次呼叫可設定逾時；逾時或收到中斷信號時會終止子程序。
pub struct FfmpegEngine {
    program: PathBuf,
    timeout: Option<Duration>,
    shutdown_signal: Arc<AtomicBool>,
}

impl FfmpegEngine {
    #[must_use]
    pub fn new(program: &Path, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            program: program.to_path_buf(),
            timeout: None,
            shutdown_signal,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map_or_else(
                || self.program.to_string_lossy(),
                |name| name.to_string_lossy(),
            )
            .into_owned()
    }

    /// 在背景讀取輸出，避免管線塞滿造成子程序卡住
    fn spawn_output_reader<R: Read + Send + 'static>(source: Option<R>) -> JoinHandle<String> {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            if let Some(mut reader) = source {
                let _ = reader.read_to_end(&mut buffer);
            }
            String::from_utf8_lossy(&buffer).into_owned()
        })
    }

    fn wait_with_deadline(&self, child: &mut Child) -> Result<ExitStatus, EngineError> {
        let started = Instant::now();

        loop {
            if let Some(status) = child.try_wait().map_err(EngineError::Wait)? {
                return Ok(status);
            }

            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷信號，終止程序 [{}]", child.id());
                let _ = child.kill();
                let _ = child.wait();
                return Err(EngineError::Cancelled);
            }

            if let Some(timeout) = self.timeout
                && started.elapsed() >= timeout
            {
                warn!("程序逾時，終止程序 [{}]", child.id());
                let _ = child.kill();
                let _ = child.wait();
                return Err(EngineError::TimedOut {
                    program: self.program_name(),
                    after: timeout,
                });
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Engine for FfmpegEngine {
    fn execute(&self, args: &[OsString]) -> Result<(), EngineError> {
        debug!(
            "執行: {} {}",
            self.program.display(),
            args.iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: self.program_name(),
                source,
            })?;

        let stdout_reader = Self::spawn_output_reader(child.stdout.take());
        let stderr_reader = Self::spawn_output_reader(child.stderr.take());

        let status = self.wait_with_deadline(&mut child);

        let mut output = stdout_reader.join().unwrap_or_default();
        output.push_str(&stderr_reader.join().unwrap_or_default());

        let status = status?;
        if status.success() {
            Ok(())
        } else {
            Err(EngineError::Failed {
                program: self.program_name(),
                status,
                output: output.trim().to_string(),
            })
        }
    }
}
