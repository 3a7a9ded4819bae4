//! 錯誤類型
//!
//! 設定、掃描、合併等致命錯誤使用 `SlideshowError`；
//! 單一項目的 ffmpeg 失敗使用 `EngineError`，不會中止整個 worker pool。

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlideshowError {
    #[error("參數 {name} 無效: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("{0} 不在 $PATH 中")]
    EngineNotFound(String),

    #[error("{} 中找不到可用的圖片或影片", .0.display())]
    NoEligibleFiles(PathBuf),

    #[error("掃描目錄失敗: {0}")]
    Discovery(#[from] walkdir::Error),

    #[error("不支援的路徑（含換行字元）: {}", .0.display())]
    UnsupportedPath(PathBuf),

    #[error("{failed} 個項目轉檔失敗，共 {total} 個")]
    ItemsFailed { failed: usize, total: usize },

    #[error("worker 提前結束，只收到 {received}/{expected} 個結果")]
    PoolTerminated { received: usize, expected: usize },

    #[error("項目位置 {position} 無效或重複")]
    InvalidPosition { position: usize },

    #[error("ffmpeg 合併失敗")]
    Merge(#[source] EngineError),

    #[error("操作已取消")]
    Cancelled,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("無法啟動 {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} 執行失敗 ({status})\nOutput: {output}")]
    Failed {
        program: String,
        status: ExitStatus,
        output: String,
    },

    #[error("{program} 逾時 ({after:?})")]
    TimedOut { program: String, after: Duration },

    #[error("操作已取消")]
    Cancelled,

    #[error("輸出檔案未建立: {}", .0.display())]
    MissingOutput(PathBuf),

    #[error("等待程序時發生錯誤: {0}")]
    Wait(#[source] std::io::Error),

    #[error("I/O 錯誤: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_is_not_reported_as_wait_failure() {
        let err = EngineError::from(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(matches!(err, EngineError::Io(_)));
        assert_eq!(err.to_string(), "I/O 錯誤: missing");
    }
}
