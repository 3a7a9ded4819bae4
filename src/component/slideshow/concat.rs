use super::ffmpeg_command::os_args;
use crate::config::OutputConfig;
use crate::error::{EngineError, SlideshowError};
use crate::tools::Engine;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::borrow::Cow;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 依最終順序排列的中間影片絕對路徑
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatPlan {
    entries: Vec<PathBuf>,
}

impl ConcatPlan {
    /// 換行字元會破壞一行一個路徑的格式，直接拒絕
    pub fn from_paths(paths: &[PathBuf]) -> Result<Self> {
        let entries = paths
            .iter()
            .map(|path| {
                if path_bytes(path).iter().any(|b| matches!(b, b'\n' | b'\r')) {
                    return Err(anyhow::Error::from(SlideshowError::UnsupportedPath(
                        path.clone(),
                    )));
                }
                std::path::absolute(path)
                    .with_context(|| format!("無法取得絕對路徑: {}", path.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// concat demuxer 清單內容，每行 `file '<path>'`
    ///
    /// 以原始位元組寫入，非 UTF-8 檔名保持不變。
    #[must_use]
    pub fn descriptor(&self) -> Vec<u8> {
        let mut descriptor = Vec::new();
        for path in &self.entries {
            descriptor.extend_from_slice(b"file '");
            descriptor.extend(escape_single_quotes(&path_bytes(path)));
            descriptor.extend_from_slice(b"'\n");
        }
        descriptor
    }

    /// 在暫存資料夾寫入清單檔；回傳的檔案在 drop 時刪除
    pub fn write_descriptor(&self, scratch_dir: &Path) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("ffmpeg_filelist_")
            .suffix(".txt")
            .tempfile_in(scratch_dir)
            .with_context(|| format!("無法建立合併清單: {}", scratch_dir.display()))?;

        file.write_all(&self.descriptor())
            .context("無法寫入合併清單")?;
        file.flush().context("無法寫入合併清單")?;

        debug!("合併清單: {}", file.path().display());
        Ok(file)
    }
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

// ffmpeg 以 UTF-8 讀取清單
#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Cow<'_, [u8]> {
    Cow::Owned(path.to_string_lossy().into_owned().into_bytes())
}

/// 單引號字串中的 `'` 寫成 `'\''`
fn escape_single_quotes(value: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(value.len());
    for &byte in value {
        if byte == b'\'' {
            escaped.extend_from_slice(br"'\''");
        } else {
            escaped.push(byte);
        }
    }
    escaped
}

#[must_use]
pub fn merge_args(descriptor: &Path, output_path: &Path, config: &OutputConfig) -> Vec<OsString> {
    let mut args = os_args(&["-hide_banner", "-nostdin", "-y", "-f", "concat", "-safe", "0", "-i"]);
    args.push(descriptor.as_os_str().to_owned());
    args.extend(os_args(&[
        "-c:v", &config.codec,
        "-crf", &config.crf.to_string(),
        "-preset", &config.preset,
        "-pix_fmt", "yuv420p",
        "-c:a", "aac",
        "-b:a", "128k",
        "-ar", "48000",
        "-ac", "2",
    ]));
    args.push(output_path.as_os_str().to_owned());
    args
}

/// 將中間影片合併為最終輸出
///
/// 清單檔在合併結束後刪除，不論成功與否；合併失敗時不留下不完整的輸出檔。
pub fn concat_videos<E: Engine>(
    engine: &E,
    plan: &ConcatPlan,
    output_path: &Path,
    config: &OutputConfig,
    scratch_dir: &Path,
) -> Result<()> {
    let descriptor = plan.write_descriptor(scratch_dir)?;
    info!("合併 {} 個中間影片 -> {}", plan.len(), output_path.display());

    let args = merge_args(descriptor.path(), output_path, config);
    let merged = engine.execute(&args).map_err(|e| match e {
        EngineError::Cancelled => SlideshowError::Cancelled,
        other => SlideshowError::Merge(other),
    });

    if let Err(e) = descriptor.close() {
        warn!("無法刪除合併清單: {e}");
    }

    if merged.is_err() {
        remove_partial_output(output_path);
    }

    merged?;
    Ok(())
}

fn remove_partial_output(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!("無法刪除不完整的輸出檔案 {}: {e}", path.display());
        } else {
            debug!("已刪除不完整的輸出檔案: {}", path.display());
        }
    }
}
