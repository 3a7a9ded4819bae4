use anyhow::{Context, Result, bail};
use std::path::Path;

pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("來源路徑不存在: {}", path.display());
    }
    if !path.is_dir() {
        bail!("來源路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

/// 建立輸出資料夾；路徑已存在但不是資料夾時回傳錯誤
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("無法建立資料夾: {}", path.display()))?;
    } else if !path.is_dir() {
        bail!("{} 已存在但不是資料夾", path.display());
    }
    Ok(())
}
