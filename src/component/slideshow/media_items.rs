use crate::config::ItemOrder;
use crate::error::SlideshowError;
use crate::tools::{MediaKind, MediaSelection, classify};
use log::info;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};

/// 一個輸入檔案與它在本次執行中的固定位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub path: PathBuf,
    pub kind: MediaKind,
    pub position: usize,
}

/// 過濾出可用的媒體檔，依需要洗牌一次，再指定位置
///
/// 位置在這裡決定後就不再改變，之後的收集與合併都以它排序。
pub fn collect_media_items(
    root: &Path,
    files: Vec<PathBuf>,
    selection: MediaSelection,
    order: ItemOrder,
) -> Result<Vec<MediaItem>, SlideshowError> {
    let mut eligible: Vec<(PathBuf, MediaKind)> = files
        .into_iter()
        .map(|path| {
            let kind = classify(&path);
            (path, kind)
        })
        .filter(|(_, kind)| selection.accepts(*kind))
        .collect();

    if eligible.is_empty() {
        return Err(SlideshowError::NoEligibleFiles(root.to_path_buf()));
    }

    if let ItemOrder::Shuffled { seed } = order {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        eligible.shuffle(&mut rng);
        info!("已隨機排列 {} 個檔案 (seed: {seed})", eligible.len());
    }

    Ok(eligible
        .into_iter()
        .enumerate()
        .map(|(position, (path, kind))| MediaItem {
            path,
            kind,
            position,
        })
        .collect())
}
