use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

/// 哪些類型會進入幻燈片
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaSelection {
    #[default]
    ImagesOnly,
    ImagesAndVideos,
}

impl MediaSelection {
    #[must_use]
    pub const fn accepts(self, kind: MediaKind) -> bool {
        match (self, kind) {
            (_, MediaKind::Image) => true,
            (Self::ImagesAndVideos, MediaKind::Video) => true,
            _ => false,
        }
    }
}

/// 依副檔名對應的 MIME 類型判斷檔案種類，不讀取檔案內容
#[must_use]
pub fn classify(path: &Path) -> MediaKind {
    let Some(mime) = mime_guess::from_path(path).first_raw() else {
        return MediaKind::Other;
    };

    if mime.starts_with("image/") {
        MediaKind::Image
    } else if mime.starts_with("video/") {
        MediaKind::Video
    } else {
        MediaKind::Other
    }
}
