use crate::error::SlideshowError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 列出目錄下的檔案（不含資料夾與根目錄本身）
///
/// 每一層都依檔名排序，因此在檔案系統未變動時順序固定。
/// 非遞迴模式只列出第一層；遞迴模式以深度優先走訪整棵樹。
/// 任何走訪錯誤都會直接回傳，不保留部分結果。
pub fn list_files(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, SlideshowError> {
    let max_depth = if recursive { usize::MAX } else { 1 };

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        files.push(entry.into_path());
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_tree() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("b.jpg"), b"b").unwrap();
        fs::write(root.join("a.jpg"), b"a").unwrap();
        fs::create_dir_all(root.join("sub/deeper")).unwrap();
        fs::write(root.join("sub/c.png"), b"c").unwrap();
        fs::write(root.join("sub/deeper/d.gif"), b"d").unwrap();
        fs::write(root.join("z.txt"), b"z").unwrap();
        temp_dir
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_list_files_non_recursive() {
        let temp_dir = create_tree();
        let files = list_files(temp_dir.path(), false).unwrap();

        // 不進入子資料夾，也不包含資料夾本身
        assert_eq!(names(temp_dir.path(), &files), ["a.jpg", "b.jpg", "z.txt"]);
    }

    #[test]
    fn test_list_files_recursive_visits_every_file_once() {
        let temp_dir = create_tree();
        let files = list_files(temp_dir.path(), true).unwrap();

        assert_eq!(
            names(temp_dir.path(), &files),
            ["a.jpg", "b.jpg", "sub/c.png", "sub/deeper/d.gif", "z.txt"]
        );
    }

    #[test]
    fn test_list_files_is_stable() {
        let temp_dir = create_tree();
        let first = list_files(temp_dir.path(), true).unwrap();
        let second = list_files(temp_dir.path(), true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_list_files_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(list_files(temp_dir.path(), true).unwrap().is_empty());
    }

    #[test]
    fn test_list_files_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let err = list_files(&missing, false).unwrap_err();
        assert!(matches!(err, SlideshowError::Discovery(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_list_files_unreadable_subdirectory_fails() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = create_tree();
        let locked = temp_dir.path().join("sub/deeper");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root 不受權限限制，此時無法重現
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = list_files(temp_dir.path(), true);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(SlideshowError::Discovery(_))));
    }
}
