use crate::error::{LabelCheckError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

impl ImageInfo {
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            file_name,
        }
    }
}

/// 入力パスから処理対象の画像一覧を作る
///
/// - ファイルならその1件
/// - ディレクトリなら直下の全ファイル（ファイル名順）、`limit` 指定時は先頭から
pub fn collect_inputs(input: &Path, limit: Option<usize>) -> Result<Vec<ImageInfo>> {
    if !input.exists() {
        return Err(LabelCheckError::PathNotFound(input.display().to_string()));
    }

    if input.is_file() {
        return Ok(vec![ImageInfo::from_path(input)]);
    }

    let mut images = scan_folder(input)?;
    if let Some(limit) = limit {
        images.truncate(limit);
    }

    Ok(images)
}

pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(LabelCheckError::PathNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| ImageInfo::from_path(e.path()))
        .collect();

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(LabelCheckError::PathNotFound(_))));
    }

    #[test]
    fn test_scan_folder_empty() {
        let temp_dir = std::env::temp_dir().join("label-check-test-empty");
        fs::create_dir_all(&temp_dir).unwrap();

        let result = scan_folder(&temp_dir).unwrap();
        assert!(result.is_empty());

        fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_scan_folder_takes_all_files_sorted() {
        let temp_dir = std::env::temp_dir().join("label-check-test-sort");
        fs::create_dir_all(temp_dir.join("nested")).unwrap();

        File::create(temp_dir.join("c.jpg")).unwrap();
        File::create(temp_dir.join("a.tif")).unwrap();
        File::create(temp_dir.join("b.JPG")).unwrap();
        File::create(temp_dir.join("nested").join("d.jpg")).unwrap();

        let result = scan_folder(&temp_dir).unwrap();
        let names: Vec<&str> = result.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.tif", "b.JPG", "c.jpg"]);

        fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_collect_inputs_with_limit() {
        let temp_dir = std::env::temp_dir().join("label-check-test-limit");
        fs::create_dir_all(&temp_dir).unwrap();

        for name in ["1.jpg", "2.jpg", "3.jpg"] {
            File::create(temp_dir.join(name)).unwrap();
        }

        let result = collect_inputs(&temp_dir, Some(2)).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].file_name, "2.jpg");

        let all = collect_inputs(&temp_dir, None).unwrap();
        assert_eq!(all.len(), 3);

        fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_collect_inputs_single_file() {
        let temp_dir = std::env::temp_dir().join("label-check-test-single");
        fs::create_dir_all(&temp_dir).unwrap();
        let file = temp_dir.join("IMG_0001.jpg");
        File::create(&file).unwrap();

        let result = collect_inputs(&file, Some(0)).unwrap();
        assert_eq!(result, vec![ImageInfo::from_path(&file)]);
        assert_eq!(result[0].file_name, "IMG_0001.jpg");

        fs::remove_dir_all(&temp_dir).ok();
    }
}
