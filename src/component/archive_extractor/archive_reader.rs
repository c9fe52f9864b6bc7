//! 壓縮檔格式判斷與統一的讀取介面

use super::archive_error::ArchiveError;
use super::{rar_extractor, zip_extractor};
use indicatif::ProgressBar;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Rar,
}

impl ArchiveFormat {
    /// 依副檔名判斷（不分大小寫）
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "zip" => Some(Self::Zip),
            "rar" => Some(Self::Rar),
            _ => None,
        }
    }
}

/// 壓縮檔中的單一項目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: u64,
    pub encrypted: bool,
    pub is_dir: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveListing {
    pub entries: Vec<ArchiveEntry>,
}

impl ArchiveListing {
    /// 任一檔案項目帶有加密旗標
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.files().any(|entry| entry.encrypted)
    }

    pub fn files(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.entries.iter().filter(|entry| !entry.is_dir)
    }

    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files().map(|entry| entry.size).sum()
    }
}

/// 解壓縮結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub bytes: u64,
}

/// 讀取壓縮檔內容清單，不解壓縮
pub fn inspect_archive(
    path: &Path,
    password: Option<&str>,
) -> Result<ArchiveListing, ArchiveError> {
    match ArchiveFormat::from_path(path) {
        Some(ArchiveFormat::Zip) => zip_extractor::inspect_zip(path),
        Some(ArchiveFormat::Rar) => rar_extractor::inspect_rar(path, password),
        None => Err(ArchiveError::Unsupported(path.display().to_string())),
    }
}

/// 解壓縮到指定資料夾
///
/// 加密偵測一律在寫入任何檔案之前完成。
pub fn extract_archive(
    path: &Path,
    destination: &Path,
    password: Option<&str>,
    progress: Option<&ProgressBar>,
) -> Result<ExtractSummary, ArchiveError> {
    match ArchiveFormat::from_path(path) {
        Some(ArchiveFormat::Zip) => {
            zip_extractor::extract_zip(path, destination, password, progress)
        }
        Some(ArchiveFormat::Rar) => {
            rar_extractor::extract_rar(path, destination, password, progress)
        }
        None => Err(ArchiveError::Unsupported(path.display().to_string())),
    }
}

/// 將項目名稱轉為安全的相對路徑，拒絕絕對路徑與 `..`
#[must_use]
pub fn enclosed_path(name: &str) -> Option<PathBuf> {
    let normalized = name.replace('\\', "/");
    let mut result = PathBuf::new();
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => result.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!result.as_os_str().is_empty()).then_some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ArchiveFormat::from_path(Path::new("a/b.ZIP")),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("b.rar")),
            Some(ArchiveFormat::Rar)
        );
        assert_eq!(ArchiveFormat::from_path(Path::new("b.7z")), None);
        assert_eq!(ArchiveFormat::from_path(Path::new("zip")), None);
    }

    #[test]
    fn test_enclosed_path_rejects_traversal() {
        assert_eq!(enclosed_path("dir/a.mp4"), Some(PathBuf::from("dir/a.mp4")));
        assert_eq!(enclosed_path("./a.mp4"), Some(PathBuf::from("a.mp4")));
        assert_eq!(enclosed_path("dir\\a.mp4"), Some(PathBuf::from("dir/a.mp4")));
        assert_eq!(enclosed_path("../evil.mp4"), None);
        assert_eq!(enclosed_path("/etc/passwd"), None);
        assert_eq!(enclosed_path("a/../../b"), None);
        assert_eq!(enclosed_path(""), None);
    }

    #[test]
    fn test_listing_encryption_ignores_directories() {
        let listing = ArchiveListing {
            entries: vec![
                ArchiveEntry {
                    name: "dir/".to_string(),
                    size: 0,
                    encrypted: true,
                    is_dir: true,
                },
                ArchiveEntry {
                    name: "dir/a.mp4".to_string(),
                    size: 10,
                    encrypted: false,
                    is_dir: false,
                },
            ],
        };
        assert!(!listing.is_encrypted());
        assert_eq!(listing.total_size(), 10);
    }
}
