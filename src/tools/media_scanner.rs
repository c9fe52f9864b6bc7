//! 媒體檔案掃描與分類
//!
//! 掃描目錄（可遞迴），依副檔名將檔案分為影片、腳本、多軸腳本、字幕與壓縮檔。
//! 遞迴時永遠不進入輸出分類資料夾。

use crate::config::{FileKind, FileTypeTable};
use crate::tools::taxonomy::TAXONOMY_DIR_NAME;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// 單一分類後的檔案
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRecord {
    pub path: PathBuf,
    /// 去除副檔名後的檔名（多軸腳本去除整個 `.axis.funscript`）
    pub stem: String,
    /// 實際比對到的副檔名，含前導點
    pub extension: String,
    pub kind: FileKind,
}

impl FileRecord {
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn stem_key(&self) -> String {
        self.stem.to_lowercase()
    }

    /// 以新的基本檔名組出檔名，保留原始副檔名
    #[must_use]
    pub fn renamed(&self, base_name: &str) -> String {
        format!("{base_name}{}", self.extension)
    }
}

/// 一次掃描的結果，各清單皆依 (小寫 stem, 路徑) 排序
#[derive(Debug, Clone, Default)]
pub struct MediaInventory {
    pub videos: Vec<FileRecord>,
    pub scripts: Vec<FileRecord>,
    pub multi_axis_scripts: Vec<FileRecord>,
    pub subtitles: Vec<FileRecord>,
    pub archives: Vec<FileRecord>,
}

impl MediaInventory {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
            && self.scripts.is_empty()
            && self.multi_axis_scripts.is_empty()
            && self.subtitles.is_empty()
            && self.archives.is_empty()
    }

    /// 影片、腳本與字幕的總數（不含壓縮檔）
    #[must_use]
    pub fn media_count(&self) -> usize {
        self.videos.len()
            + self.scripts.len()
            + self.multi_axis_scripts.len()
            + self.subtitles.len()
    }

    fn push(&mut self, record: FileRecord) {
        match record.kind {
            FileKind::Video => self.videos.push(record),
            FileKind::Script => self.scripts.push(record),
            FileKind::MultiAxisScript(_) => self.multi_axis_scripts.push(record),
            FileKind::Subtitle => self.subtitles.push(record),
            FileKind::Archive => self.archives.push(record),
        }
    }

    fn sort(&mut self) {
        for bucket in [
            &mut self.videos,
            &mut self.scripts,
            &mut self.multi_axis_scripts,
            &mut self.subtitles,
            &mut self.archives,
        ] {
            sort_records(bucket);
        }
    }
}

/// 依 (小寫 stem, 路徑) 排序，確保跨平台結果一致
pub fn sort_records(records: &mut [FileRecord]) {
    records.sort_by(|a, b| {
        a.stem_key()
            .cmp(&b.stem_key())
            .then_with(|| a.path.cmp(&b.path))
    });
}

/// 掃描並分類目錄下的媒體檔案
///
/// 無法讀取的項目會被略過，不會中斷整個掃描。
#[must_use]
pub fn scan_media_files(
    directory: &Path,
    file_type_table: &FileTypeTable,
    recursive: bool,
) -> MediaInventory {
    let mut walker = WalkDir::new(directory).follow_links(false).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut inventory = MediaInventory::default();

    for entry in walker
        .into_iter()
        .filter_entry(|e| !is_hidden(e) && !is_taxonomy_dir(e))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("略過無法讀取的項目: {e}");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        let Some(classification) = file_type_table.classify(&file_name) else {
            continue;
        };

        debug!(
            "分類 {:?}: {}",
            classification.kind,
            entry.path().display()
        );

        inventory.push(FileRecord {
            path: entry.into_path(),
            stem: classification.stem,
            extension: classification.extension,
            kind: classification.kind,
        });
    }

    inventory.sort();
    inventory
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn is_taxonomy_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == TAXONOMY_DIR_NAME
}
