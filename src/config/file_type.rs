//! 副檔名分類
//!
//! 依照檔案類型表判斷檔案屬於影片、腳本、多軸腳本、字幕或壓縮檔

use crate::config::types::{FileKind, FileTypeTable};

/// 分類結果：檔案種類與實際比對到的副檔名（保留原始大小寫）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: FileKind,
    pub stem: String,
    pub extension: String,
}

impl FileTypeTable {
    /// 依檔名判斷種類，比對不分大小寫
    ///
    /// 多軸副檔名會先於一般腳本副檔名比對，`.roll.funscript` 不會被當成一般腳本。
    #[must_use]
    pub fn classify(&self, file_name: &str) -> Option<Classification> {
        for ext in &self.multi_axis_script_file {
            if let Some((stem, extension)) = split_suffix(file_name, ext) {
                let axis = ext
                    .trim_start_matches('.')
                    .split('.')
                    .next()
                    .unwrap_or_default()
                    .to_lowercase();
                return Some(Classification {
                    kind: FileKind::MultiAxisScript(axis),
                    stem,
                    extension,
                });
            }
        }

        let groups: [(&[String], FileKind); 4] = [
            (&self.script_file, FileKind::Script),
            (&self.video_file, FileKind::Video),
            (&self.subtitle_file, FileKind::Subtitle),
            (&self.archive_file, FileKind::Archive),
        ];

        for (extensions, kind) in groups {
            for ext in extensions {
                if let Some((stem, extension)) = split_suffix(file_name, ext) {
                    return Some(Classification {
                        kind,
                        stem,
                        extension,
                    });
                }
            }
        }

        None
    }

    /// 所有多軸腳本的軸向名稱（已排序）
    #[must_use]
    pub fn axis_names(&self) -> Vec<String> {
        let mut axes: Vec<String> = self
            .multi_axis_script_file
            .iter()
            .filter_map(|ext| ext.trim_start_matches('.').split('.').next())
            .map(str::to_lowercase)
            .collect();
        axes.sort();
        axes.dedup();
        axes
    }
}

/// 若 `file_name` 以 `ext` 結尾（不分大小寫）且前面還有檔名，回傳 (stem, 原始副檔名)
fn split_suffix(file_name: &str, ext: &str) -> Option<(String, String)> {
    if file_name.len() <= ext.len() {
        return None;
    }
    let split_at = file_name.len() - ext.len();
    if !file_name.is_char_boundary(split_at) {
        return None;
    }
    let (stem, suffix) = file_name.split_at(split_at);
    suffix
        .eq_ignore_ascii_case(ext)
        .then(|| (stem.to_string(), suffix.to_string()))
}
