//! 空資料夾清理
//!
//! 後序走訪：子資料夾先處理，若全部被移除則父資料夾也成為空資料夾。
//! 輸出分類資料夾與根目錄本身永遠不會被刪除。

use crate::tools::Prompter;
use crate::tools::taxonomy::TAXONOMY_DIR_NAME;
use log::{debug, info, warn};
use rust_i18n::t;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReapOutcome {
    Removed,
    /// 試執行，只回報
    Planned,
    Declined,
    /// 權限等錯誤，資料夾保留
    Failed(String),
}

#[derive(Debug, Clone, Default)]
pub struct ReapResult {
    pub candidates: Vec<(PathBuf, ReapOutcome)>,
    pub interrupted: bool,
}

impl ReapResult {
    fn count(&self, predicate: impl Fn(&ReapOutcome) -> bool) -> usize {
        self.candidates.iter().filter(|(_, o)| predicate(o)).count()
    }

    #[must_use]
    pub fn removed(&self) -> usize {
        self.count(|o| matches!(o, ReapOutcome::Removed | ReapOutcome::Planned))
    }

    #[must_use]
    pub fn declined(&self) -> usize {
        self.count(|o| *o == ReapOutcome::Declined)
    }

    #[must_use]
    pub fn errors(&self) -> usize {
        self.count(|o| matches!(o, ReapOutcome::Failed(_)))
    }
}

pub struct FolderReaper<'a> {
    prompter: &'a dyn Prompter,
    dry_run: bool,
    shutdown_signal: Arc<AtomicBool>,
}

impl<'a> FolderReaper<'a> {
    pub fn new(
        prompter: &'a dyn Prompter,
        dry_run: bool,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            prompter,
            dry_run,
            shutdown_signal,
        }
    }

    /// 從根目錄開始清理空資料夾
    pub fn reap(&self, root: &Path) -> ReapResult {
        let mut result = ReapResult::default();
        self.visit(root, true, &mut result);
        info!(
            "空資料夾清理完成 - 刪除: {}, 保留: {}, 失敗: {}",
            result.removed(),
            result.declined(),
            result.errors()
        );
        result
    }

    /// 回傳此資料夾處理後是否可視為已移除
    fn visit(&self, directory: &Path, is_root: bool, result: &mut ReapResult) -> bool {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            result.interrupted = true;
            return false;
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("無法讀取資料夾 {}: {e}", directory.display());
                return false;
            }
        };

        let mut entries: Vec<_> = entries.filter_map(Result::ok).collect();
        entries.sort_by_key(fs::DirEntry::file_name);

        let mut has_content = false;
        for entry in entries {
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            if !is_dir || entry.file_name() == TAXONOMY_DIR_NAME {
                has_content = true;
                continue;
            }
            if !self.visit(&entry.path(), false, result) {
                has_content = true;
            }
        }

        if has_content || is_root || result.interrupted {
            return false;
        }

        self.propose(directory, result)
    }

    fn propose(&self, directory: &Path, result: &mut ReapResult) -> bool {
        let path = directory.display().to_string();
        let prompt = t!("reaper.confirm", path = path);
        if !self.prompter.confirm(&prompt) {
            debug!("保留空資料夾: {}", directory.display());
            result
                .candidates
                .push((directory.to_path_buf(), ReapOutcome::Declined));
            return false;
        }

        if self.dry_run {
            info!("[DRY RUN] 刪除空資料夾: {}", directory.display());
            result
                .candidates
                .push((directory.to_path_buf(), ReapOutcome::Planned));
            return true;
        }

        match fs::remove_dir(directory) {
            Ok(()) => {
                debug!("刪除空資料夾: {}", directory.display());
                result
                    .candidates
                    .push((directory.to_path_buf(), ReapOutcome::Removed));
                true
            }
            Err(e) => {
                warn!("無法刪除空資料夾 {}: {e}", directory.display());
                result
                    .candidates
                    .push((directory.to_path_buf(), ReapOutcome::Failed(e.to_string())));
                false
            }
        }
    }
}
