//! 壓縮檔處理流程
//!
//! 每個壓縮檔：解壓縮（必要時詢問密碼，最多三次）→ 解壓資料夾安靜地處理同名檔案 →
//! 沒配對到的檔案移到上一層資料夾等待模糊比對。只有全部配對成功時才刪除壓縮檔。

use super::archive_error::ArchiveError;
use super::archive_reader::{extract_archive, inspect_archive};
use crate::component::script_matcher::ExactMatchResolver;
use crate::config::FileTypeTable;
use crate::tools::{
    FileMover, MoveOutcome, MovePlan, PasswordReply, Prompter, Taxonomy, scan_media_files,
    styled_progress_bar,
};
use log::{info, warn};
use rust_i18n::t;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

pub const MAX_PASSWORD_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveState {
    Discovered,
    Extracting,
    Extracted,
    PasswordRequired,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// 全部配對成功，壓縮檔已刪除
    Reconciled,
    /// 解壓縮成功但仍有未配對檔案，壓縮檔保留
    Partial { queued: bool },
    /// 使用者略過密碼輸入
    Skipped,
    Failed(String),
    /// 試執行，只列出內容
    Planned { entries: usize },
}

/// 單一壓縮檔的處理紀錄
#[derive(Debug, Clone)]
pub struct ArchiveJob {
    pub archive_path: PathBuf,
    pub extraction_dir: Option<PathBuf>,
    pub password_attempts: usize,
    pub state: ArchiveState,
    pub outcome: Option<ArchiveOutcome>,
}

impl ArchiveJob {
    fn new(archive_path: PathBuf) -> Self {
        Self {
            archive_path,
            extraction_dir: None,
            password_attempts: 0,
            state: ArchiveState::Discovered,
            outcome: None,
        }
    }

    fn finish(&mut self, state: ArchiveState, outcome: ArchiveOutcome) {
        self.state = state;
        self.outcome = Some(outcome);
    }
}

/// 一批壓縮檔的處理結果
#[derive(Debug, Clone, Default)]
pub struct ArchiveBatchReport {
    pub jobs: Vec<ArchiveJob>,
    /// 仍有檔案、需要再做一次模糊比對的解壓資料夾
    pub queued_dirs: Vec<PathBuf>,
    pub declined: bool,
    pub interrupted: bool,
}

impl ArchiveBatchReport {
    fn count(&self, predicate: impl Fn(&ArchiveOutcome) -> bool) -> usize {
        self.jobs
            .iter()
            .filter(|job| job.outcome.as_ref().is_some_and(&predicate))
            .count()
    }

    #[must_use]
    pub fn reconciled(&self) -> usize {
        self.count(|o| *o == ArchiveOutcome::Reconciled)
    }

    #[must_use]
    pub fn partial(&self) -> usize {
        self.count(|o| matches!(o, ArchiveOutcome::Partial { .. }))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| *o == ArchiveOutcome::Skipped)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ArchiveOutcome::Failed(_)))
    }
}

/// 壓縮檔處理流程
pub struct ArchivePipeline<'a> {
    file_type_table: &'a FileTypeTable,
    taxonomy: &'a Taxonomy,
    prompter: &'a dyn Prompter,
    shutdown_signal: Arc<AtomicBool>,
}

impl<'a> ArchivePipeline<'a> {
    pub fn new(
        file_type_table: &'a FileTypeTable,
        taxonomy: &'a Taxonomy,
        prompter: &'a dyn Prompter,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            file_type_table,
            taxonomy,
            prompter,
            shutdown_signal,
        }
    }

    /// 處理資料夾（不遞迴）中的所有壓縮檔，整批只確認一次
    pub fn run(&self, directory: &Path, mover: &mut FileMover) -> ArchiveBatchReport {
        let mut report = ArchiveBatchReport::default();
        let archives = scan_media_files(directory, self.file_type_table, false).archives;

        if archives.is_empty() {
            return report;
        }

        let count = archives.len();
        let mut lines = vec![t!("archive.found", count = count).to_string()];
        lines.extend(archives.iter().map(|a| format!("  {}", a.file_name())));
        self.prompter.notify(&lines);

        if !self.prompter.confirm(&t!("archive.confirm_batch")) {
            info!("使用者略過壓縮檔處理");
            report.declined = true;
            return report;
        }

        // 一個壓縮檔處理完才開始下一個
        for archive in archives {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                warn!("收到中斷訊號，停止處理壓縮檔");
                report.interrupted = true;
                break;
            }

            let job = self.process(archive.path, mover, &mut report.queued_dirs);
            report.jobs.push(job);
        }

        info!(
            "壓縮檔處理完成 - 完成: {}, 部分: {}, 略過: {}, 失敗: {}",
            report.reconciled(),
            report.partial(),
            report.skipped(),
            report.failed()
        );

        report
    }

    fn process(
        &self,
        archive_path: PathBuf,
        mover: &mut FileMover,
        queued_dirs: &mut Vec<PathBuf>,
    ) -> ArchiveJob {
        let mut job = ArchiveJob::new(archive_path);

        if mover.is_dry_run() {
            self.preview(&mut job);
            return job;
        }

        let Some(parent) = job.archive_path.parent().map(Path::to_path_buf) else {
            job.finish(
                ArchiveState::Failed,
                ArchiveOutcome::Failed("no parent directory".to_string()),
            );
            return job;
        };

        let extraction_dir = unique_extraction_dir(&parent, &archive_stem(&job.archive_path));
        if let Err(e) = fs::create_dir_all(&extraction_dir) {
            warn!("無法建立解壓縮資料夾 {}: {e}", extraction_dir.display());
            job.finish(ArchiveState::Failed, ArchiveOutcome::Failed(e.to_string()));
            return job;
        }
        job.extraction_dir = Some(extraction_dir.clone());

        if !self.extract_with_retry(&mut job, &extraction_dir) {
            remove_dir_if_empty(&extraction_dir);
            return job;
        }

        self.reconcile_extracted(&mut job, &parent, &extraction_dir, mover, queued_dirs);
        job
    }

    /// 解壓縮，必要時詢問密碼；回傳是否成功
    fn extract_with_retry(&self, job: &mut ArchiveJob, extraction_dir: &Path) -> bool {
        let mut password: Option<String> = None;

        loop {
            job.state = ArchiveState::Extracting;
            let progress_bar = styled_progress_bar(0, job_name(job));
            let result = extract_archive(
                &job.archive_path,
                extraction_dir,
                password.as_deref(),
                Some(&progress_bar),
            );

            match result {
                Ok(summary) => {
                    progress_bar.finish_and_clear();
                    info!(
                        "解壓縮完成 {}: {} 個檔案, {} bytes",
                        job.archive_path.display(),
                        summary.files,
                        summary.bytes
                    );
                    job.state = ArchiveState::Extracted;
                    return true;
                }
                Err(e) if e.needs_password() => {
                    progress_bar.finish_and_clear();
                    job.state = ArchiveState::PasswordRequired;

                    if job.password_attempts >= MAX_PASSWORD_ATTEMPTS {
                        warn!("密碼錯誤次數過多，略過: {}", job.archive_path.display());
                        job.finish(ArchiveState::Failed, ArchiveOutcome::Failed(e.to_string()));
                        return false;
                    }

                    job.password_attempts += 1;
                    match self.prompter.ask_password(
                        &job.archive_path,
                        job.password_attempts,
                        MAX_PASSWORD_ATTEMPTS,
                    ) {
                        PasswordReply::Password(input) => password = Some(input),
                        PasswordReply::Skip => {
                            info!("使用者略過加密壓縮檔: {}", job.archive_path.display());
                            job.finish(ArchiveState::Failed, ArchiveOutcome::Skipped);
                            return false;
                        }
                    }
                }
                Err(e) => {
                    progress_bar.abandon();
                    warn!("解壓縮失敗 {}: {e}", job.archive_path.display());
                    job.finish(ArchiveState::Failed, ArchiveOutcome::Failed(e.to_string()));
                    return false;
                }
            }
        }
    }

    fn reconcile_extracted(
        &self,
        job: &mut ArchiveJob,
        parent: &Path,
        extraction_dir: &Path,
        mover: &mut FileMover,
        queued_dirs: &mut Vec<PathBuf>,
    ) {
        let inventory = scan_media_files(extraction_dir, self.file_type_table, false);
        let exact =
            ExactMatchResolver::silent(self.taxonomy.already_same_name()).resolve(&inventory, mover);

        let mut all_moved = exact.collisions == 0 && exact.errors == 0;
        let leftovers: Vec<_> = exact
            .residual
            .videos
            .iter()
            .chain(exact.residual.companions())
            .collect();
        let has_unmatched = !leftovers.is_empty();

        // 未配對的檔案移到上一層，稍後一起模糊比對
        for record in leftovers {
            let plan = MovePlan {
                source: record.path.clone(),
                destination: parent.join(record.file_name()),
            };
            match mover.move_one(&plan) {
                MoveOutcome::Moved | MoveOutcome::Planned => {}
                outcome => {
                    warn!("無法移出解壓縮檔案 {}: {outcome:?}", plan.source.display());
                    all_moved = false;
                }
            }
        }

        let queued = contains_files(extraction_dir);
        if queued {
            info!("解壓縮資料夾仍有檔案，稍後處理: {}", extraction_dir.display());
            queued_dirs.push(extraction_dir.to_path_buf());
        } else if let Err(e) = fs::remove_dir_all(extraction_dir) {
            warn!("無法刪除解壓縮資料夾 {}: {e}", extraction_dir.display());
        }

        let fully_reconciled = !exact.groups.is_empty() && !has_unmatched && all_moved && !queued;
        if !fully_reconciled {
            job.finish(ArchiveState::Extracted, ArchiveOutcome::Partial { queued });
            return;
        }

        match fs::remove_file(&job.archive_path) {
            Ok(()) => {
                info!("已刪除壓縮檔: {}", job.archive_path.display());
                job.finish(ArchiveState::Extracted, ArchiveOutcome::Reconciled);
            }
            Err(e) => {
                warn!("無法刪除壓縮檔 {}: {e}", job.archive_path.display());
                job.finish(ArchiveState::Extracted, ArchiveOutcome::Partial { queued });
            }
        }
    }

    /// 試執行：只列出內容
    fn preview(&self, job: &mut ArchiveJob) {
        match inspect_archive(&job.archive_path, None) {
            Ok(listing) => {
                let mut lines = vec![format!("[DRY RUN] {}", job_name(job))];
                if listing.is_encrypted() {
                    lines.push(format!("  {}", t!("archive.encrypted")));
                }
                lines.extend(listing.files().map(|entry| format!("  {}", entry.name)));
                self.prompter.notify(&lines);
                job.finish(
                    ArchiveState::Discovered,
                    ArchiveOutcome::Planned {
                        entries: listing.files().count(),
                    },
                );
            }
            Err(ArchiveError::Encrypted) => {
                self.prompter.notify(&[format!(
                    "[DRY RUN] {} ({})",
                    job_name(job),
                    t!("archive.encrypted")
                )]);
                job.finish(
                    ArchiveState::PasswordRequired,
                    ArchiveOutcome::Planned { entries: 0 },
                );
            }
            Err(e) => {
                warn!("無法讀取壓縮檔 {}: {e}", job.archive_path.display());
                job.finish(ArchiveState::Failed, ArchiveOutcome::Failed(e.to_string()));
            }
        }
    }
}

fn job_name(job: &ArchiveJob) -> String {
    job.archive_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn archive_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string())
}

/// 取得不存在的解壓縮資料夾：`stem`、`stem-1`、`stem-2`…
#[must_use]
pub fn unique_extraction_dir(parent: &Path, stem: &str) -> PathBuf {
    let candidate = parent.join(stem);
    if !candidate.exists() {
        return candidate;
    }

    (1..)
        .map(|n| parent.join(format!("{stem}-{n}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// 資料夾（遞迴）中是否還有一般檔案
fn contains_files(directory: &Path) -> bool {
    WalkDir::new(directory)
        .into_iter()
        .filter_map(Result::ok)
        .any(|entry| entry.file_type().is_file())
}

fn remove_dir_if_empty(directory: &Path) {
    if contains_files(directory) {
        return;
    }
    if let Err(e) = fs::remove_dir_all(directory) {
        warn!("無法刪除解壓縮資料夾 {}: {e}", directory.display());
    }
}
