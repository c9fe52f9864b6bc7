//! 一次完整的整理流程
//!
//! 驗證根目錄 → 建立輸出分類資料夾 → 壓縮檔（可選）→ 根目錄配對 →
//! 仍有檔案的解壓資料夾配對 → 清理空資料夾

use crate::component::archive_extractor::{ArchiveBatchReport, ArchivePipeline};
use crate::component::empty_folder_cleaner::{FolderReaper, ReapResult};
use crate::component::script_matcher::{ForgeReport, Reconciler, Vocabulary};
use crate::config::{FileTypeTable, SessionDefaults};
use crate::tools::{
    FileMover, MovePlan, Prompter, ResolutionProbe, Taxonomy, validate_directory_exists,
};
use anyhow::Result;
use log::{info, warn};
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 單次執行的開關，執行期間不會變動
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub recursive: bool,
    pub extract_archives: bool,
    pub tag_with_resolution: bool,
    pub dry_run: bool,
    pub verbose_exact_matches: bool,
}

impl From<SessionDefaults> for SessionOptions {
    fn from(defaults: SessionDefaults) -> Self {
        Self {
            recursive: defaults.recursive,
            extract_archives: defaults.extract_archives,
            tag_with_resolution: defaults.tag_with_resolution,
            dry_run: defaults.dry_run,
            verbose_exact_matches: defaults.verbose_exact_matches,
        }
    }
}

impl From<SessionOptions> for SessionDefaults {
    fn from(options: SessionOptions) -> Self {
        Self {
            recursive: options.recursive,
            extract_archives: options.extract_archives,
            tag_with_resolution: options.tag_with_resolution,
            dry_run: options.dry_run,
            verbose_exact_matches: options.verbose_exact_matches,
        }
    }
}

/// 整次執行的結果
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub root: PathBuf,
    pub archives: ArchiveBatchReport,
    pub directories: Vec<ForgeReport>,
    pub reaped: ReapResult,
    /// 試執行時的每一筆預計搬移
    pub planned_moves: Vec<MovePlan>,
    pub interrupted: bool,
}

impl SessionReport {
    fn sum(&self, field: impl Fn(&ForgeReport) -> usize) -> usize {
        self.directories.iter().map(field).sum()
    }

    #[must_use]
    pub fn exact_groups(&self) -> usize {
        self.sum(|r| r.exact_groups)
    }

    #[must_use]
    pub fn changed_groups(&self) -> usize {
        self.sum(|r| r.changed_groups)
    }

    #[must_use]
    pub fn declined_groups(&self) -> usize {
        self.sum(|r| r.declined_groups)
    }

    #[must_use]
    pub fn not_changed(&self) -> usize {
        self.sum(|r| r.not_changed)
    }

    #[must_use]
    pub fn collisions(&self) -> usize {
        self.sum(|r| r.collisions)
    }

    #[must_use]
    pub fn errors(&self) -> usize {
        self.sum(|r| r.errors)
    }
}

/// 整理流程
pub struct ForgeSession<'a> {
    file_type_table: &'a FileTypeTable,
    vocabulary: Vocabulary,
    options: SessionOptions,
    prompter: &'a dyn Prompter,
    probe: Option<&'a dyn ResolutionProbe>,
    shutdown_signal: Arc<AtomicBool>,
}

impl<'a> ForgeSession<'a> {
    pub fn new(
        file_type_table: &'a FileTypeTable,
        vocabulary: Vocabulary,
        options: SessionOptions,
        prompter: &'a dyn Prompter,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            file_type_table,
            vocabulary,
            options,
            prompter,
            probe: None,
            shutdown_signal,
        }
    }

    /// 解析度探測器，只在啟用解析度標記時使用
    #[must_use]
    pub fn with_resolution_probe(mut self, probe: &'a dyn ResolutionProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    #[must_use]
    pub const fn options(&self) -> SessionOptions {
        self.options
    }

    fn is_interrupted(&self) -> bool {
        self.shutdown_signal.load(Ordering::SeqCst)
    }

    /// 執行整個流程；只有根目錄不存在時會回傳錯誤
    pub fn run(&self, root: &Path) -> Result<SessionReport> {
        validate_directory_exists(root)?;

        let taxonomy = Taxonomy::new(root);
        if !self.options.dry_run {
            taxonomy.ensure()?;
        }

        let mut report = SessionReport {
            root: root.to_path_buf(),
            ..SessionReport::default()
        };
        let mut mover = FileMover::new(self.options.dry_run);

        if self.options.extract_archives {
            report.archives = ArchivePipeline::new(
                self.file_type_table,
                &taxonomy,
                self.prompter,
                Arc::clone(&self.shutdown_signal),
            )
            .run(root, &mut mover);
        }

        let mut reconciler = Reconciler::new(
            self.file_type_table,
            &taxonomy,
            &self.vocabulary,
            self.prompter,
            Arc::clone(&self.shutdown_signal),
        );
        if self.options.tag_with_resolution {
            match self.probe {
                Some(probe) => reconciler = reconciler.with_resolution_probe(probe),
                None => warn!("未設定解析度探測器，略過解析度標記"),
            }
        }

        if !self.is_interrupted() {
            report.directories.push(reconciler.reconcile_directory(
                root,
                self.options.recursive,
                self.options.verbose_exact_matches,
                &mut mover,
            ));
        }

        // 遞迴掃描根目錄時，解壓資料夾已經包含在內
        for directory in &report.archives.queued_dirs {
            if self.is_interrupted() {
                break;
            }
            if self.options.recursive || !directory.exists() {
                continue;
            }
            info!("處理解壓縮資料夾: {}", directory.display());
            report.directories.push(reconciler.reconcile_directory(
                directory,
                true,
                false,
                &mut mover,
            ));
        }

        if self.options.dry_run {
            report.planned_moves = mover.planned_moves().to_vec();
            self.prompter.notify(&planned_move_lines(&report.planned_moves));
        }

        if !self.is_interrupted() {
            report.reaped = FolderReaper::new(
                self.prompter,
                self.options.dry_run,
                Arc::clone(&self.shutdown_signal),
            )
            .reap(root);
        }

        report.interrupted = self.is_interrupted();
        info!(
            "整理完成 {} - 同名: {}, 已變更: {}, 略過: {}, 未變更: {}",
            root.display(),
            report.exact_groups(),
            report.changed_groups(),
            report.declined_groups(),
            report.not_changed()
        );

        Ok(report)
    }
}

/// 試執行的搬移清單，每筆一行
fn planned_move_lines(plans: &[MovePlan]) -> Vec<String> {
    plans
        .iter()
        .map(|plan| {
            let source = plan.source.display().to_string();
            let destination = plan.destination.display().to_string();
            t!(
                "forge.planned_move",
                source = source,
                destination = destination
            )
            .to_string()
        })
        .collect()
}
