//! 單一資料夾的配對流程
//!
//! 掃描 → 同名處理 → 逐一影片模糊比對與確認 → 剩餘檔案移到 `Not-Changed`。
//! 整個流程依序執行，候選池不會被同時修改。

use super::exact_matcher::ExactMatchResolver;
use super::fuzzy_matcher::CandidatePool;
use super::rename_planner::RenamePlanner;
use super::vocabulary::Vocabulary;
use crate::config::FileTypeTable;
use crate::tools::{
    FileMover, FileRecord, MoveOutcome, MovePlan, Prompter, ResolutionProbe, Taxonomy,
    TransactionReport, scan_media_files,
};
use log::{info, warn};
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 單一資料夾的處理結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgeReport {
    pub directory: PathBuf,
    pub exact_groups: usize,
    pub changed_groups: usize,
    pub declined_groups: usize,
    pub not_changed: usize,
    pub moved: usize,
    pub collisions: usize,
    pub errors: usize,
    pub interrupted: bool,
}

impl ForgeReport {
    fn tally(&mut self, report: &TransactionReport) {
        self.moved += report.moved();
        self.collisions += report.collisions();
        self.errors += report.errors();
    }
}

/// 配對流程
pub struct Reconciler<'a> {
    file_type_table: &'a FileTypeTable,
    taxonomy: &'a Taxonomy,
    vocabulary: &'a Vocabulary,
    prompter: &'a dyn Prompter,
    probe: Option<&'a dyn ResolutionProbe>,
    shutdown_signal: Arc<AtomicBool>,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        file_type_table: &'a FileTypeTable,
        taxonomy: &'a Taxonomy,
        vocabulary: &'a Vocabulary,
        prompter: &'a dyn Prompter,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            file_type_table,
            taxonomy,
            vocabulary,
            prompter,
            probe: None,
            shutdown_signal,
        }
    }

    /// 啟用解析度標記
    #[must_use]
    pub fn with_resolution_probe(mut self, probe: &'a dyn ResolutionProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    fn is_interrupted(&self) -> bool {
        self.shutdown_signal.load(Ordering::SeqCst)
    }

    /// 處理一個資料夾
    pub fn reconcile_directory(
        &self,
        directory: &Path,
        recursive: bool,
        verbose: bool,
        mover: &mut FileMover,
    ) -> ForgeReport {
        let mut report = ForgeReport {
            directory: directory.to_path_buf(),
            ..ForgeReport::default()
        };

        let inventory = scan_media_files(directory, self.file_type_table, recursive);
        info!(
            "掃描 {}: 影片 {}、腳本 {}（多軸 {}）、字幕 {}",
            directory.display(),
            inventory.videos.len(),
            inventory.scripts.len() + inventory.multi_axis_scripts.len(),
            inventory.multi_axis_scripts.len(),
            inventory.subtitles.len()
        );

        // 同名檔案一定先於模糊比對處理
        let exact = ExactMatchResolver::new(self.taxonomy.already_same_name(), verbose)
            .resolve(&inventory, mover);
        report.exact_groups = exact.groups.len();
        report.moved += exact.moved;
        report.collisions += exact.collisions;
        report.errors += exact.errors;

        let mut planner = RenamePlanner::new(self.vocabulary, self.taxonomy.changed());
        if let Some(probe) = self.probe {
            planner = planner.with_resolution_probe(probe);
        }

        let mut pool = CandidatePool::from_residual(&exact.residual);
        let mut unmatched: Vec<FileRecord> = Vec::new();

        for video in &exact.residual.videos {
            if self.is_interrupted() {
                warn!("收到中斷訊號，停止處理");
                report.interrupted = true;
                return report;
            }

            if !mover.is_available(&video.path) {
                continue;
            }

            let Some(proposal) = pool
                .match_video(video)
                .and_then(|group| planner.propose(group))
            else {
                info!("找不到配對: {}", video.file_name());
                unmatched.push(video.clone());
                continue;
            };

            self.prompter.notify(&proposal.describe());

            // 不論同意與否，這組伴隨檔都不再提供給其他影片
            pool.claim(&proposal.group);

            if self.prompter.confirm(&t!("forge.approve_prompt")) {
                let transaction_report = mover.apply(&proposal.transaction);
                report.tally(&transaction_report);
                report.changed_groups += 1;
            } else {
                info!("使用者略過: {}", video.file_name());
                report.declined_groups += 1;
            }
        }

        // 沒有配對的影片與從未被提出的伴隨檔
        let not_changed_dir = self.taxonomy.not_changed();
        for record in unmatched.iter().chain(pool.remaining()) {
            let plan = MovePlan {
                source: record.path.clone(),
                destination: not_changed_dir.join(record.file_name()),
            };
            match mover.move_one(&plan) {
                MoveOutcome::Moved | MoveOutcome::Planned => {
                    report.not_changed += 1;
                    report.moved += 1;
                }
                MoveOutcome::Collision => report.collisions += 1,
                MoveOutcome::Failed(_) => report.errors += 1,
                MoveOutcome::Missing | MoveOutcome::AlreadyMoved => {}
            }
        }

        info!(
            "資料夾處理完成 {} - 同名: {}, 已變更: {}, 略過: {}, 未變更: {}, 碰撞: {}, 失敗: {}",
            directory.display(),
            report.exact_groups,
            report.changed_groups,
            report.declined_groups,
            report.not_changed,
            report.collisions,
            report.errors
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tools::PasswordReply;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// 依序回覆預先設定答案的測試用互動介面
    struct ScriptedPrompter {
        answers: RefCell<Vec<bool>>,
        notified: RefCell<Vec<String>>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[bool]) -> Self {
            Self {
                answers: RefCell::new(answers.iter().rev().copied().collect()),
                notified: RefCell::new(Vec::new()),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn confirm(&self, _prompt: &str) -> bool {
            self.answers.borrow_mut().pop().unwrap_or(true)
        }

        fn ask_password(&self, _archive: &Path, _attempt: usize, _max: usize) -> PasswordReply {
            PasswordReply::Skip
        }

        fn notify(&self, lines: &[String]) {
            self.notified.borrow_mut().extend(lines.iter().cloned());
        }
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), name).unwrap();
    }

    fn run(dir: &Path, prompter: &ScriptedPrompter, dry_run: bool) -> ForgeReport {
        let config = Config::new().unwrap();
        let taxonomy = Taxonomy::new(dir);
        let vocabulary = Vocabulary::default();
        let reconciler = Reconciler::new(
            &config.file_type_table,
            &taxonomy,
            &vocabulary,
            prompter,
            Arc::new(AtomicBool::new(false)),
        );
        let mut mover = FileMover::new(dry_run);
        reconciler.reconcile_directory(dir, true, false, &mut mover)
    }

    #[test]
    fn test_fuzzy_pair_moves_to_changed() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "Clip_1080p.mp4");
        touch(temp_dir.path(), "clip.funscript");
        let prompter = ScriptedPrompter::new(&[true]);

        let report = run(temp_dir.path(), &prompter, false);

        let changed = Taxonomy::new(temp_dir.path()).changed();
        assert_eq!(report.changed_groups, 1);
        assert!(changed.join("clip.mp4").exists());
        assert!(changed.join("clip.funscript").exists());
        assert!(!prompter.notified.borrow().is_empty());
    }

    #[test]
    fn test_declined_group_stays_in_place() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "Clip_1080p.mp4");
        touch(temp_dir.path(), "clip.funscript");
        let prompter = ScriptedPrompter::new(&[false]);

        let report = run(temp_dir.path(), &prompter, false);

        assert_eq!(report.declined_groups, 1);
        assert_eq!(report.not_changed, 0);
        assert!(temp_dir.path().join("Clip_1080p.mp4").exists());
        assert!(temp_dir.path().join("clip.funscript").exists());
    }

    #[test]
    fn test_orphans_move_to_not_changed() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "orphan.mp4");
        touch(temp_dir.path(), "zzzz.srt");
        let prompter = ScriptedPrompter::new(&[]);

        let report = run(temp_dir.path(), &prompter, false);

        let not_changed = Taxonomy::new(temp_dir.path()).not_changed();
        assert_eq!(report.not_changed, 2);
        assert!(not_changed.join("orphan.mp4").exists());
        assert!(not_changed.join("zzzz.srt").exists());
    }

    #[test]
    fn test_exact_matches_skip_fuzzy_stage() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "scene.mp4");
        touch(temp_dir.path(), "Scene.funscript");
        let prompter = ScriptedPrompter::new(&[]);

        let report = run(temp_dir.path(), &prompter, false);

        let same = Taxonomy::new(temp_dir.path()).already_same_name();
        assert_eq!(report.exact_groups, 1);
        assert_eq!(report.changed_groups, 0);
        assert!(same.join("scene.mp4").exists());
        assert!(prompter.notified.borrow().is_empty());
    }

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "Clip_1080p.mp4");
        touch(temp_dir.path(), "clip.funscript");
        touch(temp_dir.path(), "orphan.mkv");
        let prompter = ScriptedPrompter::new(&[true]);

        let report = run(temp_dir.path(), &prompter, true);

        assert_eq!(report.changed_groups, 1);
        assert_eq!(report.not_changed, 1);
        assert!(temp_dir.path().join("Clip_1080p.mp4").exists());
        assert!(temp_dir.path().join("orphan.mkv").exists());
        assert!(!Taxonomy::new(temp_dir.path()).root().exists());
    }

    #[test]
    fn test_interrupt_stops_before_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "orphan.mp4");
        let config = Config::new().unwrap();
        let taxonomy = Taxonomy::new(temp_dir.path());
        let vocabulary = Vocabulary::default();
        let prompter = ScriptedPrompter::new(&[]);
        let reconciler = Reconciler::new(
            &config.file_type_table,
            &taxonomy,
            &vocabulary,
            &prompter,
            Arc::new(AtomicBool::new(true)),
        );

        let report = reconciler.reconcile_directory(
            temp_dir.path(),
            false,
            false,
            &mut FileMover::new(false),
        );

        assert!(report.interrupted);
        assert!(temp_dir.path().join("orphan.mp4").exists());
    }
}
