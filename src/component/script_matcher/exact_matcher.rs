//! 同名檔案處理
//!
//! 影片與伴隨檔的基本檔名（不分大小寫）完全相同時，整組直接移到 `Already-Same-Name`，
//! 不進入模糊比對。安靜模式與詳細模式的分組結果完全相同，差別只在顯示。

use crate::config::FileKind;
use crate::tools::{
    FileMover, FileRecord, MediaInventory, MoveOutcome, MoveTransaction, styled_progress_bar,
};
use console::style;
use log::{debug, info};
use rust_i18n::t;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 一組同名檔案，影片排在最前面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactGroup {
    pub key: String,
    pub members: Vec<FileRecord>,
}

/// 尚未被任何同名組認領的檔案
#[derive(Debug, Clone, Default)]
pub struct ResidualPools {
    pub videos: Vec<FileRecord>,
    pub scripts: Vec<FileRecord>,
    pub multi_axis_scripts: Vec<FileRecord>,
    pub subtitles: Vec<FileRecord>,
}

impl ResidualPools {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty() && self.companion_count() == 0
    }

    #[must_use]
    pub fn companion_count(&self) -> usize {
        self.scripts.len() + self.multi_axis_scripts.len() + self.subtitles.len()
    }

    pub fn companions(&self) -> impl Iterator<Item = &FileRecord> {
        self.scripts
            .iter()
            .chain(&self.multi_axis_scripts)
            .chain(&self.subtitles)
    }

    /// 移除已被搬移或已不存在的檔案
    fn retain_available(&mut self, mover: &FileMover) {
        for pool in [
            &mut self.videos,
            &mut self.scripts,
            &mut self.multi_axis_scripts,
            &mut self.subtitles,
        ] {
            pool.retain(|record| mover.is_available(&record.path));
        }
    }
}

/// 同名處理結果
#[derive(Debug, Clone, Default)]
pub struct ExactResolution {
    pub groups: Vec<ExactGroup>,
    pub moved: usize,
    pub collisions: usize,
    pub errors: usize,
    pub residual: ResidualPools,
}

/// 找出同名組（純計算，不碰檔案系統）
///
/// 以影片為錨點：同一個小寫 stem 至少要有一個影片與一個伴隨檔才成組。
#[must_use]
pub fn find_exact_matches(inventory: &MediaInventory) -> (Vec<ExactGroup>, ResidualPools) {
    let mut buckets: BTreeMap<String, Vec<FileRecord>> = BTreeMap::new();
    for record in inventory
        .videos
        .iter()
        .chain(&inventory.scripts)
        .chain(&inventory.multi_axis_scripts)
        .chain(&inventory.subtitles)
    {
        buckets
            .entry(record.stem_key())
            .or_default()
            .push(record.clone());
    }

    let mut groups = Vec::new();
    let mut residual = ResidualPools::default();

    for (key, members) in buckets {
        let has_video = members.iter().any(|r| !r.kind.is_companion());
        let has_companion = members.iter().any(|r| r.kind.is_companion());

        if has_video && has_companion {
            groups.push(ExactGroup { key, members });
            continue;
        }

        for record in members {
            match record.kind {
                FileKind::Video => residual.videos.push(record),
                FileKind::Script => residual.scripts.push(record),
                FileKind::MultiAxisScript(_) => {
                    residual.multi_axis_scripts.push(record);
                }
                FileKind::Subtitle => residual.subtitles.push(record),
                FileKind::Archive => {}
            }
        }
    }

    (groups, residual)
}

/// 同名檔案搬移器
pub struct ExactMatchResolver {
    destination: PathBuf,
    verbose: bool,
}

impl ExactMatchResolver {
    pub fn new(destination: impl Into<PathBuf>, verbose: bool) -> Self {
        Self {
            destination: destination.into(),
            verbose,
        }
    }

    /// 安靜模式，用於壓縮檔解壓後的處理
    pub fn silent(destination: impl Into<PathBuf>) -> Self {
        Self::new(destination, false)
    }

    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// 搬移所有同名組，回傳剩餘檔案
    pub fn resolve(&self, inventory: &MediaInventory, mover: &mut FileMover) -> ExactResolution {
        let (groups, residual) = find_exact_matches(inventory);
        let mut resolution = ExactResolution {
            residual,
            ..ExactResolution::default()
        };

        if groups.is_empty() {
            resolution.residual.retain_available(mover);
            return resolution;
        }

        let progress_bar = self
            .verbose
            .then(|| styled_progress_bar(groups.len() as u64, t!("exact.moving")));

        for group in &groups {
            if let Some(pb) = &progress_bar {
                let names: Vec<String> = group.members.iter().map(FileRecord::file_name).collect();
                pb.set_message(names.join(" + "));
            }

            let transaction = self.plan(group);
            let report = mover.apply(&transaction);
            for (plan, outcome) in &report.outcomes {
                match outcome {
                    MoveOutcome::Moved | MoveOutcome::Planned => resolution.moved += 1,
                    MoveOutcome::Collision => resolution.collisions += 1,
                    MoveOutcome::Failed(_) => resolution.errors += 1,
                    MoveOutcome::Missing | MoveOutcome::AlreadyMoved => {
                        debug!("同名組成員已不存在: {}", plan.source.display());
                    }
                }
            }

            if let Some(pb) = &progress_bar {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_and_clear();
            let count = groups.len();
            let message = if mover.is_dry_run() {
                t!("exact.dry_run_summary", count = count)
            } else {
                t!("exact.summary", count = count)
            };
            println!("{}", style(message).green());
        }

        info!(
            "同名組 {} 組 - 移動: {}, 碰撞: {}, 失敗: {}",
            groups.len(),
            resolution.moved,
            resolution.collisions,
            resolution.errors
        );

        resolution.groups = groups;
        resolution.residual.retain_available(mover);
        resolution
    }

    fn plan(&self, group: &ExactGroup) -> MoveTransaction {
        let mut transaction = MoveTransaction::new();
        for record in &group.members {
            transaction.push(&record.path, self.destination.join(record.file_name()));
        }
        transaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tools::scan_media_files;
    use std::fs;
    use tempfile::TempDir;

    fn scan(dir: &Path) -> MediaInventory {
        let config = Config::new().unwrap();
        scan_media_files(dir, &config.file_type_table, false)
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), name).unwrap();
    }

    #[test]
    fn test_find_exact_matches_case_insensitive() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "Movie.mp4");
        touch(temp_dir.path(), "movie.funscript");
        touch(temp_dir.path(), "movie.roll.funscript");
        touch(temp_dir.path(), "other.mp4");
        touch(temp_dir.path(), "another.srt");

        let (groups, residual) = find_exact_matches(&scan(temp_dir.path()));

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key, "movie");
        assert_eq!(groups[0].members.len(), 3);
        assert_eq!(residual.videos.len(), 1);
        assert_eq!(residual.subtitles.len(), 1);
        assert!(residual.scripts.is_empty());
    }

    #[test]
    fn test_video_only_or_companion_only_is_not_a_group() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a.mp4");
        touch(temp_dir.path(), "a.mkv");
        touch(temp_dir.path(), "b.funscript");
        touch(temp_dir.path(), "b.srt");

        let (groups, residual) = find_exact_matches(&scan(temp_dir.path()));

        assert!(groups.is_empty());
        assert_eq!(residual.videos.len(), 2);
        assert_eq!(residual.companion_count(), 2);
    }

    #[test]
    fn test_resolve_moves_groups_and_returns_residual() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("FunForge").join("Already-Same-Name");
        touch(temp_dir.path(), "x.mp4");
        touch(temp_dir.path(), "x.funscript");
        touch(temp_dir.path(), "y.mp4");

        let mut mover = FileMover::new(false);
        let resolution =
            ExactMatchResolver::silent(&destination).resolve(&scan(temp_dir.path()), &mut mover);

        assert_eq!(resolution.groups.len(), 1);
        assert_eq!(resolution.moved, 2);
        assert!(destination.join("x.mp4").exists());
        assert!(destination.join("x.funscript").exists());
        assert_eq!(resolution.residual.videos.len(), 1);
        assert!(temp_dir.path().join("y.mp4").exists());
    }

    #[test]
    fn test_resolve_reports_collision_without_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let destination = temp_dir.path().join("dest");
        fs::create_dir_all(&destination).unwrap();
        fs::write(destination.join("x.mp4"), "existing").unwrap();
        touch(temp_dir.path(), "x.mp4");
        touch(temp_dir.path(), "x.funscript");

        let mut mover = FileMover::new(false);
        let resolution =
            ExactMatchResolver::silent(&destination).resolve(&scan(temp_dir.path()), &mut mover);

        assert_eq!(resolution.collisions, 1);
        assert_eq!(resolution.moved, 1);
        assert_eq!(fs::read_to_string(destination.join("x.mp4")).unwrap(), "existing");
        // 碰撞的影片仍留在原處，成為剩餘檔案
        assert_eq!(resolution.residual.videos.len(), 1);
    }

    #[test]
    fn test_silent_and_verbose_group_identically() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "x.mp4");
        touch(temp_dir.path(), "x.funscript");
        touch(temp_dir.path(), "y.mkv");
        touch(temp_dir.path(), "Y.srt");
        let inventory = scan(temp_dir.path());

        let mut silent_mover = FileMover::new(true);
        let mut verbose_mover = FileMover::new(true);
        let silent = ExactMatchResolver::new(temp_dir.path().join("a"), false)
            .resolve(&inventory, &mut silent_mover);
        let verbose = ExactMatchResolver::new(temp_dir.path().join("a"), true)
            .resolve(&inventory, &mut verbose_mover);

        assert_eq!(silent.groups, verbose.groups);
        assert_eq!(silent.moved, verbose.moved);
        // 試執行不碰檔案系統
        assert!(temp_dir.path().join("x.mp4").exists());
    }
}
