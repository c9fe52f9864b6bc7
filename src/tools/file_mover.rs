//! 檔案搬移交易管理
//!
//! 一組配對（來源、目的地）視為一筆交易：
//! - 所有來源都不存在時整筆交易不執行
//! - 否則逐筆獨立搬移，單筆失敗只回報，不中斷其餘配對（非原子性，重新執行即可補齊）
//! - 目的地已存在時一律跳過，不覆寫

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 單筆搬移計畫
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// 一組依序執行的搬移計畫
#[derive(Debug, Clone, Default)]
pub struct MoveTransaction {
    moves: Vec<MovePlan>,
}

impl MoveTransaction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) {
        self.moves.push(MovePlan {
            source: source.into(),
            destination: destination.into(),
        });
    }

    #[must_use]
    pub fn moves(&self) -> &[MovePlan] {
        &self.moves
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// 單筆搬移結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// 試執行模式，只記錄計畫
    Planned,
    /// 目的地已存在
    Collision,
    /// 來源已不存在
    Missing,
    /// 來源已在本次執行中被搬移過
    AlreadyMoved,
    Failed(String),
}

impl MoveOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Moved | Self::Planned)
    }
}

/// 交易執行結果
#[derive(Debug, Clone, Default)]
pub struct TransactionReport {
    /// 是否至少有一個來源存在而開始執行
    pub started: bool,
    pub outcomes: Vec<(MovePlan, MoveOutcome)>,
}

impl TransactionReport {
    fn count(&self, predicate: impl Fn(&MoveOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }

    #[must_use]
    pub fn moved(&self) -> usize {
        self.count(MoveOutcome::is_success)
    }

    #[must_use]
    pub fn collisions(&self) -> usize {
        self.count(|o| *o == MoveOutcome::Collision)
    }

    #[must_use]
    pub fn missing(&self) -> usize {
        self.count(|o| matches!(o, MoveOutcome::Missing | MoveOutcome::AlreadyMoved))
    }

    #[must_use]
    pub fn errors(&self) -> usize {
        self.count(|o| matches!(o, MoveOutcome::Failed(_)))
    }

    /// 每一筆配對都成功
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.started && self.outcomes.iter().all(|(_, o)| o.is_success())
    }
}

/// 檔案搬移器，記錄本次執行已搬移過的來源以避免重複處理
#[derive(Debug, Default)]
pub struct FileMover {
    dry_run: bool,
    moved_sources: HashSet<PathBuf>,
    /// 試執行時預約的目的地，用來模擬碰撞
    planned_destinations: HashSet<PathBuf>,
    /// 試執行的搬移計畫，依發生順序
    planned: Vec<MovePlan>,
}

impl FileMover {
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// 試執行模式下記錄的所有搬移
    #[must_use]
    pub fn planned_moves(&self) -> &[MovePlan] {
        &self.planned
    }

    #[must_use]
    pub fn has_moved(&self, source: &Path) -> bool {
        self.moved_sources.contains(source)
    }

    /// 來源仍可處理：存在且尚未被搬移
    #[must_use]
    pub fn is_available(&self, source: &Path) -> bool {
        source.exists() && !self.has_moved(source)
    }

    /// 執行一筆交易
    pub fn apply(&mut self, transaction: &MoveTransaction) -> TransactionReport {
        let mut report = TransactionReport::default();

        if !transaction.moves().iter().any(|m| self.is_available(&m.source)) {
            warn!("交易中所有來源皆已不存在，略過 {} 筆搬移", transaction.len());
            report.outcomes = transaction
                .moves()
                .iter()
                .map(|m| {
                    let outcome = if self.has_moved(&m.source) {
                        MoveOutcome::AlreadyMoved
                    } else {
                        MoveOutcome::Missing
                    };
                    (m.clone(), outcome)
                })
                .collect();
            return report;
        }

        report.started = true;
        for plan in transaction.moves() {
            let outcome = self.move_one(plan);
            report.outcomes.push((plan.clone(), outcome));
        }

        report
    }

    /// 搬移單一檔案
    pub fn move_one(&mut self, plan: &MovePlan) -> MoveOutcome {
        if self.has_moved(&plan.source) {
            debug!("已搬移過，略過: {}", plan.source.display());
            return MoveOutcome::AlreadyMoved;
        }

        if !plan.source.exists() {
            warn!("來源已不存在: {}", plan.source.display());
            return MoveOutcome::Missing;
        }

        if plan.destination.exists() || self.planned_destinations.contains(&plan.destination) {
            warn!("目的地已存在，略過: {}", plan.destination.display());
            return MoveOutcome::Collision;
        }

        if self.dry_run {
            info!(
                "[DRY RUN] {} -> {}",
                plan.source.display(),
                plan.destination.display()
            );
            self.moved_sources.insert(plan.source.clone());
            self.planned_destinations.insert(plan.destination.clone());
            self.planned.push(plan.clone());
            return MoveOutcome::Planned;
        }

        match rename_or_copy(&plan.source, &plan.destination) {
            Ok(()) => {
                debug!(
                    "移動檔案: {} -> {}",
                    plan.source.display(),
                    plan.destination.display()
                );
                self.moved_sources.insert(plan.source.clone());
                MoveOutcome::Moved
            }
            Err(e) => {
                warn!("移動檔案失敗 {}: {e:#}", plan.source.display());
                MoveOutcome::Failed(format!("{e:#}"))
            }
        }
    }
}

fn rename_or_copy(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("無法建立資料夾: {}", parent.display()))?;
    }

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        // 可能是跨檔案系統，改為複製後刪除
        Err(rename_err) => copy_and_delete(source, destination)
            .with_context(|| format!("rename 失敗: {rename_err}")),
    }
}

/// 複製檔案後刪除原檔案
fn copy_and_delete(source: &Path, target: &Path) -> Result<()> {
    fs::copy(source, target).with_context(|| {
        format!("複製檔案失敗: {} -> {}", source.display(), target.display())
    })?;

    fs::remove_file(source).with_context(|| format!("刪除原檔案失敗: {}", source.display()))?;

    Ok(())
}
