//! 模糊比對
//!
//! 對每個剩餘影片，在尚未被認領的伴隨檔名稱中找出最相似的前三名（分數 ≥ 45），
//! 並組成一組伴隨檔。同一個伴隨檔在一次處理中只會被認領一次。

use super::exact_matcher::ResidualPools;
use crate::tools::FileRecord;
use rapidfuzz::distance::indel;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

pub const FUZZ_THRESHOLD: f64 = 45.0;
pub const MAX_CANDIDATES: usize = 3;

/// 候選名稱與相似度分數
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredName {
    pub name: String,
    pub score: f64,
}

/// 兩個名稱的相似度，範圍 0 到 100（不分大小寫的 Indel 比例）
#[must_use]
pub fn similarity_score(first: &str, second: &str) -> f64 {
    let first = first.to_lowercase();
    let second = second.to_lowercase();
    indel::normalized_similarity(first.chars(), second.chars()) * 100.0
}

/// 取得分數最高的前幾個候選名稱
///
/// 同分時維持候選名稱的原始（已排序）順序。
#[must_use]
pub fn top_candidates(target: &str, candidates: &[String]) -> Vec<ScoredName> {
    let mut scored: Vec<ScoredName> = candidates
        .iter()
        .map(|name| ScoredName {
            name: name.clone(),
            score: similarity_score(target, name),
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(MAX_CANDIDATES);
    scored.retain(|candidate| candidate.score >= FUZZ_THRESHOLD);
    scored
}

/// 一個影片與其配對到的伴隨檔
#[derive(Debug, Clone)]
pub struct CompanionGroup {
    pub video: FileRecord,
    /// 分數最高的一般腳本
    pub script: Option<FileRecord>,
    /// 依軸名稱排序的多軸腳本
    pub axis_scripts: Vec<FileRecord>,
    pub subtitles: Vec<FileRecord>,
    pub matches: Vec<ScoredName>,
}

impl CompanionGroup {
    #[must_use]
    pub fn has_companions(&self) -> bool {
        self.script.is_some() || !self.axis_scripts.is_empty() || !self.subtitles.is_empty()
    }

    /// 影片在前，依腳本、多軸腳本、字幕的順序
    pub fn members(&self) -> impl Iterator<Item = &FileRecord> {
        std::iter::once(&self.video)
            .chain(self.script.iter())
            .chain(&self.axis_scripts)
            .chain(&self.subtitles)
    }

    pub fn companions(&self) -> impl Iterator<Item = &FileRecord> {
        self.members().skip(1)
    }

    /// 與影片名稱競爭的伴隨檔：一般腳本優先，其次為第一個軸（依軸名稱排序），最後是第一個字幕
    #[must_use]
    pub fn arbitration_partner(&self) -> Option<&FileRecord> {
        self.script
            .as_ref()
            .or_else(|| self.axis_scripts.first())
            .or_else(|| self.subtitles.first())
    }
}

/// 尚未被認領的伴隨檔
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    scripts: Vec<FileRecord>,
    axis_scripts: Vec<FileRecord>,
    subtitles: Vec<FileRecord>,
}

impl CandidatePool {
    #[must_use]
    pub fn from_residual(residual: &ResidualPools) -> Self {
        Self {
            scripts: residual.scripts.clone(),
            axis_scripts: residual.multi_axis_scripts.clone(),
            subtitles: residual.subtitles.clone(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty() && self.axis_scripts.is_empty() && self.subtitles.is_empty()
    }

    /// 去除重複並排序的候選基本檔名（多軸腳本以共同的基本檔名參與）
    #[must_use]
    pub fn candidate_names(&self) -> Vec<String> {
        self.remaining()
            .map(|record| record.stem.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn remaining(&self) -> impl Iterator<Item = &FileRecord> {
        self.scripts
            .iter()
            .chain(&self.axis_scripts)
            .chain(&self.subtitles)
    }

    /// 為影片尋找伴隨檔，找不到時回傳 `None`
    #[must_use]
    pub fn match_video(&self, video: &FileRecord) -> Option<CompanionGroup> {
        let matches = top_candidates(&video.stem, &self.candidate_names());
        if matches.is_empty() {
            return None;
        }

        let script = matches.iter().find_map(|candidate| {
            self.scripts
                .iter()
                .find(|record| record.stem == candidate.name)
                .cloned()
        });

        let matched_names: HashSet<&str> = matches.iter().map(|m| m.name.as_str()).collect();
        let mut seen: HashSet<&PathBuf> = HashSet::new();

        let mut axis_scripts: Vec<FileRecord> = self
            .axis_scripts
            .iter()
            .filter(|record| matched_names.contains(record.stem.as_str()))
            .filter(|record| seen.insert(&record.path))
            .cloned()
            .collect();
        axis_scripts.sort_by(|a, b| {
            a.kind
                .axis()
                .cmp(&b.kind.axis())
                .then_with(|| a.path.cmp(&b.path))
        });

        let subtitles: Vec<FileRecord> = self
            .subtitles
            .iter()
            .filter(|record| matched_names.contains(record.stem.as_str()))
            .filter(|record| seen.insert(&record.path))
            .cloned()
            .collect();

        let group = CompanionGroup {
            video: video.clone(),
            script,
            axis_scripts,
            subtitles,
            matches,
        };

        group.has_companions().then_some(group)
    }

    /// 將群組中的伴隨檔移出候選池
    pub fn claim(&mut self, group: &CompanionGroup) {
        let claimed: HashSet<&PathBuf> = group.companions().map(|r| &r.path).collect();
        for pool in [
            &mut self.scripts,
            &mut self.axis_scripts,
            &mut self.subtitles,
        ] {
            pool.retain(|record| !claimed.contains(&record.path));
        }
    }
}
