//! 重新命名提案
//!
//! 計算整組檔案的新名稱與搬移計畫，不碰檔案系統；是否執行由呼叫端決定。

use super::fuzzy_matcher::CompanionGroup;
use super::name_arbiter::{
    NameDecision, append_resolution_tag, choose_better_name, strip_resolution_tags,
};
use super::vocabulary::Vocabulary;
use crate::tools::{MoveTransaction, ResolutionProbe, UNKNOWN_RESOLUTION};
use log::debug;
use rust_i18n::t;
use std::fs;
use std::path::{Path, PathBuf};

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// 一組檔案的重新命名提案
#[derive(Debug, Clone)]
pub struct RenameProposal {
    pub group: CompanionGroup,
    pub decision: NameDecision,
    /// 加到名稱後的解析度，未啟用或無法取得時為 `None`
    pub resolution: Option<String>,
    pub transaction: MoveTransaction,
    pub video_size: u64,
}

impl RenameProposal {
    #[must_use]
    pub fn canonical_name(&self) -> &str {
        &self.decision.name
    }

    #[must_use]
    pub fn video_size_mib(&self) -> f64 {
        self.video_size as f64 / BYTES_PER_MIB
    }

    /// 提案說明：影片大小、每個檔案的新舊名稱與仲裁理由
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        let name = self.group.video.file_name();
        let size = format!("{:.2}", self.video_size_mib());
        let mut lines = vec![t!("forge.pair_video", name = name, size = size).to_string()];

        for plan in self.transaction.moves() {
            let old_name = file_name(&plan.source);
            let new_name = file_name(&plan.destination);
            lines.push(format!("  {old_name} → {new_name}"));
        }

        for reason in &self.decision.rationale {
            lines.push(t!("forge.rationale", reason = reason).to_string());
        }

        lines
    }
}

/// 重新命名規劃器
pub struct RenamePlanner<'a> {
    vocabulary: &'a Vocabulary,
    probe: Option<&'a dyn ResolutionProbe>,
    destination: PathBuf,
}

impl<'a> RenamePlanner<'a> {
    pub fn new(vocabulary: &'a Vocabulary, destination: impl Into<PathBuf>) -> Self {
        Self {
            vocabulary,
            probe: None,
            destination: destination.into(),
        }
    }

    /// 啟用解析度標記
    #[must_use]
    pub fn with_resolution_probe(mut self, probe: &'a dyn ResolutionProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    /// 建立提案
    ///
    /// 群組至少要有一個伴隨檔，否則回傳 `None`。
    #[must_use]
    pub fn propose(&self, group: CompanionGroup) -> Option<RenameProposal> {
        let partner = group.arbitration_partner()?;

        let mut video_name = cleaned_name(&group.video.stem);
        let mut partner_name = cleaned_name(&partner.stem);

        let resolution = self
            .probe
            .map(|probe| probe.probe_resolution(&group.video.path))
            .filter(|resolution| resolution != UNKNOWN_RESOLUTION);
        if let Some(resolution) = &resolution {
            video_name = append_resolution_tag(&video_name, resolution);
            partner_name = append_resolution_tag(&partner_name, resolution);
        }

        let decision = choose_better_name(&video_name, &partner_name, true, self.vocabulary);
        debug!(
            "仲裁 {video_name:?} vs {partner_name:?} -> {:?} ({:?})",
            decision.name, decision.reason
        );

        let mut transaction = MoveTransaction::new();
        for record in group.members() {
            transaction.push(
                &record.path,
                self.destination.join(record.renamed(&decision.name)),
            );
        }

        let video_size = fs::metadata(&group.video.path)
            .map(|m| m.len())
            .unwrap_or(0);

        Some(RenameProposal {
            group,
            decision,
            resolution,
            transaction,
            video_size,
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 移除解析度標記，整個名稱都是標記時保留原名，避免產生只有副檔名的隱藏檔
fn cleaned_name(stem: &str) -> String {
    let stripped = strip_resolution_tags(stem);
    if stripped.trim().is_empty() {
        stem.to_string()
    } else {
        stripped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::script_matcher::ScoredName;
    use crate::config::FileKind;
    use crate::tools::FileRecord;

    struct FixedProbe(&'static str);

    impl ResolutionProbe for FixedProbe {
        fn probe_resolution(&self, _path: &Path) -> String {
            self.0.to_string()
        }
    }

    fn record(stem: &str, extension: &str, kind: FileKind) -> FileRecord {
        FileRecord {
            path: PathBuf::from(format!("/media/{stem}{extension}")),
            stem: stem.to_string(),
            extension: extension.to_string(),
            kind,
        }
    }

    fn group() -> CompanionGroup {
        CompanionGroup {
            video: record("Clip_1080p", ".mp4", FileKind::Video),
            script: Some(record("clip", ".funscript", FileKind::Script)),
            axis_scripts: vec![record(
                "clip",
                ".roll.funscript",
                FileKind::MultiAxisScript("roll".to_string()),
            )],
            subtitles: vec![record("clip", ".srt", FileKind::Subtitle)],
            matches: vec![ScoredName {
                name: "clip".to_string(),
                score: 57.14,
            }],
        }
    }

    #[test]
    fn test_propose_renames_every_member() {
        let vocabulary = Vocabulary::default();
        let planner = RenamePlanner::new(&vocabulary, "/out/Changed");

        let proposal = planner.propose(group()).unwrap();

        // "Clip" 與 "clip" 同長度，平手時取伴隨檔名稱
        assert_eq!(proposal.canonical_name(), "clip");
        let destinations: Vec<&Path> = proposal
            .transaction
            .moves()
            .iter()
            .map(|m| m.destination.as_path())
            .collect();
        assert_eq!(
            destinations,
            vec![
                Path::new("/out/Changed/clip.mp4"),
                Path::new("/out/Changed/clip.funscript"),
                Path::new("/out/Changed/clip.roll.funscript"),
                Path::new("/out/Changed/clip.srt"),
            ]
        );
        assert!(proposal.resolution.is_none());
    }

    #[test]
    fn test_propose_appends_resolution() {
        let vocabulary = Vocabulary::default();
        let probe = FixedProbe("1920x1080");
        let planner = RenamePlanner::new(&vocabulary, "/out").with_resolution_probe(&probe);

        let proposal = planner.propose(group()).unwrap();

        assert_eq!(proposal.canonical_name(), "clip_1920x1080");
        assert_eq!(
            proposal.transaction.moves()[0].destination,
            PathBuf::from("/out/clip_1920x1080.mp4")
        );
    }

    #[test]
    fn test_unknown_resolution_is_not_appended() {
        let vocabulary = Vocabulary::default();
        let probe = FixedProbe(UNKNOWN_RESOLUTION);
        let planner = RenamePlanner::new(&vocabulary, "/out").with_resolution_probe(&probe);

        let proposal = planner.propose(group()).unwrap();

        assert_eq!(proposal.canonical_name(), "clip");
        assert!(proposal.resolution.is_none());
    }

    #[test]
    fn test_propose_without_companion() {
        let vocabulary = Vocabulary::default();
        let planner = RenamePlanner::new(&vocabulary, "/out");
        let mut lonely = group();
        lonely.script = None;
        lonely.axis_scripts.clear();
        lonely.subtitles.clear();

        assert!(planner.propose(lonely).is_none());
    }

    #[test]
    fn test_describe_lists_every_move() {
        let vocabulary = Vocabulary::default();
        let planner = RenamePlanner::new(&vocabulary, "/out");
        let proposal = planner.propose(group()).unwrap();

        let lines = proposal.describe();

        assert!(lines.iter().any(|l| l.contains("Clip_1080p.mp4 → clip.mp4")));
        assert!(lines.iter().any(|l| l.contains("clip.roll.funscript → clip.roll.funscript")));
        // 影片、四筆搬移、一行理由
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_resolution_only_names_keep_original_stem() {
        let vocabulary = Vocabulary::default();
        let planner = RenamePlanner::new(&vocabulary, "/out");
        let tag_only = CompanionGroup {
            video: record("720p", ".mp4", FileKind::Video),
            script: Some(record("720p_", ".funscript", FileKind::Script)),
            axis_scripts: Vec::new(),
            subtitles: Vec::new(),
            matches: Vec::new(),
        };

        let proposal = planner.propose(tag_only).unwrap();

        assert_eq!(proposal.canonical_name(), "720p_");
        assert_eq!(
            proposal.transaction.moves()[0].destination,
            PathBuf::from("/out/720p_.mp4")
        );
        assert_eq!(
            proposal.transaction.moves()[1].destination,
            PathBuf::from("/out/720p_.funscript")
        );
    }

    #[test]
    fn test_cleaned_name_falls_back_when_empty() {
        assert_eq!(cleaned_name("1080p"), "1080p");
        assert_eq!(cleaned_name("Clip_1080p"), "Clip");
    }
}
