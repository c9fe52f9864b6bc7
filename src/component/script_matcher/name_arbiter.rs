//! 名稱仲裁
//!
//! 在影片名稱與伴隨檔名稱之間選出較具描述性的一個。
//! 判斷順序固定：腳本標記 → 流行詞彙數 → 字串長度。

use super::vocabulary::Vocabulary;
use rust_i18n::t;

/// 會被移除的解析度標記
pub const RESOLUTION_TAGS: [&str; 6] = ["720p", "1080p", "4k", "2160p", "1920x1080", "3840x2160"];

/// 腳本／PMV 標記
pub const PMV_MARKER: &str = "[PMV]";
pub const SCRIPT_MARKER: &str = "funscript";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// 只有一方帶有腳本標記
    ScriptMarker,
    /// 流行詞彙較多
    MoreBuzzwords { winner: usize, loser: usize },
    /// 詞彙數相同，較長者勝出
    Longer,
}

impl DecisionReason {
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::ScriptMarker => t!("arbiter.script_marker").to_string(),
            Self::MoreBuzzwords { winner, loser } => {
                t!("arbiter.more_buzzwords", winner = winner, loser = loser).to_string()
            }
            Self::Longer => t!("arbiter.longer").to_string(),
        }
    }
}

/// 仲裁結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameDecision {
    pub name: String,
    /// 勝出的是否為第二個參數
    pub second_won: bool,
    pub reason: DecisionReason,
    pub rationale: Vec<String>,
}

impl NameDecision {
    fn new(name: &str, second_won: bool, reason: DecisionReason) -> Self {
        Self {
            name: name.to_string(),
            second_won,
            reason,
            rationale: vec![reason.description()],
        }
    }
}

/// 名稱是否帶有 `[PMV]` 或 `funscript`（不分大小寫）標記
#[must_use]
pub fn has_script_marker(name: &str) -> bool {
    name.contains(PMV_MARKER) || name.to_lowercase().contains(SCRIPT_MARKER)
}

/// 選出較具描述性的名稱，平手時回傳第二個
#[must_use]
pub fn choose_better_name(
    first: &str,
    second: &str,
    prefer_companion: bool,
    vocabulary: &Vocabulary,
) -> NameDecision {
    if prefer_companion {
        match (has_script_marker(first), has_script_marker(second)) {
            (false, true) => return NameDecision::new(second, true, DecisionReason::ScriptMarker),
            (true, false) => return NameDecision::new(first, false, DecisionReason::ScriptMarker),
            _ => {}
        }
    }

    let first_hits = vocabulary.count_hits(first);
    let second_hits = vocabulary.count_hits(second);

    if first_hits > second_hits {
        return NameDecision::new(
            first,
            false,
            DecisionReason::MoreBuzzwords {
                winner: first_hits,
                loser: second_hits,
            },
        );
    }
    if second_hits > first_hits {
        return NameDecision::new(
            second,
            true,
            DecisionReason::MoreBuzzwords {
                winner: second_hits,
                loser: first_hits,
            },
        );
    }

    if first.chars().count() > second.chars().count() {
        NameDecision::new(first, false, DecisionReason::Longer)
    } else {
        NameDecision::new(second, true, DecisionReason::Longer)
    }
}

/// 移除解析度標記（連同相鄰的底線）
#[must_use]
pub fn strip_resolution_tags(name: &str) -> String {
    let mut result = name.to_string();
    for tag in RESOLUTION_TAGS {
        result = result
            .replace(&format!("_{tag}"), "")
            .replace(&format!("{tag}_"), "")
            .replace(tag, "");
    }
    result
}

/// 在名稱後加上 `_WxH` 解析度標記
#[must_use]
pub fn append_resolution_tag(name: &str, resolution: &str) -> String {
    format!("{name}_{resolution}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> Vocabulary {
        Vocabulary::default()
    }

    #[test]
    fn test_marker_wins_when_preferring_companion() {
        let decision =
            choose_better_name("movie_1080p.mp4", "movie.funscript", true, &vocabulary());
        assert_eq!(decision.name, "movie.funscript");
        assert!(decision.second_won);
        assert_eq!(decision.reason, DecisionReason::ScriptMarker);
    }

    #[test]
    fn test_marker_ignored_without_preference() {
        let decision =
            choose_better_name("movie_1080p.mp4", "movie.funscript", false, &vocabulary());
        assert_eq!(decision.name, "movie_1080p.mp4");
        assert!(matches!(
            decision.reason,
            DecisionReason::MoreBuzzwords { winner: 1, loser: 0 }
        ));
    }

    #[test]
    fn test_pmv_marker_is_case_sensitive() {
        assert!(has_script_marker("Song [PMV]"));
        assert!(!has_script_marker("Song [pmv]"));
        assert!(has_script_marker("clip FunScript edition"));
    }

    #[test]
    fn test_both_marked_falls_through_to_buzzwords() {
        let decision = choose_better_name("[PMV] a HD", "[PMV] a long name", true, &vocabulary());
        assert_eq!(decision.name, "[PMV] a HD");
    }

    #[test]
    fn test_more_buzzwords_wins() {
        let decision = choose_better_name("Movie Extended 1080p", "Movie", false, &vocabulary());
        assert_eq!(decision.name, "Movie Extended 1080p");
        assert!(!decision.second_won);
        assert_eq!(decision.rationale.len(), 1);
    }

    #[test]
    fn test_longer_wins_on_equal_buzzwords() {
        let decision = choose_better_name("abc", "abcdef", false, &vocabulary());
        assert_eq!(decision.name, "abcdef");
        assert_eq!(decision.reason, DecisionReason::Longer);
    }

    #[test]
    fn test_equal_length_resolves_to_second() {
        let decision = choose_better_name("abc", "xyz", true, &vocabulary());
        assert_eq!(decision.name, "xyz");
        assert!(decision.second_won);
    }

    #[test]
    fn test_deterministic() {
        let a = choose_better_name("Clip", "clip extended", true, &vocabulary());
        let b = choose_better_name("Clip", "clip extended", true, &vocabulary());
        assert_eq!(a, b);
    }

    #[test]
    fn test_strip_resolution_tags() {
        assert_eq!(strip_resolution_tags("Show_1080p_Extended"), "Show_Extended");
        assert_eq!(strip_resolution_tags("Clip_1080p"), "Clip");
        assert_eq!(strip_resolution_tags("4k_Movie"), "Movie");
        assert_eq!(strip_resolution_tags("Movie 3840x2160"), "Movie ");
    }

    #[test]
    fn test_strip_resolution_tags_noop() {
        assert_eq!(strip_resolution_tags("Plain Name"), "Plain Name");
    }

    #[test]
    fn test_append_resolution_tag() {
        assert_eq!(append_resolution_tag("Clip", "1920x1080"), "Clip_1920x1080");
    }
}
