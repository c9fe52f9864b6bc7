//! 影片與腳本配對
//!
//! 同名處理、模糊比對、名稱仲裁與重新命名提案

mod exact_matcher;
mod fuzzy_matcher;
mod name_arbiter;
mod reconciler;
mod rename_planner;
mod vocabulary;

pub use exact_matcher::{
    ExactGroup, ExactMatchResolver, ExactResolution, ResidualPools, find_exact_matches,
};
pub use fuzzy_matcher::{
    CandidatePool, CompanionGroup, FUZZ_THRESHOLD, MAX_CANDIDATES, ScoredName, similarity_score,
    top_candidates,
};
pub use name_arbiter::{
    DecisionReason, NameDecision, RESOLUTION_TAGS, append_resolution_tag, choose_better_name,
    has_script_marker, strip_resolution_tags,
};
pub use reconciler::{ForgeReport, Reconciler};
pub use rename_planner::{RenamePlanner, RenameProposal};
pub use vocabulary::{DEFAULT_BUZZWORDS, Vocabulary};
