//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod archive_extractor;
pub mod empty_folder_cleaner;
pub mod forge_session;
pub mod script_matcher;

pub use forge_session::FunForge;
