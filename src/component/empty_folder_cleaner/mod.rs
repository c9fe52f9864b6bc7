//! 空資料夾清理元件
//!
//! 處理完成後移除留下的空資料夾，輸出分類資料夾除外

mod folder_reaper;

pub use folder_reaper::{FolderReaper, ReapOutcome, ReapResult};
