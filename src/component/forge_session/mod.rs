//! 整理流程元件
//!
//! 把壓縮檔處理、配對與空資料夾清理串成一次完整的執行

mod main;
mod session;

pub use main::FunForge;
pub use session::{ForgeSession, SessionOptions, SessionReport};
