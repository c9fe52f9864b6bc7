//! 輸出分類資料夾
//!
//! 目標目錄下固定的 `FunForge/{Already-Same-Name,Changed,Not-Changed}` 結構

use crate::tools::ensure_directory_exists;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub const TAXONOMY_DIR_NAME: &str = "FunForge";
pub const ALREADY_SAME_NAME_DIR: &str = "Already-Same-Name";
pub const CHANGED_DIR: &str = "Changed";
pub const NOT_CHANGED_DIR: &str = "Not-Changed";

#[derive(Debug, Clone)]
pub struct Taxonomy {
    root: PathBuf,
}

impl Taxonomy {
    #[must_use]
    pub fn new(target_directory: &Path) -> Self {
        Self {
            root: target_directory.join(TAXONOMY_DIR_NAME),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn already_same_name(&self) -> PathBuf {
        self.root.join(ALREADY_SAME_NAME_DIR)
    }

    #[must_use]
    pub fn changed(&self) -> PathBuf {
        self.root.join(CHANGED_DIR)
    }

    #[must_use]
    pub fn not_changed(&self) -> PathBuf {
        self.root.join(NOT_CHANGED_DIR)
    }

    /// 建立三個輸出資料夾（已存在則略過）
    pub fn ensure(&self) -> Result<()> {
        ensure_directory_exists(&self.already_same_name())?;
        ensure_directory_exists(&self.changed())?;
        ensure_directory_exists(&self.not_changed())?;
        Ok(())
    }
}
