//! 流行詞彙表
//!
//! 名稱仲裁的平手判斷依據。每次執行開始時由預設詞彙加上參考清單建立，之後不再變動。

use anyhow::{Context, Result};
use log::{info, warn};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BUZZWORDS: [&str; 7] = [
    "extended",
    "hd",
    "1080p",
    "4k",
    "remastered",
    "director's cut",
    "hq",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    words: BTreeSet<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::from_words(DEFAULT_BUZZWORDS)
    }
}

impl Vocabulary {
    /// 以指定詞彙建立（轉為小寫、忽略空白）
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// 預設詞彙加上參考清單中的每個單字
    ///
    /// 無法讀取的清單只記錄警告並略過。
    #[must_use]
    pub fn with_word_lists(mut self, word_lists: &[PathBuf]) -> Self {
        for path in word_lists {
            match read_word_list(path) {
                Ok(words) => {
                    info!("載入參考詞彙 {} 個: {}", words.len(), path.display());
                    self.words.extend(words);
                }
                Err(e) => warn!("無法載入參考詞彙清單: {e:#}"),
            }
        }
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    /// 名稱中出現幾個詞彙（不分大小寫的子字串比對）
    #[must_use]
    pub fn count_hits(&self, name: &str) -> usize {
        let lowered = name.to_lowercase();
        self.words
            .iter()
            .filter(|word| lowered.contains(word.as_str()))
            .count()
    }
}

fn read_word_list(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("無法讀取 {}", path.display()))?;
    Ok(content
        .split_whitespace()
        .map(str::to_lowercase)
        .collect())
}
