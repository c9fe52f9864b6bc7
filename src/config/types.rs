use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const MAX_RECENT_PATHS: usize = 10;

/// 預設的參考詞彙清單（位於工作目錄）
pub const DEFAULT_WORD_LISTS: [&str; 3] = ["names_1.txt", "names_2.txt", "names_3.txt"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
    #[serde(rename = "SCRIPT_FILE")]
    pub script_file: Vec<String>,
    #[serde(rename = "MULTI_AXIS_SCRIPT_FILE")]
    pub multi_axis_script_file: Vec<String>,
    #[serde(rename = "SUBTITLE_FILE")]
    pub subtitle_file: Vec<String>,
    #[serde(rename = "ARCHIVE_FILE")]
    pub archive_file: Vec<String>,
}

/// 檔案種類
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileKind {
    Video,
    Script,
    /// 多軸腳本，附帶軸向名稱（例如 roll、pitch）
    MultiAxisScript(String),
    Subtitle,
    Archive,
}

impl FileKind {
    #[must_use]
    pub const fn is_companion(&self) -> bool {
        matches!(
            self,
            Self::Script | Self::MultiAxisScript(_) | Self::Subtitle
        )
    }

    #[must_use]
    pub fn axis(&self) -> Option<&str> {
        match self {
            Self::MultiAxisScript(axis) => Some(axis),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }

    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::EnUs => "English",
            Self::ZhTw => "繁體中文",
        }
    }

    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::EnUs, Self::ZhTw]
    }
}

/// 每次執行前詢問的開關預設值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDefaults {
    pub recursive: bool,
    pub extract_archives: bool,
    pub tag_with_resolution: bool,
    pub dry_run: bool,
    pub verbose_exact_matches: bool,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            recursive: true,
            extract_archives: true,
            tag_with_resolution: false,
            dry_run: false,
            verbose_exact_matches: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub recent_paths: Vec<String>,
    /// 用來擴充流行詞彙的參考清單
    pub word_lists: Vec<PathBuf>,
    pub session_defaults: SessionDefaults,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            recent_paths: Vec::new(),
            word_lists: DEFAULT_WORD_LISTS.iter().map(PathBuf::from).collect(),
            session_defaults: SessionDefaults::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}
