pub mod file_type;
pub mod load;
pub mod save;
pub mod types;

pub use file_type::Classification;
pub use types::{
    Config, DEFAULT_WORD_LISTS, FileKind, FileTypeTable, Language, MAX_RECENT_PATHS,
    SessionDefaults, UserSettings,
};
