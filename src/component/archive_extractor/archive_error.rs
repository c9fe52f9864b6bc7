use std::io;
use thiserror::Error;

/// 壓縮檔處理錯誤，呼叫端需依種類決定下一步（詢問密碼、略過或保留現場）
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("壓縮檔已加密，需要密碼")]
    Encrypted,

    #[error("密碼錯誤")]
    WrongPassword,

    #[error("不支援的壓縮檔: {0}")]
    Unsupported(String),

    #[error("解壓縮 {name} 失敗: {source}")]
    Member {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("7z 執行失敗: {message}")]
    Tool { message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ArchiveError {
    /// 需要（重新）輸入密碼
    #[must_use]
    pub const fn needs_password(&self) -> bool {
        matches!(self, Self::Encrypted | Self::WrongPassword)
    }
}
