//! 壓縮檔解壓縮元件
//!
//! 偵測 ZIP/RAR 壓縮檔，解壓縮（必要時詢問密碼）後把內容交給配對流程

mod archive_error;
mod archive_pipeline;
mod archive_reader;
mod rar_extractor;
mod zip_extractor;

pub use archive_error::ArchiveError;
pub use archive_pipeline::{
    ArchiveBatchReport, ArchiveJob, ArchiveOutcome, ArchivePipeline, ArchiveState,
    MAX_PASSWORD_ATTEMPTS, unique_extraction_dir,
};
pub use archive_reader::{
    ArchiveEntry, ArchiveFormat, ArchiveListing, ExtractSummary, enclosed_path, extract_archive,
    inspect_archive,
};
pub use rar_extractor::parse_slt_listing;
pub use zip_extractor::{CHUNK_SIZE, EXTRACT_WORKERS, WRITE_BUFFER_SIZE};
