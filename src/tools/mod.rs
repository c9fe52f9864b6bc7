mod ffprobe_info;
mod file_mover;
mod media_scanner;
mod path_validator;
mod progress;
mod prompter;
pub mod taxonomy;

pub use ffprobe_info::{
    FfprobeResolution, ResolutionProbe, UNKNOWN_RESOLUTION, VideoResolution, get_video_resolution,
};
pub use file_mover::{FileMover, MoveOutcome, MovePlan, MoveTransaction, TransactionReport};
pub use media_scanner::{FileRecord, MediaInventory, scan_media_files, sort_records};
pub use path_validator::{ensure_directory_exists, validate_directory_exists};
pub use progress::styled_progress_bar;
pub use prompter::{DialoguerPrompter, PasswordReply, Prompter, SKIP_KEYWORD};
pub use taxonomy::Taxonomy;
