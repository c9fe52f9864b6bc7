use indicatif::{ProgressBar, ProgressStyle};

/// 建立統一樣式的進度條
#[must_use]
pub fn styled_progress_bar(len: u64, message: impl Into<String>) -> ProgressBar {
    let progress_bar = ProgressBar::new(len);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    progress_bar.set_message(message.into());
    progress_bar
}
