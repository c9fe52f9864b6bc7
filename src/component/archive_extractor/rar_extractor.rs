//! RAR 解壓縮（透過外部 7z 執行檔）
//!
//! 清單以 `7z l -slt` 取得，逐項讀取 `Encrypted` 旗標；標頭加密的壓縮檔在沒有密碼時
//! 連清單都無法讀取，同樣視為需要密碼。

use super::archive_error::ArchiveError;
use super::archive_reader::{ArchiveEntry, ArchiveListing, ExtractSummary, enclosed_path};
use indicatif::ProgressBar;
use log::{debug, warn};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const SEVEN_ZIP: &str = "7z";
const LISTING_SEPARATOR: &str = "----------";

/// 7z 回報密碼錯誤或需要密碼時的訊息片段
const PASSWORD_FAILURE_MARKERS: [&str; 2] = ["Wrong password", "Can not open encrypted archive"];

fn password_switch(password: Option<&str>) -> String {
    // 永遠帶上 -p，避免 7z 停下來等待輸入
    format!("-p{}", password.unwrap_or_default())
}

fn run_seven_zip(args: &[String], path: &Path) -> Result<Output, ArchiveError> {
    Command::new(SEVEN_ZIP)
        .args(args)
        .arg(path)
        .output()
        .map_err(|e| ArchiveError::Tool {
            message: format!("無法執行 7z: {e}"),
        })
}

fn combined_output(output: &Output) -> String {
    format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn is_password_failure(text: &str) -> bool {
    PASSWORD_FAILURE_MARKERS
        .iter()
        .any(|marker| text.contains(marker))
}

/// 讀取 RAR 項目清單
pub fn inspect_rar(path: &Path, password: Option<&str>) -> Result<ArchiveListing, ArchiveError> {
    let args = vec![
        "l".to_string(),
        "-slt".to_string(),
        password_switch(password),
    ];
    let output = run_seven_zip(&args, path)?;
    let text = combined_output(&output);

    if !output.status.success() {
        if is_password_failure(&text) {
            return Err(if password.is_some() {
                ArchiveError::WrongPassword
            } else {
                ArchiveError::Encrypted
            });
        }
        return Err(ArchiveError::Tool {
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(ArchiveListing {
        entries: parse_slt_listing(&String::from_utf8_lossy(&output.stdout)),
    })
}

/// 解析 `7z l -slt` 的輸出
///
/// 分隔線之前是壓縮檔本身的資訊，之後每個以空行分隔的區塊是一個項目。
#[must_use]
pub fn parse_slt_listing(text: &str) -> Vec<ArchiveEntry> {
    let Some((_, body)) = text.split_once(LISTING_SEPARATOR) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    let mut current: Option<ArchiveEntry> = None;

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            entries.extend(current.take());
            continue;
        }

        let Some((key, value)) = line
            .split_once(" = ")
            .or_else(|| line.strip_suffix(" =").map(|key| (key, "")))
        else {
            continue;
        };

        let entry = current.get_or_insert_with(|| ArchiveEntry {
            name: String::new(),
            size: 0,
            encrypted: false,
            is_dir: false,
        });

        match key {
            "Path" => entry.name = value.to_string(),
            "Size" => entry.size = value.parse().unwrap_or(0),
            "Folder" => entry.is_dir = value == "+",
            "Encrypted" => entry.encrypted = value == "+",
            "Attributes" => entry.is_dir |= value.starts_with('D'),
            _ => {}
        }
    }
    entries.extend(current);

    entries.retain(|entry| !entry.name.is_empty());
    entries
}

/// 解壓縮 RAR，失敗時刪除已產生的檔案
pub fn extract_rar(
    path: &Path,
    destination: &Path,
    password: Option<&str>,
    progress: Option<&ProgressBar>,
) -> Result<ExtractSummary, ArchiveError> {
    let listing = inspect_rar(path, password)?;
    if listing.is_encrypted() && password.is_none() {
        return Err(ArchiveError::Encrypted);
    }

    if let Some(pb) = progress {
        pb.set_length(listing.total_size());
    }

    let args = vec![
        "x".to_string(),
        "-y".to_string(),
        "-bd".to_string(),
        password_switch(password),
        format!("-o{}", destination.display()),
    ];
    let output = run_seven_zip(&args, path)?;

    if !output.status.success() {
        remove_extracted(&listing, destination);
        let text = combined_output(&output);
        if is_password_failure(&text) {
            return Err(ArchiveError::WrongPassword);
        }
        return Err(ArchiveError::Tool {
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    debug!("7z 解壓縮完成: {}", path.display());
    if let Some(pb) = progress {
        pb.inc(listing.total_size());
    }

    Ok(ExtractSummary {
        files: listing.files().count(),
        bytes: listing.total_size(),
    })
}

fn remove_extracted(listing: &ArchiveListing, destination: &Path) {
    for entry in listing.files() {
        let Some(relative) = enclosed_path(&entry.name) else {
            continue;
        };
        let output = destination.join(relative);
        if !output.is_file() {
            continue;
        }
        if let Err(e) = fs::remove_file(&output) {
            warn!("無法刪除未完成的檔案 {}: {e}", output.display());
        }
    }
}
