//! ZIP 解壓縮
//!
//! 加密狀態由每個項目的原始標頭判斷。檔案項目分散給固定數量的工作執行緒，
//! 每個執行緒各自開啟壓縮檔、使用自己的緩衝區與輸出檔案。

use super::archive_error::ArchiveError;
use super::archive_reader::{ArchiveEntry, ArchiveListing, ExtractSummary, enclosed_path};
use indicatif::ProgressBar;
use log::{debug, warn};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use zip::ZipArchive;
use zip::result::ZipError;

/// 解壓縮工作執行緒數量
pub const EXTRACT_WORKERS: usize = 4;
/// 每次讀取的區塊大小
pub const CHUNK_SIZE: usize = 1024 * 1024;
/// 輸出緩衝區大小
pub const WRITE_BUFFER_SIZE: usize = 8 * 1024 * 1024;

type ZipReader = ZipArchive<BufReader<File>>;

/// 要寫出的檔案項目
#[derive(Debug, Clone)]
struct MemberTarget {
    index: usize,
    name: String,
    relative: PathBuf,
    encrypted: bool,
}

fn open_zip(path: &Path) -> Result<ZipReader, ArchiveError> {
    let file = File::open(path)?;
    ZipArchive::new(BufReader::new(file)).map_err(classify_zip_error)
}

/// 將 zip 錯誤對應到可處理的種類
fn classify_zip_error(error: ZipError) -> ArchiveError {
    match error {
        ZipError::InvalidPassword => ArchiveError::WrongPassword,
        ZipError::UnsupportedArchive(message) if message == ZipError::PASSWORD_REQUIRED => {
            ArchiveError::Encrypted
        }
        ZipError::Io(e) => ArchiveError::Io(e),
        other => ArchiveError::Unsupported(other.to_string()),
    }
}

/// 讀取項目清單（只讀取標頭，不解密）
pub fn inspect_zip(path: &Path) -> Result<ArchiveListing, ArchiveError> {
    let mut archive = open_zip(path)?;
    let mut entries = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(classify_zip_error)?;
        entries.push(ArchiveEntry {
            name: entry.name().to_string(),
            size: entry.size(),
            encrypted: entry.encrypted(),
            is_dir: entry.is_dir(),
        });
    }

    Ok(ArchiveListing { entries })
}

/// 在開始寫檔之前確認密碼
fn verify_password(
    archive: &mut ZipReader,
    targets: &[MemberTarget],
    password: &[u8],
) -> Result<(), ArchiveError> {
    let Some(target) = targets.iter().find(|t| t.encrypted) else {
        return Ok(());
    };
    archive
        .by_index_decrypt(target.index, password)
        .map(|_| ())
        .map_err(classify_zip_error)
}

fn plan_members(
    listing: &ArchiveListing,
) -> Result<(Vec<PathBuf>, Vec<MemberTarget>), ArchiveError> {
    let mut directories = Vec::new();
    let mut targets = Vec::new();

    for (index, entry) in listing.entries.iter().enumerate() {
        let relative = enclosed_path(&entry.name).ok_or_else(|| ArchiveError::Member {
            name: entry.name.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, "項目路徑超出解壓縮資料夾"),
        })?;

        if entry.is_dir {
            directories.push(relative);
        } else {
            targets.push(MemberTarget {
                index,
                name: entry.name.clone(),
                relative,
                encrypted: entry.encrypted,
            });
        }
    }

    Ok((directories, targets))
}

/// 解壓縮 ZIP
pub fn extract_zip(
    path: &Path,
    destination: &Path,
    password: Option<&str>,
    progress: Option<&ProgressBar>,
) -> Result<ExtractSummary, ArchiveError> {
    let listing = inspect_zip(path)?;
    let (directories, targets) = plan_members(&listing)?;
    let password = password.map(str::as_bytes);

    if listing.is_encrypted() {
        let Some(password) = password else {
            return Err(ArchiveError::Encrypted);
        };
        verify_password(&mut open_zip(path)?, &targets, password)?;
    }

    for directory in &directories {
        fs::create_dir_all(destination.join(directory))?;
    }

    if let Some(pb) = progress {
        pb.set_length(listing.total_size());
    }

    let extracted = AtomicU64::new(0);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(EXTRACT_WORKERS)
        .build()
        .map_err(|e| ArchiveError::Io(io::Error::other(e)))?;

    pool.install(|| {
        targets.par_iter().try_for_each_init(
            || {
                open_zip(path)
                    .map(|archive| (archive, vec![0u8; CHUNK_SIZE]))
                    .map_err(|e| e.to_string())
            },
            |state, target| {
                let (archive, buffer) = state
                    .as_mut()
                    .map_err(|message| ArchiveError::Unsupported(message.clone()))?;
                extract_member(
                    archive,
                    buffer,
                    target,
                    destination,
                    password,
                    &extracted,
                    progress,
                )
            },
        )
    })?;

    Ok(ExtractSummary {
        files: targets.len(),
        bytes: extracted.into_inner(),
    })
}

fn extract_member(
    archive: &mut ZipReader,
    buffer: &mut [u8],
    target: &MemberTarget,
    destination: &Path,
    password: Option<&[u8]>,
    extracted: &AtomicU64,
    progress: Option<&ProgressBar>,
) -> Result<(), ArchiveError> {
    let mut entry = match (target.encrypted, password) {
        (true, Some(password)) => archive.by_index_decrypt(target.index, password),
        (true, None) => return Err(ArchiveError::Encrypted),
        (false, _) => archive.by_index(target.index),
    }
    .map_err(classify_zip_error)?;

    let output = destination.join(&target.relative);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }

    debug!("解壓縮: {}", target.name);

    copy_in_chunks(&mut entry, &output, buffer, extracted, progress).map_err(|source| {
        // 不留下寫到一半的檔案
        if let Err(e) = fs::remove_file(&output) {
            warn!("無法刪除未完成的檔案 {}: {e}", output.display());
        }
        ArchiveError::Member {
            name: target.name.clone(),
            source,
        }
    })
}

fn copy_in_chunks(
    reader: &mut impl Read,
    output: &Path,
    buffer: &mut [u8],
    extracted: &AtomicU64,
    progress: Option<&ProgressBar>,
) -> io::Result<()> {
    let file = File::create(output)?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);

    loop {
        let read = reader.read(buffer)?;
        if read == 0 {
            break;
        }
        writer.write_all(&buffer[..read])?;
        extracted.fetch_add(read as u64, Ordering::Relaxed);
        if let Some(pb) = progress {
            pb.inc(read as u64);
        }
    }

    writer.flush()
}

/// 測試用：寫出 ZIP，名稱以 `/` 結尾者為資料夾，有密碼時使用 AES-256
#[cfg(test)]
pub(crate) fn write_test_zip(
    path: &Path,
    members: &[(&str, &str)],
    password: Option<&'static str>,
) {
    use zip::write::SimpleFileOptions;
    use zip::{AesMode, ZipWriter};

    let options = match password {
        Some(password) => {
            SimpleFileOptions::default().with_aes_encryption(AesMode::Aes256, password)
        }
        None => SimpleFileOptions::default(),
    };
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, content) in members {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
    }
    writer.finish().unwrap();
}

/// 測試用：寫出單一未壓縮項目的 ZIP，並破壞一個資料位元組讓 CRC 檢查在寫檔途中失敗
#[cfg(test)]
pub(crate) fn write_damaged_test_zip(path: &Path, member: &str) {
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    let payload = b"stored-video-payload-0123456789";
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    writer.start_file(member, options).unwrap();
    writer.write_all(payload).unwrap();
    writer.finish().unwrap();

    let mut bytes = fs::read(path).unwrap();
    let offset = bytes
        .windows(payload.len())
        .position(|window| window == payload)
        .unwrap();
    bytes[offset + 4] ^= 0xFF;
    fs::write(path, &bytes).unwrap();
}
