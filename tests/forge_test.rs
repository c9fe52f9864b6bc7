//! 整合測試 - 在暫存資料夾上執行完整整理流程
//!
//! 影片與腳本內容都是假資料，解析度偵測使用固定值

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use funforge::component::forge_session::{ForgeSession, SessionOptions, SessionReport};
use funforge::component::script_matcher::Vocabulary;
use funforge::config::{Config, SessionDefaults};
use funforge::tools::{PasswordReply, Prompter, ResolutionProbe, Taxonomy};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{AesMode, ZipWriter};

/// 全部同意，密碼依序回答
struct ScriptedPrompter {
    passwords: RefCell<Vec<PasswordReply>>,
    confirms: RefCell<usize>,
}

impl ScriptedPrompter {
    fn approving() -> Self {
        Self {
            passwords: RefCell::new(Vec::new()),
            confirms: RefCell::new(0),
        }
    }

    fn with_passwords(passwords: Vec<PasswordReply>) -> Self {
        Self {
            passwords: RefCell::new(passwords),
            confirms: RefCell::new(0),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, _prompt: &str) -> bool {
        *self.confirms.borrow_mut() += 1;
        true
    }

    fn ask_password(&self, _archive: &Path, _attempt: usize, _max: usize) -> PasswordReply {
        let mut passwords = self.passwords.borrow_mut();
        if passwords.is_empty() {
            PasswordReply::Skip
        } else {
            passwords.remove(0)
        }
    }
}

struct FixedProbe;

impl ResolutionProbe for FixedProbe {
    fn probe_resolution(&self, _path: &Path) -> String {
        "1920x1080".to_string()
    }
}

fn options() -> SessionOptions {
    SessionOptions {
        recursive: true,
        extract_archives: true,
        tag_with_resolution: false,
        dry_run: false,
        verbose_exact_matches: false,
    }
}

fn run_session(root: &Path, options: SessionOptions, prompter: &dyn Prompter) -> SessionReport {
    let config = Config::new().unwrap();
    let probe = FixedProbe;
    ForgeSession::new(
        &config.file_type_table,
        Vocabulary::default(),
        options,
        prompter,
        Arc::new(AtomicBool::new(false)),
    )
    .with_resolution_probe(&probe)
    .run(root)
    .unwrap()
}

fn write_zip(path: &Path, entries: &[(&str, &str)], password: Option<&'static str>) {
    let file = fs::File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = match password {
        Some(pw) => SimpleFileOptions::default().with_aes_encryption(AesMode::Aes256, pw),
        None => SimpleFileOptions::default(),
    };
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

/// 測試 1: 名稱不同的影片與腳本經模糊配對後改名到 Changed
#[test]
fn test_fuzzy_pair_is_renamed_into_changed() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("Clip_1080p.mp4"), "video").unwrap();
    fs::write(root.join("clip.funscript"), "{}").unwrap();

    let prompter = ScriptedPrompter::approving();
    let report = run_session(root, options(), &prompter);

    let changed = Taxonomy::new(root).changed();
    assert_eq!(report.changed_groups(), 1);
    assert!(changed.join("clip.mp4").exists());
    assert!(changed.join("clip.funscript").exists());
    assert!(!root.join("Clip_1080p.mp4").exists());
    assert!(*prompter.confirms.borrow() >= 1);
}

/// 測試 2: 開啟解析度標記時新名稱帶上解析度
#[test]
fn test_resolution_tag_is_appended() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("Clip_1080p.mp4"), "video").unwrap();
    fs::write(root.join("clip.funscript"), "{}").unwrap();

    let tagged = SessionOptions {
        tag_with_resolution: true,
        ..options()
    };
    let report = run_session(root, tagged, &ScriptedPrompter::approving());

    let changed = Taxonomy::new(root).changed();
    assert_eq!(report.changed_groups(), 1);
    assert!(changed.join("clip_1920x1080.mp4").exists());
    assert!(changed.join("clip_1920x1080.funscript").exists());
}

/// 測試 3: 同名檔案直接進 Already-Same-Name，孤兒進 Not-Changed
#[test]
fn test_exact_and_orphan_files_are_sorted() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("nested")).unwrap();
    fs::write(root.join("nested/scene.mkv"), "video").unwrap();
    fs::write(root.join("nested/scene.funscript"), "{}").unwrap();
    fs::write(root.join("nested/scene.srt"), "1").unwrap();
    fs::write(root.join("orphan.mp4"), "video").unwrap();

    let report = run_session(root, options(), &ScriptedPrompter::approving());

    let taxonomy = Taxonomy::new(root);
    assert_eq!(report.exact_groups(), 1);
    assert!(taxonomy.already_same_name().join("scene.mkv").exists());
    assert!(taxonomy.already_same_name().join("scene.funscript").exists());
    assert!(taxonomy.already_same_name().join("scene.srt").exists());
    assert_eq!(report.not_changed(), 1);
    assert!(taxonomy.not_changed().join("orphan.mp4").exists());
    // nested 已清空，應被刪除
    assert!(!root.join("nested").exists());
}

/// 測試 4: 目的地已存在時不覆蓋，原檔留在原處
#[test]
fn test_existing_destination_is_never_overwritten() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let taxonomy = Taxonomy::new(root);
    taxonomy.ensure().unwrap();
    fs::write(taxonomy.not_changed().join("orphan.mp4"), "older").unwrap();
    fs::write(root.join("orphan.mp4"), "newer").unwrap();

    let report = run_session(root, options(), &ScriptedPrompter::approving());

    assert_eq!(report.collisions(), 1);
    assert!(root.join("orphan.mp4").exists());
    assert_eq!(
        fs::read_to_string(taxonomy.not_changed().join("orphan.mp4")).unwrap(),
        "older"
    );
}

/// 測試 5: 壓縮檔內容全部配對後刪除壓縮檔與解壓資料夾
#[test]
fn test_fully_reconciled_zip_is_removed() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let archive = root.join("pack.zip");
    write_zip(&archive, &[("x.mp4", "video"), ("x.funscript", "{}")], None);

    let report = run_session(root, options(), &ScriptedPrompter::approving());

    let same = Taxonomy::new(root).already_same_name();
    assert_eq!(report.archives.reconciled(), 1);
    assert!(!archive.exists());
    assert!(!root.join("pack").exists());
    assert!(same.join("x.mp4").exists());
    assert!(same.join("x.funscript").exists());
}

/// 測試 6: 加密壓縮檔略過時保持原狀
#[test]
fn test_skipped_encrypted_zip_is_left_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let archive = root.join("secret.zip");
    write_zip(
        &archive,
        &[("y.mp4", "video"), ("y.funscript", "{}")],
        Some("hunter2"),
    );
    let before = fs::read(&archive).unwrap();

    let prompter = ScriptedPrompter::with_passwords(vec![PasswordReply::Skip]);
    let report = run_session(root, options(), &prompter);

    assert_eq!(report.archives.skipped(), 1);
    assert_eq!(fs::read(&archive).unwrap(), before);
    assert!(!root.join("secret").exists());
}

/// 測試 7: 正確密碼解開加密壓縮檔
#[test]
fn test_encrypted_zip_with_password_is_reconciled() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let archive = root.join("secret.zip");
    write_zip(
        &archive,
        &[("y.mp4", "video"), ("y.funscript", "{}")],
        Some("hunter2"),
    );

    let prompter = ScriptedPrompter::with_passwords(vec![
        PasswordReply::Password("wrong".to_string()),
        PasswordReply::Password("hunter2".to_string()),
    ]);
    let report = run_session(root, options(), &prompter);

    let same = Taxonomy::new(root).already_same_name();
    assert_eq!(report.archives.reconciled(), 1);
    assert_eq!(report.archives.jobs[0].password_attempts, 2);
    assert!(!archive.exists());
    assert!(same.join("y.mp4").exists());
}

/// 測試 8: 試跑不建立也不搬移任何東西
#[test]
fn test_dry_run_leaves_tree_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("Clip_1080p.mp4"), "video").unwrap();
    fs::write(root.join("clip.funscript"), "{}").unwrap();
    fs::write(root.join("orphan.mp4"), "video").unwrap();
    fs::create_dir_all(root.join("empty")).unwrap();

    let dry = SessionOptions {
        dry_run: true,
        ..SessionOptions::from(SessionDefaults::default())
    };
    let report = run_session(root, dry, &ScriptedPrompter::approving());

    assert_eq!(report.changed_groups(), 1);
    assert_eq!(report.not_changed(), 1);
    assert!(root.join("Clip_1080p.mp4").exists());
    assert!(root.join("orphan.mp4").exists());
    assert!(root.join("empty").exists());
    assert!(!Taxonomy::new(root).root().exists());
}
