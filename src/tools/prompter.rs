//! 使用者互動介面
//!
//! 引擎只透過 [`Prompter`] 與使用者互動：確認、詢問密碼、顯示說明。

use console::style;
use dialoguer::{Confirm, Password};
use log::warn;
use rust_i18n::t;
use std::path::Path;

/// 密碼提示的回覆
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordReply {
    Password(String),
    Skip,
}

pub const SKIP_KEYWORD: &str = "skip";

impl PasswordReply {
    /// 將使用者輸入轉為回覆，輸入 `skip`（不分大小寫）代表略過
    #[must_use]
    pub fn from_input(input: &str) -> Self {
        if input.trim().eq_ignore_ascii_case(SKIP_KEYWORD) {
            Self::Skip
        } else {
            Self::Password(input.to_string())
        }
    }
}

pub trait Prompter {
    /// 是/否確認，拒絕時引擎只略過該項目
    fn confirm(&self, prompt: &str) -> bool;

    /// 詢問壓縮檔密碼，`attempt` 從 1 開始
    fn ask_password(&self, archive: &Path, attempt: usize, max_attempts: usize) -> PasswordReply;

    /// 顯示提案或進度說明
    fn notify(&self, _lines: &[String]) {}
}

/// 以 dialoguer 實作的終端機互動
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn confirm(&self, prompt: &str) -> bool {
        Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .unwrap_or_else(|e| {
                warn!("無法讀取確認輸入，視為拒絕: {e}");
                false
            })
    }

    fn ask_password(&self, archive: &Path, attempt: usize, max_attempts: usize) -> PasswordReply {
        let name = archive
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let prompt = t!(
            "archive.password_prompt",
            name = name,
            attempt = attempt,
            max = max_attempts
        );

        match Password::new()
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
        {
            Ok(input) => PasswordReply::from_input(&input),
            Err(e) => {
                warn!("無法讀取密碼輸入，略過壓縮檔: {e}");
                PasswordReply::Skip
            }
        }
    }

    fn notify(&self, lines: &[String]) {
        for line in lines {
            println!("{}", style(line).dim());
        }
    }
}
