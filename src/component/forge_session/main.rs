//! 互動式整理元件
//!
//! 選擇資料夾、設定本次開關後執行整理流程並顯示摘要

use super::session::{ForgeSession, SessionOptions, SessionReport};
use crate::component::script_matcher::Vocabulary;
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use crate::tools::{DialoguerPrompter, FfprobeResolution, validate_directory_exists};
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use log::{info, warn};
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub struct FunForge {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl FunForge {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    /// 取回設定（包含本次更新的路徑歷史）
    #[must_use]
    pub fn into_config(self) -> Config {
        self.config
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", style(t!("forge.title")).cyan().bold());

        let Some(input_path) = self.prompt_input_path()? else {
            return Ok(()); // ESC pressed
        };
        let directory = PathBuf::from(&input_path);

        validate_directory_exists(&directory)?;

        add_recent_path(&mut self.config.settings, &input_path);
        if let Err(e) = save_settings(&self.config.settings) {
            warn!("無法儲存路徑歷史: {e}");
        }

        let options = self.prompt_options()?;
        let vocabulary = Vocabulary::default().with_word_lists(&self.config.settings.word_lists);
        info!("流行詞彙 {} 個", vocabulary.len());

        if options.dry_run {
            println!("{}", style(t!("forge.dry_run_notice")).yellow());
        }

        let prompter = DialoguerPrompter;
        let probe = FfprobeResolution;
        let session = ForgeSession::new(
            &self.config.file_type_table,
            vocabulary,
            options,
            &prompter,
            Arc::clone(&self.shutdown_signal),
        )
        .with_resolution_probe(&probe);

        let report = session.run(&directory)?;
        self.print_report(&report);

        Ok(())
    }

    fn prompt_input_path(&self) -> Result<Option<String>> {
        let recent_paths = &self.config.settings.recent_paths;

        if recent_paths.is_empty() {
            let path: String = Input::new()
                .with_prompt(t!("forge.input_path"))
                .interact_text()?;
            return Ok(Some(path.trim().to_string()));
        }

        let mut options: Vec<String> = recent_paths
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let indicator = if Path::new(p).exists() { "✓" } else { "✗" };
                format!("{} [{}] {}", i + 1, indicator, p)
            })
            .collect();
        options.push(t!("forge.new_path").to_string());

        println!("{}", style(t!("common.esc_hint")).dim());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("forge.select_path"))
            .items(&options)
            .default(0)
            .interact_opt()?;

        match selection {
            None => Ok(None),
            Some(idx) if idx < recent_paths.len() => Ok(Some(recent_paths[idx].clone())),
            Some(_) => {
                let path: String = Input::new()
                    .with_prompt(t!("forge.input_path"))
                    .interact_text()?;
                Ok(Some(path.trim().to_string()))
            }
        }
    }

    /// 逐一詢問本次執行的開關，預設值取自設定檔
    fn prompt_options(&self) -> Result<SessionOptions> {
        let defaults = self.config.settings.session_defaults;

        Ok(SessionOptions {
            recursive: ask_toggle(t!("forge.ask_recursive"), defaults.recursive)?,
            extract_archives: ask_toggle(t!("forge.ask_extract"), defaults.extract_archives)?,
            tag_with_resolution: ask_toggle(
                t!("forge.ask_resolution"),
                defaults.tag_with_resolution,
            )?,
            dry_run: ask_toggle(t!("forge.ask_dry_run"), defaults.dry_run)?,
            verbose_exact_matches: ask_toggle(
                t!("forge.ask_verbose"),
                defaults.verbose_exact_matches,
            )?,
        })
    }

    fn print_report(&self, report: &SessionReport) {
        println!();
        println!("{}", style(t!("forge.summary_title")).cyan().bold());

        if !report.archives.jobs.is_empty() {
            let reconciled = report.archives.reconciled();
            let partial = report.archives.partial();
            let skipped = report.archives.skipped();
            let failed = report.archives.failed();
            println!(
                "  {}",
                t!(
                    "forge.summary_archives",
                    reconciled = reconciled,
                    partial = partial,
                    skipped = skipped,
                    failed = failed
                )
            );
        }

        println!(
            "  {} {}",
            t!("forge.summary_exact"),
            style(report.exact_groups()).green()
        );
        println!(
            "  {} {}",
            t!("forge.summary_changed"),
            style(report.changed_groups()).green()
        );
        println!(
            "  {} {}",
            t!("forge.summary_not_changed"),
            style(report.not_changed()).yellow()
        );

        if report.declined_groups() > 0 {
            println!(
                "  {} {}",
                t!("forge.summary_declined"),
                style(report.declined_groups()).dim()
            );
        }
        if report.collisions() > 0 {
            println!(
                "  {} {}",
                t!("forge.summary_collisions"),
                style(report.collisions()).dim()
            );
        }
        if report.errors() > 0 {
            println!(
                "  {} {}",
                t!("forge.summary_errors"),
                style(report.errors()).red()
            );
        }

        if !report.planned_moves.is_empty() {
            println!(
                "  {} {}",
                t!("forge.summary_planned"),
                style(report.planned_moves.len()).yellow()
            );
        }

        println!(
            "  {} {}",
            t!("forge.summary_reaped"),
            style(report.reaped.removed()).dim()
        );

        if report.interrupted {
            println!("{}", style(t!("forge.interrupted")).yellow());
        }
    }
}

fn ask_toggle(prompt: impl Into<String>, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}
