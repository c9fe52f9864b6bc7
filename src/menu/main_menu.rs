use crate::config::save::save_settings;
use crate::config::types::{Config, Language, SessionDefaults};
use crate::menu::handlers::run_fun_forge;
use anyhow::Result;
use console::{Term, style};
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_forge"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_fun_forge(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(2) | None => Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_session_defaults"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_session_defaults_menu(term, config)?,
            Some(1) => show_language_menu(term, config)?,
            Some(2) | None => break, // ESC or back
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn toggle_label(label: impl std::fmt::Display, enabled: bool) -> String {
    let mark = if enabled { "✓" } else { "✗" };
    format!("[{mark}] {label}")
}

/// 每次執行的開關預設值，選擇一項即切換並儲存
fn show_session_defaults_menu(term: &Term, config: &mut Config) -> Result<()> {
    let mut cursor = 0;

    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.defaults.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let defaults = config.settings.session_defaults;
        let items = vec![
            toggle_label(t!("settings.defaults.recursive"), defaults.recursive),
            toggle_label(t!("settings.defaults.extract"), defaults.extract_archives),
            toggle_label(
                t!("settings.defaults.resolution"),
                defaults.tag_with_resolution,
            ),
            toggle_label(t!("settings.defaults.dry_run"), defaults.dry_run),
            toggle_label(
                t!("settings.defaults.verbose"),
                defaults.verbose_exact_matches,
            ),
            t!("settings.back").to_string(),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.defaults.prompt"))
            .items(&items)
            .default(cursor)
            .interact_on_opt(term)?;

        let Some(selection) = selection else {
            return Ok(());
        };

        let updated = match selection {
            0 => SessionDefaults {
                recursive: !defaults.recursive,
                ..defaults
            },
            1 => SessionDefaults {
                extract_archives: !defaults.extract_archives,
                ..defaults
            },
            2 => SessionDefaults {
                tag_with_resolution: !defaults.tag_with_resolution,
                ..defaults
            },
            3 => SessionDefaults {
                dry_run: !defaults.dry_run,
                ..defaults
            },
            4 => SessionDefaults {
                verbose_exact_matches: !defaults.verbose_exact_matches,
                ..defaults
            },
            _ => return Ok(()),
        };

        cursor = selection;
        config.settings.session_defaults = updated;
        save_settings(&config.settings)?;
    }
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = Language::all();

    let items: Vec<&str> = languages.iter().map(Language::display_name).collect();

    let default_index = languages
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = languages[selection];

    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(&config.settings)?;
        println!(
            "\n{} {}",
            style(t!("settings.saved")).green(),
            selected_lang.display_name()
        );
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}
